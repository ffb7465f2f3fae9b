use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employee record as kept by the staff directory. Drivers are employees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birthdate: Option<NaiveDate>,
    pub contact_number: String,
}

impl Employee {
    /// Age in whole years on `today`, if a birthdate is on file.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birthdate.and_then(|born| today.years_since(born))
    }
}

/// Courier block of the public tracking view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Courier {
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub age: Option<u32>,
    pub birthdate: Option<NaiveDate>,
    pub contact_number: String,
}

impl Courier {
    pub fn from_employee(employee: Employee, today: NaiveDate) -> Self {
        let age = employee.age_on(today);
        Self {
            employee_id: employee.employee_id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            gender: employee.gender,
            age,
            birthdate: employee.birthdate,
            contact_number: employee.contact_number,
        }
    }
}
