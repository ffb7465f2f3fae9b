//! Read-side views of the staff and product tables owned by other screens.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::employee::Employee;

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_employee(&self, employee_id: i64) -> Option<Employee>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Product name for a source order item.
    async fn product_name(&self, order_item_id: &str) -> Option<String>;
}

#[derive(Default)]
pub struct MemoryEmployeeDirectory {
    employees: DashMap<i64, Employee>,
}

impl MemoryEmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record, returning the previous one.
    pub fn upsert(&self, employee: Employee) -> Option<Employee> {
        self.employees.insert(employee.employee_id, employee)
    }

    pub fn list(&self) -> Vec<Employee> {
        let mut employees: Vec<Employee> = self
            .employees
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        employees.sort_by_key(|employee| employee.employee_id);
        employees
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryEmployeeDirectory {
    async fn find_employee(&self, employee_id: i64) -> Option<Employee> {
        self.employees
            .get(&employee_id)
            .map(|entry| entry.value().clone())
    }
}

#[derive(Default)]
pub struct MemoryProductCatalog {
    names: DashMap<String, String>,
}

impl MemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, order_item_id: impl Into<String>, product_name: impl Into<String>) {
        self.names.insert(order_item_id.into(), product_name.into());
    }
}

#[async_trait]
impl ProductCatalog for MemoryProductCatalog {
    async fn product_name(&self, order_item_id: &str) -> Option<String> {
        self.names.get(order_item_id).map(|entry| entry.value().clone())
    }
}
