use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::directory::EmployeeDirectory;
use crate::error::AppError;
use crate::models::employee::Employee;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", post(create_driver).get(list_drivers))
        .route("/drivers/:id", get(get_driver))
}

#[derive(Deserialize)]
pub struct CreateDriverRequest {
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birthdate: Option<NaiveDate>,
    pub contact_number: String,
}

async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDriverRequest>,
) -> Result<Json<Employee>, AppError> {
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(AppError::BadRequest("driver name cannot be empty".to_string()));
    }

    if payload.employee_id <= 0 {
        return Err(AppError::BadRequest("employee_id must be > 0".to_string()));
    }

    let employee = Employee {
        employee_id: payload.employee_id,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        gender: payload.gender,
        birthdate: payload.birthdate,
        contact_number: payload.contact_number,
    };

    state.employees.upsert(employee.clone());
    Ok(Json(employee))
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<Employee>> {
    Json(state.employees.list())
}

async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Employee>, AppError> {
    let employee = state
        .employees
        .find_employee(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("driver {} not found", id)))?;

    Ok(Json(employee))
}
