use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Failures surfaced by an [`OrderStore`](crate::store::OrderStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The tracking id is already taken. Expected during import; the row is skipped.
    #[error("duplicate tracking id: {0}")]
    DuplicateTrackingId(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateTrackingId(id) => {
                AppError::Conflict(format!("tracking id {id} already exists"))
            }
            StoreError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

/// Fatal to a whole import run. The pipeline answers these with the seed dataset.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("source unreadable: {0}")]
    SourceUnreadable(String),

    #[error("source is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// One source row that could not be turned into an order.
#[derive(Debug, Clone, Error, Serialize, PartialEq)]
#[error("row {row}: {reason}")]
pub struct RowError {
    pub row: usize,
    pub reason: String,
}

impl RowError {
    pub fn new(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request timed out")]
    Timeout,

    #[error("geocoder returned status {0}")]
    Status(u16),

    #[error("geocoder network error: {0}")]
    Network(String),

    #[error("malformed geocoder response: {0}")]
    Malformed(String),
}
