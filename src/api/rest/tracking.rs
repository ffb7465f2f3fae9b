use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::error::AppError;
use crate::models::tracking::TrackingView;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/track/:key", get(track))
}

async fn track(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<TrackingView>, AppError> {
    let view = state
        .tracking
        .track(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", key)))?;

    Ok(Json(view))
}
