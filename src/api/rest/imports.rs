use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::engine::import::ImportReport;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/imports", post(run_import))
}

#[derive(Deserialize)]
pub struct ImportRequest {
    pub path: Option<PathBuf>,
}

async fn run_import(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<ImportRequest>>,
) -> Json<ImportReport> {
    let path = payload.and_then(|Json(request)| request.path);
    let report = state.run_import(path.as_deref()).await;
    Json(report)
}
