use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;

use crate::engine::checkout::CheckoutRequest;
use crate::error::AppError;
use crate::models::event::OrderEventKind;
use crate::models::order::{OrderPatch, OrderResponse};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route(
            "/orders/:key",
            get(get_order).patch(update_order).delete(delete_order),
        )
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.checkout.create_order(payload).await?;

    state.publish(OrderEventKind::Created {
        tracking_id: order.tracking_id.clone(),
    });
    state.refresh_order_gauge().await;

    Ok(Json(order.into()))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state.store.all().await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .store
        .find_by_tracking_key(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", key)))?;

    Ok(Json(order.into()))
}

async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(tracking_id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> Result<Json<OrderResponse>, AppError> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("patch has no fields to update".to_string()));
    }

    if !state.store.update(&tracking_id, patch).await? {
        return Err(AppError::NotFound(format!("order {} not found", tracking_id)));
    }

    let order = state
        .store
        .find_by_tracking_key(&tracking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", tracking_id)))?;

    state.publish(OrderEventKind::Updated {
        tracking_id: tracking_id.clone(),
    });

    Ok(Json(order.into()))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(tracking_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete(&tracking_id).await? {
        return Err(AppError::NotFound(format!("order {} not found", tracking_id)));
    }

    state.publish(OrderEventKind::Deleted { tracking_id });
    state.refresh_order_gauge().await;
    Ok(StatusCode::NO_CONTENT)
}
