//! Order handlers for the current user.

use crate::{
    api::{
        AppState,
        error::{ApiError, ApiResult},
        extract::CurrentUser,
    },
    core::order::{self, CancelOutcome, OrderSummary, OrderWithLines, TrackingView},
    entities::order as order_entity,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Serialize;

/// Where "buy again" should send the customer.
#[derive(Debug, Serialize)]
pub struct ReorderTarget {
    /// First product of the order
    pub product_id: i64,
}

async fn owned_summary(state: &AppState, user_id: i64, order_id: i64) -> ApiResult<OrderSummary> {
    order::get_order_summary(&state.database, order_id)
        .await?
        .filter(|summary| summary.order.user_id == user_id)
        .ok_or_else(|| ApiError::not_found(format!("Order not found: {order_id}")))
}

/// `GET /api/orders`
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<OrderWithLines>>> {
    Ok(Json(order::get_orders_for_user(&state.database, user.id).await?))
}

/// `GET /api/orders/:id`
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<OrderSummary>> {
    Ok(Json(owned_summary(&state, user.id, order_id).await?))
}

/// `POST /api/orders/:id/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<order_entity::Model>> {
    owned_summary(&state, user.id, order_id).await?;
    match order::cancel_order(&state.database, order_id, Utc::now()).await? {
        CancelOutcome::Cancelled(order) => Ok(Json(order)),
        CancelOutcome::Rejected { status } => Err(ApiError::conflict(format!(
            "Order cannot be cancelled in status '{status}'"
        ))),
    }
}

/// `GET /api/orders/:id/refund`
pub async fn refund(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<OrderSummary>> {
    order::get_refund(&state.database, order_id)
        .await?
        .filter(|summary| summary.order.user_id == user.id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No refund for order {order_id}")))
}

/// `GET /api/orders/:id/reorder`
pub async fn reorder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<ReorderTarget>> {
    owned_summary(&state, user.id, order_id).await?;
    order::get_reorder_product(&state.database, order_id)
        .await?
        .map(|product_id| Json(ReorderTarget { product_id }))
        .ok_or_else(|| ApiError::not_found(format!("Order {order_id} has no lines")))
}

/// `GET /api/tracking`
pub async fn tracking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<TrackingView>>> {
    Ok(Json(
        order::get_tracking_for_user(&state.database, user.id).await?,
    ))
}
