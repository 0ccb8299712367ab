//! Checkout handler.
//!
//! The cart is cleared only once the order has committed; a failed checkout leaves it
//! as it was so the customer can adjust quantities and retry.

use crate::{
    api::{AppState, error::ApiResult, extract::CurrentUser},
    core::{
        cart,
        checkout::{self, CheckoutOptions},
    },
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Confirmation returned after a successful checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutReceipt {
    /// New order ID
    pub order_id: i64,
    /// Tracking number, e.g. `S07`
    pub tracking_number: String,
    /// Amount charged
    pub total: f64,
    /// Payment method label
    pub payment_method: String,
    /// Estimated delivery, midnight UTC
    pub estimated_delivery: DateTime<Utc>,
}

/// `POST /api/checkout`
pub async fn checkout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<(StatusCode, Json<CheckoutReceipt>)> {
    let lines = cart::get_cart(&state.database, user.id).await?;
    let options = CheckoutOptions::now(state.payment_method.clone());
    let order = checkout::place_order(&state.database, user.id, &lines, &options).await?;

    if let Err(e) = cart::clear_cart(&state.database, user.id).await {
        warn!(
            "Order {} committed but clearing the cart of user {} failed: {}",
            order.id, user.id, e
        );
    }
    info!("User {} checked out order {}", user.id, order.tracking_number);

    Ok((
        StatusCode::CREATED,
        Json(CheckoutReceipt {
            order_id: order.id,
            tracking_number: order.tracking_number,
            total: order.total,
            payment_method: order.payment_method,
            estimated_delivery: order.estimated_delivery,
        }),
    ))
}
