//! Cart handlers.

use crate::{
    api::{
        AppState,
        error::{ApiError, ApiResult},
        extract::CurrentUser,
    },
    core::cart::{self, CartLine},
    entities::cart_item,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// The cart as shown to the customer.
#[derive(Debug, Serialize)]
pub struct CartView {
    /// Lines in the order they were added
    pub lines: Vec<CartLine>,
    /// Sum of line subtotals at the shown prices
    pub total: f64,
    /// Total units
    pub count: i64,
}

/// Body of `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItem {
    /// Product to add
    pub product_id: i64,
    /// Units to add
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Count of cart units.
#[derive(Debug, Serialize)]
pub struct CartCount {
    /// Total units
    pub count: i64,
}

/// `GET /api/cart`
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<CartView>> {
    let lines = cart::get_cart(&state.database, user.id).await?;
    let total = cart::cart_total(&lines);
    let count = lines.iter().map(|line| i64::from(line.quantity)).sum();
    Ok(Json(CartView {
        lines,
        total,
        count,
    }))
}

/// `POST /api/cart/items`
pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AddItem>,
) -> ApiResult<(StatusCode, Json<cart_item::Model>)> {
    let item = cart::add_to_cart(&state.database, user.id, body.product_id, body.quantity).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `DELETE /api/cart/items/:product_id`
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let removed = cart::remove_from_cart(&state.database, user.id, product_id).await?;
    if removed == 0 {
        return Err(ApiError::not_found(format!(
            "Product {product_id} is not in the cart"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/cart`
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<StatusCode> {
    cart::clear_cart(&state.database, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/cart/count`
pub async fn count(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<CartCount>> {
    let count = cart::cart_count(&state.database, user.id).await?;
    Ok(Json(CartCount { count }))
}
