//! Back-office handlers. Every route requires an admin.

use crate::{
    api::{
        AppState,
        error::{ApiError, ApiResult},
        extract::AdminUser,
    },
    core::{
        catalog::{self, ProductFields},
        order,
        report::{self, SalesHistoryRow, SalesPeriod, SalesSummary},
        user::{self, NewUser, UserStatus},
    },
    entities::{order as order_entity, product, user as user_entity},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Filters of the user listing.
#[derive(Debug, Deserialize)]
pub struct UserFilter {
    /// Only users with this status
    pub status: Option<UserStatus>,
    /// Name fragment or exact ID
    pub q: Option<String>,
}

/// Body of `POST /api/admin/users/:id/status`.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    /// New account status
    pub status: UserStatus,
}

/// Body of `PUT /api/admin/orders/:id`.
#[derive(Debug, Deserialize)]
pub struct OrderEdit {
    /// New free-text status, e.g. `shipped`
    pub status: String,
    /// Corrected tracking number
    pub tracking_number: String,
}

/// Query string of the sales report.
#[derive(Debug, Deserialize)]
pub struct SalesParams {
    /// `day`, `week`, `month`, `year`; anything else means all time
    #[serde(default)]
    pub period: String,
}

/// The sales report.
#[derive(Debug, Serialize)]
pub struct SalesReport {
    /// Purchased lines, newest order first
    pub rows: Vec<SalesHistoryRow>,
    /// Totals over `rows`
    pub summary: SalesSummary,
}

/// `GET /api/admin/users`
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Json<Vec<user_entity::Model>>> {
    let users = match (filter.q.as_deref(), filter.status) {
        (Some(term), status) => {
            let mut found = user::search_users(&state.database, term).await?;
            if let Some(status) = status {
                found.retain(|u| u.status == status.as_str());
            }
            found
        }
        (None, Some(status)) => user::list_users_by_status(&state.database, status).await?,
        (None, None) => user::list_users(&state.database).await?,
    };
    Ok(Json(users))
}

/// `PUT /api/admin/users/:id`
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(user_id): Path<i64>,
    Json(body): Json<NewUser>,
) -> ApiResult<Json<user_entity::Model>> {
    Ok(Json(user::update_user(&state.database, user_id, body).await?))
}

/// `POST /api/admin/users/:id/status`
pub async fn set_user_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<i64>,
    Json(body): Json<StatusChange>,
) -> ApiResult<Json<user_entity::Model>> {
    let updated = user::set_user_status(&state.database, user_id, body.status).await?;
    info!("Admin {} set user {} to {}", admin.id, user_id, body.status);
    Ok(Json(updated))
}

/// `DELETE /api/admin/users/:id`
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    if user::delete_user(&state.database, user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("User not found: {user_id}")))
    }
}

/// `PUT /api/admin/orders/:id`
pub async fn update_order(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(order_id): Path<i64>,
    Json(body): Json<OrderEdit>,
) -> ApiResult<Json<order_entity::Model>> {
    Ok(Json(
        order::update_order_status(&state.database, order_id, &body.status, &body.tracking_number)
            .await?,
    ))
}

/// `POST /api/admin/products`
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(body): Json<ProductFields>,
) -> ApiResult<(StatusCode, Json<product::Model>)> {
    let product = catalog::create_product(&state.database, body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/admin/products/:id`
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(product_id): Path<i64>,
    Json(body): Json<ProductFields>,
) -> ApiResult<Json<product::Model>> {
    Ok(Json(
        catalog::update_product(&state.database, product_id, body).await?,
    ))
}

/// `DELETE /api/admin/products/:id`
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(product_id): Path<i64>,
) -> ApiResult<StatusCode> {
    catalog::delete_product(&state.database, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/admin/sales?period=`
pub async fn sales(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(params): Query<SalesParams>,
) -> ApiResult<Json<SalesReport>> {
    let period = SalesPeriod::parse(&params.period);
    let rows = report::sales_history(&state.database, period, Utc::now().date_naive()).await?;
    let summary = report::summarize_sales(&rows);
    Ok(Json(SalesReport { rows, summary }))
}
