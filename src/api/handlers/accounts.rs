//! Account handlers - registration and saved addresses.

use crate::{
    api::{AppState, error::ApiResult, extract::CurrentUser},
    core::{
        address::{self, AddressFields},
        user::{self, NewUser},
    },
    entities::{address as address_entity, user as user_entity},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// `POST /api/users`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<user_entity::Model>)> {
    let user = user::register_user(&state.database, body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /api/me`
pub async fn me(CurrentUser(user): CurrentUser) -> Json<user_entity::Model> {
    Json(user)
}

/// `PUT /api/me`
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<NewUser>,
) -> ApiResult<Json<user_entity::Model>> {
    Ok(Json(user::update_user(&state.database, user.id, body).await?))
}

/// `GET /api/addresses`
pub async fn list_addresses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<address_entity::Model>>> {
    Ok(Json(address::list_addresses(&state.database, user.id).await?))
}

/// `POST /api/addresses`
pub async fn add_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AddressFields>,
) -> ApiResult<(StatusCode, Json<address_entity::Model>)> {
    let address = address::add_address(&state.database, user.id, body).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// `PUT /api/addresses/:id`
pub async fn update_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<i64>,
    Json(body): Json<AddressFields>,
) -> ApiResult<Json<address_entity::Model>> {
    Ok(Json(
        address::update_address(&state.database, user.id, address_id, body).await?,
    ))
}
