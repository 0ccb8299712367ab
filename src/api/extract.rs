//! Request extractors for the caller's identity.
//!
//! Sessions live in front of this service; it trusts the `x-user-id` header set by the
//! session layer.

use super::{AppState, error::ApiError};
use crate::{
    core::user::{self, ADMIN_ROLE, UserStatus},
    entities::user as user_entity,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Header carrying the authenticated user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated, non-suspended user making the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user_entity::Model);

/// The authenticated user, who must be an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user_entity::Model);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Missing x-user-id header"))?;
        let user_id = header
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or_else(|| ApiError::unauthorized("Malformed x-user-id header"))?;

        let user = user::get_user_by_id(&state.database, user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;
        if user.status == UserStatus::Suspended.as_str() {
            return Err(ApiError::forbidden("Account suspended"));
        }
        Ok(Self(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != ADMIN_ROLE {
            return Err(ApiError::forbidden("Admin access required"));
        }
        Ok(Self(user))
    }
}
