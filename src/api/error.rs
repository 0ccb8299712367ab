//! HTTP error mapping.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Result type of every handler.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// An error rendered as `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 401, the caller is not identified.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 403, the caller may not do this.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// 404 for a missing resource.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 409, the request conflicts with the current state.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Status code sent to the client.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::InvalidSession { .. }
            | Error::InvalidAmount { .. }
            | Error::InvalidQuantity { .. }
            | Error::Config { .. } => StatusCode::BAD_REQUEST,
            Error::InsufficientStock { .. } | Error::DuplicateEmail { .. } => StatusCode::CONFLICT,
            Error::ProductNotFound { .. }
            | Error::CategoryNotFound { .. }
            | Error::OrderNotFound { .. }
            | Error::UserNotFound { .. }
            | Error::AddressNotFound { .. } => StatusCode::NOT_FOUND,
            Error::Database(_) | Error::Io(_) | Error::EnvVar(_) | Error::IntConversion(_) => {
                error!("Request failed: {}", err);
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                Error::InvalidSession {
                    reason: "empty cart".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::InsufficientStock {
                    product: "Straw Hat".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (Error::OrderNotFound { id: 3 }, StatusCode::NOT_FOUND),
            (
                Error::Database(sea_orm::DbErr::Custom("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let api = ApiError::from(Error::Database(sea_orm::DbErr::Custom(
            "secret table".to_string(),
        )));
        assert_eq!(api.message, "Internal server error");
    }
}
