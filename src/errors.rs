//! Unified error type for the storefront.
//!
//! Every fallible operation in the crate returns [`Result`]. Store failures arrive as
//! [`Error::Database`] via `?`; business rule violations get their own variants so the
//! HTTP layer can map them to meaningful status codes.

use thiserror::Error;

/// All errors the storefront can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or an input failed basic validation
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any lower-level store failure; the surrounding transaction is rolled back
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No authenticated user, or nothing to check out
    #[error("Invalid session: {reason}")]
    InvalidSession {
        /// Why the request was rejected
        reason: String,
    },

    /// A cart line asked for more units than are in stock
    #[error("Insufficient stock for {product}")]
    InsufficientStock {
        /// Name of the product that ran short
        product: String,
    },

    /// Product lookup failed
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product ID
        id: i64,
    },

    /// Category lookup failed
    #[error("Category not found: {name}")]
    CategoryNotFound {
        /// Requested category name or ID
        name: String,
    },

    /// Order lookup failed
    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Requested order ID
        id: i64,
    },

    /// User lookup failed
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user ID or email
        id: String,
    },

    /// Address lookup failed
    #[error("Address not found: {id}")]
    AddressNotFound {
        /// Requested address ID
        id: i64,
    },

    /// A user with this email is already registered
    #[error("Email already registered: {email}")]
    DuplicateEmail {
        /// The conflicting email
        email: String,
    },

    /// Money amount was negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Item quantity was zero or negative
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// I/O failure (reading config, binding sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Integer conversion overflowed
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
