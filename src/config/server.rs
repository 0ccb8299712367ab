//! Server settings read from environment variables.
//!
//! All settings are optional and fall back to development defaults, so the `.env`
//! file only needs the values that differ.

/// Gets the socket address the HTTP API binds to (`STOREFRONT_BIND_ADDR`).
#[must_use]
pub fn get_bind_address() -> String {
    std::env::var("STOREFRONT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3002".to_string())
}

/// Gets the payment method recorded on new orders (`STOREFRONT_PAYMENT_METHOD`).
#[must_use]
pub fn get_payment_method() -> String {
    std::env::var("STOREFRONT_PAYMENT_METHOD").unwrap_or_else(|_| "PayPal".to_string())
}

/// Gets the path of the catalog seed file (`STOREFRONT_CATALOG`).
#[must_use]
pub fn get_catalog_path() -> String {
    std::env::var("STOREFRONT_CATALOG").unwrap_or_else(|_| "config.toml".to_string())
}
