/// Database configuration and connection management
pub mod database;

/// Catalog seed loading from config.toml
pub mod catalog;

/// HTTP server and checkout settings from environment variables
pub mod server;
