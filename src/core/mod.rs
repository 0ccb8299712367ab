//! Core business logic - framework-agnostic store operations.
//!
//! Every function takes a database connection and returns structured data; the HTTP
//! layer in [`crate::api`] only translates requests and responses.

/// Saved shipping addresses
pub mod address;
/// Per-user shopping cart
pub mod cart;
/// Categories, products and catalog seeding
pub mod catalog;
/// Turning a cart into a placed order
pub mod checkout;
/// Business-day delivery estimates
pub mod delivery;
/// Sequential order tracking numbers
pub mod numbering;
/// Order reads, cancellation and admin edits
pub mod order;
/// Sales history reporting
pub mod report;
/// Registration and account administration
pub mod user;
