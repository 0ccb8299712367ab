//! Route handlers grouped by area.

/// Registration and saved addresses
pub mod accounts;
/// Back-office users, orders, products and sales
pub mod admin;
/// Cart lines of the current user
pub mod cart;
/// Public product and category reads
pub mod catalog;
/// Placing an order from the cart
pub mod checkout;
/// The current user's orders and tracking
pub mod orders;
