//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        cart::CartLine,
        catalog::{self, ProductFields},
        checkout::{self, CheckoutOptions},
        user::{self, NewUser},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Category every test product is filed under.
pub const TEST_CATEGORY: &str = "accessories";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a customer named "Test User" with the given email.
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<entities::user::Model> {
    user::register_user(
        db,
        NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
        },
    )
    .await
}

/// Creates a product in [`TEST_CATEGORY`].
///
/// # Defaults
/// * `description`, `image_url`: None
/// * `seller`: "Test Seller"
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    stock_quantity: i32,
) -> Result<entities::product::Model> {
    let category = catalog::get_or_create_category(db, TEST_CATEGORY).await?;
    catalog::create_product(
        db,
        ProductFields {
            name: name.to_string(),
            description: None,
            price,
            stock_quantity,
            image_url: None,
            category_id: category.id,
            seller: Some("Test Seller".to_string()),
        },
    )
    .await
}

/// Sets up a database with one user and one product (price 10.00, stock 10).
pub async fn setup_with_product() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::product::Model,
)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test@example.com").await?;
    let product = create_test_product(&db, "Test Product", 10.0, 10).await?;
    Ok((db, user, product))
}

/// A cart line for `quantity` units of `product` at its current price.
pub fn cart_line(product: &entities::product::Model, quantity: i32) -> CartLine {
    CartLine {
        product_id: product.id,
        name: product.name.clone(),
        unit_price: product.price,
        image_url: product.image_url.clone(),
        quantity,
    }
}

/// Places an order for `lines` with the default payment method, now.
pub async fn place_test_order(
    db: &DatabaseConnection,
    user_id: i64,
    lines: &[CartLine],
) -> Result<entities::order::Model> {
    checkout::place_order(db, user_id, lines, &CheckoutOptions::default()).await
}
