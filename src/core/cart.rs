//! Cart business logic - The per-user list of products waiting for checkout.
//!
//! Lines are persisted in `cart_items` so a cart survives between requests and devices.
//! Checkout never reads this table itself: callers load the lines with [`get_cart`], pass
//! them to [`crate::core::checkout`] as a value, and call [`clear_cart`] only after the
//! order committed.

use crate::{
    core::catalog,
    entities::{CartItem, cart_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One product and quantity in a pending purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product to buy
    pub product_id: i64,
    /// Product name, used in messages
    pub name: String,
    /// Price per unit as shown when the product was added
    pub unit_price: f64,
    /// Product image as shown when the product was added
    #[serde(default)]
    pub image_url: Option<String>,
    /// Units requested
    pub quantity: i32,
}

impl CartLine {
    /// Price of this line at the shown unit price.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

impl From<cart_item::Model> for CartLine {
    fn from(item: cart_item::Model) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name,
            unit_price: item.unit_price,
            image_url: item.image_url,
            quantity: item.quantity,
        }
    }
}

/// Sum of line subtotals at the shown prices.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> f64 {
    lines.iter().map(CartLine::subtotal).sum()
}

/// Adds `quantity` units of a product to the user's cart.
///
/// If the product is already in the cart its quantity is increased; otherwise a new line
/// is created with a snapshot of the product's name, price and image.
///
/// # Errors
/// Returns an error if the quantity is not positive, the product does not exist or was
/// deleted, or the database operation fails.
pub async fn add_to_cart(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<cart_item::Model> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let product = catalog::get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let existing = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?;

    if let Some(item) = existing {
        CartItem::update_many()
            .col_expr(
                cart_item::Column::Quantity,
                Expr::col(cart_item::Column::Quantity).add(quantity),
            )
            .filter(cart_item::Column::Id.eq(item.id))
            .exec(db)
            .await?;
        debug!(
            "Increased quantity of product {} in cart of user {} by {}",
            product_id, user_id, quantity
        );
        return CartItem::find_by_id(item.id)
            .one(db)
            .await?
            .ok_or(Error::ProductNotFound { id: product_id });
    }

    let item = cart_item::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product.id),
        name: Set(product.name),
        unit_price: Set(product.price),
        image_url: Set(product.image_url),
        quantity: Set(quantity),
        added_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let item = item.insert(db).await?;
    info!("Added product {} to cart of user {}", product_id, user_id);
    Ok(item)
}

/// Removes a product from the user's cart. Returns the number of lines removed.
pub async fn remove_from_cart(db: &DatabaseConnection, user_id: i64, product_id: i64) -> Result<u64> {
    let result = CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Empties the user's cart. Returns the number of lines removed.
pub async fn clear_cart(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    let result = CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    debug!("Cleared {} cart lines for user {}", result.rows_affected, user_id);
    Ok(result.rows_affected)
}

/// Loads the user's cart in the order lines were added.
pub async fn get_cart(db: &DatabaseConnection, user_id: i64) -> Result<Vec<CartLine>> {
    let items = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await?;
    Ok(items.into_iter().map(CartLine::from).collect())
}

/// Total number of units in the user's cart.
pub async fn cart_count(db: &DatabaseConnection, user_id: i64) -> Result<i64> {
    let lines = get_cart(db, user_id).await?;
    Ok(lines.iter().map(|line| i64::from(line.quantity)).sum())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_cart_total() {
        let lines = vec![
            CartLine {
                product_id: 1,
                name: "Hat".to_string(),
                unit_price: 10.0,
                image_url: None,
                quantity: 2,
            },
            CartLine {
                product_id: 2,
                name: "Bag".to_string(),
                unit_price: 2.5,
                image_url: None,
                quantity: 4,
            },
        ];
        assert_eq!(cart_total(&lines), 30.0);
        assert_eq!(cart_total(&[]), 0.0);
    }

    #[tokio::test]
    async fn test_add_to_cart_rejects_non_positive_quantity() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = add_to_cart(&db, 1, 1, 0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: 0 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_to_cart_unknown_product() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "cart@example.com").await?;
        let result = add_to_cart(&db, user.id, 999, 1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_same_product_increments_quantity() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;

        let first = add_to_cart(&db, user.id, product.id, 1).await?;
        assert_eq!(first.quantity, 1);
        assert_eq!(first.name, product.name);
        assert_eq!(first.unit_price, product.price);

        let second = add_to_cart(&db, user.id, product.id, 2).await?;
        assert_eq!(second.id, first.id);
        assert_eq!(second.quantity, 3);

        let cart = get_cart(&db, user.id).await?;
        assert_eq!(cart.len(), 1);
        assert_eq!(cart_count(&db, user.id).await?, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_cart_preserves_insertion_order() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let other = create_test_product(&db, "Another", 5.0, 10).await?;

        add_to_cart(&db, user.id, other.id, 1).await?;
        add_to_cart(&db, user.id, product.id, 1).await?;

        let cart = get_cart(&db, user.id).await?;
        assert_eq!(cart[0].product_id, other.id);
        assert_eq!(cart[1].product_id, product.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_and_clear_cart() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let other = create_test_product(&db, "Another", 5.0, 10).await?;
        let someone_else = create_test_user(&db, "other@example.com").await?;

        add_to_cart(&db, user.id, product.id, 1).await?;
        add_to_cart(&db, user.id, other.id, 1).await?;
        add_to_cart(&db, someone_else.id, product.id, 1).await?;

        assert_eq!(remove_from_cart(&db, user.id, product.id).await?, 1);
        assert_eq!(get_cart(&db, user.id).await?.len(), 1);

        assert_eq!(clear_cart(&db, user.id).await?, 1);
        assert!(get_cart(&db, user.id).await?.is_empty());
        assert_eq!(cart_count(&db, user.id).await?, 0);

        // Other carts are untouched
        assert_eq!(get_cart(&db, someone_else.id).await?.len(), 1);

        Ok(())
    }
}
