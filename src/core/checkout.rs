//! Checkout - Turns a cart into a placed order in one transaction.
//!
//! Everything checkout writes happens inside a single database transaction: the tracking
//! number allocation, the order row, and for every cart line the stock decrement, the
//! order line, the sale record and the tracking entry. Either all of it commits or none
//! of it does, so a partial order is never observable.
//!
//! Prices come from the catalog as read inside the transaction. The unit price carried
//! by a cart line is only what the shopper was shown and is never charged.
//!
//! Stock is decremented with a guarded update (`stock_quantity >= quantity`) and the
//! affected-row count is checked, so two checkouts racing for the last unit cannot both
//! succeed.

use crate::{
    core::{cart::CartLine, delivery::estimate_delivery, numbering::next_tracking_number},
    entities::{Product, User, order, order_line, product, sale, tracking_entry},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{error, info, instrument, warn};

/// Payment method recorded when the caller does not choose one.
pub const DEFAULT_PAYMENT_METHOD: &str = "PayPal";

/// Status of every freshly placed order.
pub const INITIAL_ORDER_STATUS: &str = "pending";

/// Inputs of a checkout that do not come from the cart.
#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    /// Payment method label stored on the order
    pub payment_method: String,
    /// Clock reading used for `placed_at` and the delivery estimate
    pub placed_at: DateTime<Utc>,
}

impl CheckoutOptions {
    /// Options for a checkout happening now.
    #[must_use]
    pub fn now(payment_method: impl Into<String>) -> Self {
        Self {
            payment_method: payment_method.into(),
            placed_at: Utc::now(),
        }
    }
}

impl Default for CheckoutOptions {
    fn default() -> Self {
        Self::now(DEFAULT_PAYMENT_METHOD)
    }
}

/// A cart line resolved against the catalog inside the transaction.
#[derive(Debug, Clone)]
struct PricedLine {
    product_id: i64,
    name: String,
    unit_price: f64,
    quantity: i32,
}

impl PricedLine {
    fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Rejects requests that must never open a transaction.
///
/// # Errors
/// Returns `Error::InvalidSession` when there is no user or the cart is empty, and
/// `Error::InvalidQuantity` when a line asks for zero or fewer units.
pub fn validate_cart(user_id: i64, cart: &[CartLine]) -> Result<()> {
    if user_id <= 0 {
        return Err(Error::InvalidSession {
            reason: "no authenticated user".to_string(),
        });
    }

    if cart.is_empty() {
        return Err(Error::InvalidSession {
            reason: "cart is empty".to_string(),
        });
    }

    if let Some(line) = cart.iter().find(|line| line.quantity <= 0) {
        return Err(Error::InvalidQuantity {
            quantity: line.quantity,
        });
    }

    Ok(())
}

/// Places an order for `cart` now with the default payment method and returns its ID.
///
/// See [`place_order`] for the full contract.
pub async fn finalize_checkout(
    db: &DatabaseConnection,
    user_id: i64,
    cart: &[CartLine],
) -> Result<i64> {
    place_order(db, user_id, cart, &CheckoutOptions::default())
        .await
        .map(|order| order.id)
}

/// Places an order for `cart` and returns the committed order row.
///
/// The caller keeps ownership of the cart and should clear it only when this returns
/// `Ok`.
///
/// # Errors
/// - `Error::InvalidSession` if the user is missing or unknown, or the cart is empty
/// - `Error::InvalidQuantity` if a line asks for zero or fewer units
/// - `Error::InsufficientStock` naming the first line whose product is missing, deleted,
///   or short on stock; nothing is written
/// - `Error::Database` for any store failure; nothing is written
#[instrument(skip(db, cart, options), fields(lines = cart.len()))]
pub async fn place_order(
    db: &DatabaseConnection,
    user_id: i64,
    cart: &[CartLine],
    options: &CheckoutOptions,
) -> Result<order::Model> {
    validate_cart(user_id, cart)?;

    if User::find_by_id(user_id).one(db).await?.is_none() {
        return Err(Error::InvalidSession {
            reason: format!("unknown user {user_id}"),
        });
    }

    let txn = db.begin().await?;

    match write_order(&txn, user_id, cart, options).await {
        Ok(order) => {
            txn.commit().await?;
            info!(
                "Placed order {} ({}) for user {}: total=${:.2}",
                order.id, order.tracking_number, user_id, order.total
            );
            Ok(order)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!("Failed to roll back checkout for user {}: {}", user_id, rollback_err);
            }
            warn!("Checkout for user {} rolled back: {}", user_id, e);
            Err(e)
        }
    }
}

async fn write_order(
    txn: &DatabaseTransaction,
    user_id: i64,
    cart: &[CartLine],
    options: &CheckoutOptions,
) -> Result<order::Model> {
    let priced = price_lines(txn, cart).await?;
    let total: f64 = priced.iter().map(PricedLine::subtotal).sum();

    let tracking_number = next_tracking_number(txn).await?;
    let estimated_delivery = estimate_delivery(options.placed_at)
        .and_time(NaiveTime::MIN)
        .and_utc();

    let order = order::ActiveModel {
        user_id: Set(user_id),
        total: Set(total),
        payment_method: Set(options.payment_method.clone()),
        status: Set(INITIAL_ORDER_STATUS.to_string()),
        tracking_number: Set(tracking_number),
        placed_at: Set(options.placed_at),
        estimated_delivery: Set(estimated_delivery),
        cancelled_at: Set(None),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    for line in &priced {
        reserve_stock(txn, line, options.placed_at).await?;

        order_line::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        sale::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            recorded_at: Set(options.placed_at),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        tracking_entry::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(line.product_id),
            recorded_at: Set(options.placed_at),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    Ok(order)
}

/// Resolves every cart line against the catalog, keeping cart order.
async fn price_lines(txn: &DatabaseTransaction, cart: &[CartLine]) -> Result<Vec<PricedLine>> {
    let mut priced = Vec::with_capacity(cart.len());
    for line in cart {
        let product = Product::find_by_id(line.product_id)
            .filter(product::Column::IsDeleted.eq(false))
            .one(txn)
            .await?
            .ok_or_else(|| Error::InsufficientStock {
                product: line.name.clone(),
            })?;

        priced.push(PricedLine {
            product_id: product.id,
            name: product.name,
            unit_price: product.price,
            quantity: line.quantity,
        });
    }
    Ok(priced)
}

/// Decrements stock for one line if enough units remain.
async fn reserve_stock(
    txn: &DatabaseTransaction,
    line: &PricedLine,
    now: DateTime<Utc>,
) -> Result<()> {
    let result = Product::update_many()
        .col_expr(
            product::Column::StockQuantity,
            Expr::col(product::Column::StockQuantity).sub(line.quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(now))
        .filter(product::Column::Id.eq(line.product_id))
        .filter(product::Column::StockQuantity.gte(line.quantity))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::InsufficientStock {
            product: line.name.clone(),
        });
    }
    Ok(())
}
