//! Order business logic - Reading placed orders and moving them through their states.
//!
//! Orders start as `pending` at checkout. Admins may set any free-text status (e.g.
//! `shipped`) and correct the tracking number; the terminal states are `delivered` and
//! `cancelled`. Customers may cancel an order until it reaches a terminal state.

use crate::{
    entities::{
        Address, Order, OrderLine, Product, TrackingEntry, User, address, order, order_line,
        product, tracking_entry,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, instrument};

/// Lifecycle state of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    /// Placed, not yet handled
    Pending,
    /// Received by the customer
    Delivered,
    /// Cancelled by the customer
    Cancelled,
    /// Intermediate state set by an admin, e.g. `shipped`
    Other(String),
}

impl OrderStatus {
    /// Stored value of [`OrderStatus::Pending`]
    pub const PENDING: &'static str = "pending";
    /// Stored value of [`OrderStatus::Delivered`]
    pub const DELIVERED: &'static str = "delivered";
    /// Stored value of [`OrderStatus::Cancelled`]
    pub const CANCELLED: &'static str = "cancelled";

    /// Values that mean a terminal state, including Spanish and US spellings that may
    /// predate normalization.
    pub const TERMINAL_VALUES: [&'static str; 5] =
        ["delivered", "cancelled", "entregado", "cancelado", "canceled"];

    /// Parses a status value. Case and surrounding whitespace are ignored and the Spanish
    /// names (`pendiente`, `entregado`, `cancelado`) are accepted.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Self::Pending,
            "delivered" | "entregado" => Self::Delivered,
            "cancelled" | "canceled" | "cancelado" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    /// The value stored in the `status` column.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => Self::PENDING,
            Self::Delivered => Self::DELIVERED,
            Self::Cancelled => Self::CANCELLED,
            Self::Other(value) => value,
        }
    }

    /// Whether no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a cancellation request.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    /// The order is now cancelled
    Cancelled(order::Model),
    /// The order was already delivered or cancelled and was left unchanged
    Rejected {
        /// Status the order is still in
        status: String,
    },
}

/// One order line joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineDetail {
    /// Purchased product
    pub product_id: i64,
    /// Product name, empty if the product row is gone
    pub product_name: String,
    /// Product image
    pub image_url: Option<String>,
    /// Seller or brand
    pub seller: Option<String>,
    /// Units purchased
    pub quantity: i32,
    /// Price per unit at checkout
    pub unit_price: f64,
    /// `quantity * unit_price`
    pub subtotal: f64,
}

impl OrderLineDetail {
    fn new(line: order_line::Model, product: Option<product::Model>) -> Self {
        let subtotal = line.unit_price * f64::from(line.quantity);
        let (product_name, image_url, seller) = product
            .map(|p| (p.name, p.image_url, p.seller))
            .unwrap_or_default();
        Self {
            product_id: line.product_id,
            product_name,
            image_url,
            seller,
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal,
        }
    }
}

/// An order with its lines, as listed on the customer's orders page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWithLines {
    /// The order row
    pub order: order::Model,
    /// Its lines in checkout order
    pub lines: Vec<OrderLineDetail>,
}

/// Everything shown on the purchase summary and refund pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    /// The order row
    pub order: order::Model,
    /// Buyer's full name
    pub customer_name: String,
    /// Buyer's email
    pub email: String,
    /// Buyer's first saved address, if any
    pub address: Option<address::Model>,
    /// Order lines in checkout order
    pub lines: Vec<OrderLineDetail>,
}

/// One row of the per-user tracking page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingView {
    /// Tracking entry ID
    pub id: i64,
    /// Purchased product
    pub product_id: i64,
    /// Product name, empty if the product row is gone
    pub product_name: String,
    /// When the purchase committed
    pub recorded_at: DateTime<Utc>,
}

/// Loads the lines of `orders`, joined with products, grouped by order ID.
pub(crate) async fn load_line_details<C>(
    db: &C,
    orders: &[order::Model],
) -> Result<HashMap<i64, Vec<OrderLineDetail>>>
where
    C: ConnectionTrait,
{
    if orders.is_empty() {
        return Ok(HashMap::new());
    }

    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let rows = OrderLine::find()
        .filter(order_line::Column::OrderId.is_in(order_ids))
        .find_also_related(Product)
        .order_by_asc(order_line::Column::Id)
        .all(db)
        .await?;

    let mut grouped: HashMap<i64, Vec<OrderLineDetail>> = HashMap::new();
    for (line, product) in rows {
        grouped
            .entry(line.order_id)
            .or_default()
            .push(OrderLineDetail::new(line, product));
    }
    Ok(grouped)
}

/// Finds an order by ID.
pub async fn get_order_by_id(db: &DatabaseConnection, order_id: i64) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Lists a user's orders with their lines, newest first.
pub async fn get_orders_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<OrderWithLines>> {
    let orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::PlacedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;

    let mut lines = load_line_details(db, &orders).await?;
    Ok(orders
        .into_iter()
        .map(|order| {
            let order_lines = lines.remove(&order.id).unwrap_or_default();
            OrderWithLines {
                order,
                lines: order_lines,
            }
        })
        .collect())
}

/// Builds the purchase summary of an order, or `None` if it does not exist.
pub async fn get_order_summary(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<OrderSummary>> {
    let Some(order) = get_order_by_id(db, order_id).await? else {
        return Ok(None);
    };

    let customer = User::find_by_id(order.user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: order.user_id.to_string(),
        })?;

    let address = Address::find()
        .filter(address::Column::UserId.eq(order.user_id))
        .order_by_asc(address::Column::Id)
        .one(db)
        .await?;

    let mut lines = load_line_details(db, std::slice::from_ref(&order)).await?;
    let order_lines = lines.remove(&order.id).unwrap_or_default();

    Ok(Some(OrderSummary {
        customer_name: format!("{} {}", customer.first_name, customer.last_name),
        email: customer.email,
        address,
        lines: order_lines,
        order,
    }))
}

/// Returns the refund view of an order: its summary, only if it is cancelled.
pub async fn get_refund(db: &DatabaseConnection, order_id: i64) -> Result<Option<OrderSummary>> {
    let summary = get_order_summary(db, order_id).await?;
    Ok(summary.filter(|s| OrderStatus::parse(&s.order.status) == OrderStatus::Cancelled))
}

/// Cancels an order unless it is already delivered or cancelled.
///
/// On success the status becomes `cancelled` and both `cancelled_at` and
/// `estimated_delivery` are set to `now`. The guard is part of the UPDATE itself, so a
/// concurrent status change cannot slip in between check and write.
///
/// # Errors
/// Returns `Error::OrderNotFound` if the order does not exist, or `Error::Database`.
#[instrument(skip(db))]
pub async fn cancel_order(
    db: &DatabaseConnection,
    order_id: i64,
    now: DateTime<Utc>,
) -> Result<CancelOutcome> {
    let result = Order::update_many()
        .col_expr(order::Column::Status, Expr::value(OrderStatus::CANCELLED))
        .col_expr(order::Column::CancelledAt, Expr::value(Some(now)))
        .col_expr(order::Column::EstimatedDelivery, Expr::value(now))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Status.is_not_in(OrderStatus::TERMINAL_VALUES))
        .exec(db)
        .await?;

    let order = get_order_by_id(db, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if result.rows_affected == 0 {
        info!(
            "Refused to cancel order {} in status '{}'",
            order_id, order.status
        );
        return Ok(CancelOutcome::Rejected {
            status: order.status,
        });
    }

    info!("Cancelled order {} ({})", order.id, order.tracking_number);
    Ok(CancelOutcome::Cancelled(order))
}

/// Admin edit of an order's status and tracking number.
///
/// The status is stored in canonical form (see [`OrderStatus::parse`]), so `Entregado`
/// becomes `delivered` and the order can no longer be cancelled.
///
/// # Errors
/// Returns `Error::Config` for an empty status or tracking number, `Error::OrderNotFound`
/// if the order does not exist, or `Error::Database` (e.g. a duplicate tracking number).
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: &str,
    tracking_number: &str,
) -> Result<order::Model> {
    let tracking_number = tracking_number.trim();
    if status.trim().is_empty() || tracking_number.is_empty() {
        return Err(Error::Config {
            message: "Order status and tracking number cannot be empty".to_string(),
        });
    }

    let existing = get_order_by_id(db, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    let status = OrderStatus::parse(status);
    let mut order: order::ActiveModel = existing.into();
    order.status = Set(status.as_str().to_string());
    order.tracking_number = Set(tracking_number.to_string());
    let updated = order.update(db).await?;
    info!(
        "Order {} set to '{}' ({})",
        updated.id, updated.status, updated.tracking_number
    );
    Ok(updated)
}

/// Lists a user's purchase tracking entries, newest first.
pub async fn get_tracking_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<TrackingView>> {
    let rows = TrackingEntry::find()
        .filter(tracking_entry::Column::UserId.eq(user_id))
        .find_also_related(Product)
        .order_by_desc(tracking_entry::Column::RecordedAt)
        .order_by_desc(tracking_entry::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(entry, product)| TrackingView {
            id: entry.id,
            product_id: entry.product_id,
            product_name: product.map(|p| p.name).unwrap_or_default(),
            recorded_at: entry.recorded_at,
        })
        .collect())
}

/// Product to send the customer to when they ask to buy an order again: its first line.
pub async fn get_reorder_product(db: &DatabaseConnection, order_id: i64) -> Result<Option<i64>> {
    let line = OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::Id)
        .one(db)
        .await?;
    Ok(line.map(|l| l.product_id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::address::{AddressFields, add_address};
    use crate::test_utils::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_status_round_trip_and_terminal_states() {
        assert_eq!(OrderStatus::parse("pending"), OrderStatus::Pending);
        assert_eq!(OrderStatus::parse("delivered"), OrderStatus::Delivered);
        assert_eq!(OrderStatus::parse("cancelled"), OrderStatus::Cancelled);
        assert_eq!(
            OrderStatus::parse("shipped"),
            OrderStatus::Other("shipped".to_string())
        );
        assert_eq!(OrderStatus::parse("shipped").as_str(), "shipped");
        assert_eq!(OrderStatus::parse(" Delivered "), OrderStatus::Delivered);
        assert_eq!(OrderStatus::parse("entregado"), OrderStatus::Delivered);
        assert_eq!(OrderStatus::parse("CANCELADO"), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::parse("pendiente"), OrderStatus::Pending);
        assert_eq!(OrderStatus::parse("Shipped").as_str(), "shipped");

        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Other("processing".to_string()).is_terminal());
    }

    #[tokio::test]
    async fn test_cancel_pending_order() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let order = place_test_order(&db, user.id, &[cart_line(&product, 1)]).await?;
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 14, 5, 0).unwrap();

        let outcome = cancel_order(&db, order.id, now).await?;
        let CancelOutcome::Cancelled(cancelled) = outcome else {
            panic!("expected cancellation, got {outcome:?}");
        };

        assert_eq!(cancelled.status, "cancelled");
        assert_eq!(cancelled.cancelled_at, Some(now));
        assert_eq!(cancelled.estimated_delivery, now);
        assert_eq!(cancelled.total, order.total);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_shipped_order_is_allowed() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let order = place_test_order(&db, user.id, &[cart_line(&product, 1)]).await?;
        update_order_status(&db, order.id, "shipped", &order.tracking_number).await?;

        let outcome = cancel_order(&db, order.id, Utc::now()).await?;
        assert!(matches!(outcome, CancelOutcome::Cancelled(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_terminal_orders_is_rejected() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let delivered = place_test_order(&db, user.id, &[cart_line(&product, 1)]).await?;
        update_order_status(&db, delivered.id, "delivered", &delivered.tracking_number).await?;

        let outcome = cancel_order(&db, delivered.id, Utc::now()).await?;
        assert_eq!(
            outcome,
            CancelOutcome::Rejected {
                status: "delivered".to_string()
            }
        );
        let unchanged = get_order_by_id(&db, delivered.id).await?.unwrap();
        assert!(unchanged.cancelled_at.is_none());
        assert_eq!(unchanged.estimated_delivery, delivered.estimated_delivery);

        let cancelled = place_test_order(&db, user.id, &[cart_line(&product, 1)]).await?;
        let first_time = Utc::now();
        cancel_order(&db, cancelled.id, first_time).await?;
        let second = cancel_order(&db, cancelled.id, first_time + Duration::hours(1)).await?;
        assert_eq!(
            second,
            CancelOutcome::Rejected {
                status: "cancelled".to_string()
            }
        );
        let still = get_order_by_id(&db, cancelled.id).await?.unwrap();
        assert_eq!(still.cancelled_at, Some(first_time));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_delivered_spellings_block_cancellation() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;

        for spelling in ["entregado", "Delivered", "  DELIVERED "] {
            let order = place_test_order(&db, user.id, &[cart_line(&product, 1)]).await?;
            let updated =
                update_order_status(&db, order.id, spelling, &order.tracking_number).await?;
            assert_eq!(updated.status, "delivered");

            let outcome = cancel_order(&db, order.id, Utc::now()).await?;
            assert_eq!(
                outcome,
                CancelOutcome::Rejected {
                    status: "delivered".to_string()
                }
            );
            let unchanged = get_order_by_id(&db, order.id).await?.unwrap();
            assert!(unchanged.cancelled_at.is_none());
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_respects_legacy_terminal_values() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let order = place_test_order(&db, user.id, &[cart_line(&product, 1)]).await?;

        // Rows written before statuses were normalized
        let mut legacy: order::ActiveModel = order.clone().into();
        legacy.status = Set("entregado".to_string());
        legacy.update(&db).await?;

        let outcome = cancel_order(&db, order.id, Utc::now()).await?;
        assert!(matches!(outcome, CancelOutcome::Rejected { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_missing_order() -> Result<()> {
        let db = setup_test_db().await?;
        let result = cancel_order(&db, 404, Utc::now()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::OrderNotFound { id: 404 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_order_status_validation() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let order = place_test_order(&db, user.id, &[cart_line(&product, 1)]).await?;

        let result = update_order_status(&db, order.id, "  ", "S01").await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        let result = update_order_status(&db, 999, "shipped", "S99").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::OrderNotFound { id: 999 }
        ));

        let updated = update_order_status(&db, order.id, "processing", "S01-A").await?;
        assert_eq!(updated.status, "processing");
        assert_eq!(updated.tracking_number, "S01-A");

        Ok(())
    }

    #[tokio::test]
    async fn test_orders_for_user_newest_first_with_lines() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let other = create_test_product(&db, "Tote Bag", 40.0, 10).await?;

        let first = place_test_order(&db, user.id, &[cart_line(&product, 1)]).await?;
        let second = place_test_order(
            &db,
            user.id,
            &[cart_line(&product, 2), cart_line(&other, 1)],
        )
        .await?;

        let orders = get_orders_for_user(&db, user.id).await?;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order.id, second.id);
        assert_eq!(orders[1].order.id, first.id);

        let lines = &orders[0].lines;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_name, product.name);
        assert_eq!(lines[0].subtotal, product.price * 2.0);
        assert_eq!(lines[1].product_name, "Tote Bag");

        let stranger = create_test_user(&db, "stranger@example.com").await?;
        assert!(get_orders_for_user(&db, stranger.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_order_summary_and_refund() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        add_address(
            &db,
            user.id,
            AddressFields {
                phone: "5550001".to_string(),
                street: "Calle 1".to_string(),
                city: "Puebla".to_string(),
                municipality: "Centro".to_string(),
                state: "Puebla".to_string(),
                postal_code: "72000".to_string(),
            },
        )
        .await?;
        let order = place_test_order(&db, user.id, &[cart_line(&product, 3)]).await?;

        let summary = get_order_summary(&db, order.id).await?.unwrap();
        assert_eq!(summary.customer_name, "Test User");
        assert_eq!(summary.email, user.email);
        assert_eq!(summary.address.unwrap().city, "Puebla");
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].quantity, 3);

        assert!(get_refund(&db, order.id).await?.is_none());
        cancel_order(&db, order.id, Utc::now()).await?;
        let refund = get_refund(&db, order.id).await?.unwrap();
        assert_eq!(refund.order.status, "cancelled");

        assert!(get_order_summary(&db, 999).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_tracking_and_reorder() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let other = create_test_product(&db, "Plush Bear", 15.0, 10).await?;

        let order = place_test_order(
            &db,
            user.id,
            &[cart_line(&other, 1), cart_line(&product, 1)],
        )
        .await?;

        let tracking = get_tracking_for_user(&db, user.id).await?;
        assert_eq!(tracking.len(), 2);
        assert!(tracking.iter().any(|t| t.product_name == "Plush Bear"));

        assert_eq!(get_reorder_product(&db, order.id).await?, Some(other.id));
        assert_eq!(get_reorder_product(&db, 999).await?, None);

        Ok(())
    }
}
