//! Order numbering - Sequential, human-readable tracking numbers.
//!
//! A tracking number is `S` followed by the count of existing orders plus one,
//! zero-padded to at least two digits (`S01`, `S12`, `S137`). Counting is only safe
//! inside the checkout transaction after [`lock_order_sequence`] has taken the write lock
//! on the sequence row; two checkouts can then never observe the same count.

use crate::{
    entities::{Order, SystemState, system_state},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, Set, prelude::*, sea_query::Expr};
use tracing::debug;

/// `system_state` key of the row that serializes tracking-number allocation.
pub const ORDER_SEQUENCE_KEY: &str = "order_sequence";

/// Formats a sequence value as a tracking number.
#[must_use]
pub fn format_tracking_number(sequence: u64) -> String {
    format!("S{sequence:02}")
}

/// Takes the write lock on the order sequence row, creating the row on first use.
///
/// The update is a no-op for the data apart from `updated_at`; its purpose is the lock it
/// holds until the surrounding transaction ends.
pub async fn lock_order_sequence<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let result = SystemState::update_many()
        .col_expr(system_state::Column::UpdatedAt, Expr::value(now))
        .filter(system_state::Column::Key.eq(ORDER_SEQUENCE_KEY))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        system_state::ActiveModel {
            key: Set(ORDER_SEQUENCE_KEY.to_string()),
            value: Set("0".to_string()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Allocates the next tracking number.
///
/// Must be called with the checkout transaction, before the order it numbers is inserted.
/// The issued sequence value is recorded on the sequence row.
pub async fn next_tracking_number<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    lock_order_sequence(db).await?;

    let existing = Order::find().count(db).await?;
    let sequence = existing + 1;

    SystemState::update_many()
        .col_expr(system_state::Column::Value, Expr::value(sequence.to_string()))
        .filter(system_state::Column::Key.eq(ORDER_SEQUENCE_KEY))
        .exec(db)
        .await?;

    let tracking_number = format_tracking_number(sequence);
    debug!("Allocated tracking number {}", tracking_number);
    Ok(tracking_number)
}
