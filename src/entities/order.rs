//! Order entity - The persisted result of a successful checkout.
//!
//! An order is inserted exactly once per checkout, inside the same transaction as its
//! lines, sale records and stock decrements. Afterwards only `status`, `tracking_number`,
//! `estimated_delivery` and `cancelled_at` change, through admin edits or cancellation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the user who placed the order
    pub user_id: i64,
    /// Sum of quantity * unit price over all order lines
    pub total: f64,
    /// Payment method label (e.g. `"PayPal"`)
    pub payment_method: String,
    /// `"pending"`, `"delivered"`, `"cancelled"` or admin-set free text
    pub status: String,
    /// Human-readable sequential identifier (`S01`, `S02`, ...)
    #[sea_orm(unique)]
    pub tracking_number: String,
    /// When checkout committed
    pub placed_at: DateTimeUtc,
    /// Estimated delivery (midnight UTC), or the cancellation time once cancelled
    pub estimated_delivery: DateTimeUtc,
    /// When the order was cancelled, if it was
    pub cancelled_at: Option<DateTimeUtc>,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One order has many lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
