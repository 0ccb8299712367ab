//! Sale entity - Append-only sales ledger written by checkout.
//!
//! One row per purchased line, written in the checkout transaction. Rows are never updated
//! or deleted. This is an audit trail: nothing in the crate reads it back, and reports
//! are built from orders and their lines, which carry the tracking number and status.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Buyer
    pub user_id: i64,
    /// Product sold
    pub product_id: i64,
    /// Units sold
    pub quantity: i32,
    /// Price per unit at checkout time
    pub unit_price: f64,
    /// When the sale was recorded
    pub recorded_at: DateTimeUtc,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale belongs to one buyer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each sale references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
