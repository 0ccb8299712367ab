//! Product entity - Items for sale in the catalog.
//!
//! Each product belongs to a category and carries its current price and stock level.
//! `stock_quantity` is only ever decremented by checkout through a guarded update, so it
//! never goes negative. Products are soft-deleted because order lines keep referencing them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Straw Hat")
    pub name: String,
    /// Longer marketing description
    pub description: Option<String>,
    /// Current catalog price per unit
    pub price: f64,
    /// Units available for sale
    pub stock_quantity: i32,
    /// URL of the main product image
    pub image_url: Option<String>,
    /// ID of the category this product is listed under
    pub category_id: i64,
    /// Name of the seller or brand
    pub seller: Option<String>,
    /// Soft delete flag - if true, product is hidden but order history still resolves
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// One product appears on many order lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
