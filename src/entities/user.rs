//! User entity - Registered customers and administrators.
//!
//! Users are created through registration with status `active` and role `customer`.
//! Admins can suspend or reactivate accounts; credentials live outside this crate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name(s)
    pub last_name: String,
    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// Account status: `"active"` or `"suspended"`
    pub status: String,
    /// Account role: `"customer"` or `"admin"`
    pub role: String,
    /// When the user registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user places many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    /// One user has many shipping addresses
    #[sea_orm(has_many = "super::address::Entity")]
    Addresses,
    /// One user has many cart items
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Addresses.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
