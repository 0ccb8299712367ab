//! Address business logic - Shipping addresses saved per user.

use crate::{
    entities::{Address, User, address},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Editable address fields.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressFields {
    /// Contact phone number
    pub phone: String,
    /// Street and number
    pub street: String,
    /// City
    pub city: String,
    /// Municipality or district
    pub municipality: String,
    /// State or province
    pub state: String,
    /// Postal code
    pub postal_code: String,
}

impl AddressFields {
    fn validate(&self) -> Result<()> {
        let required = [
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(Error::Config {
                message: format!("Address field '{field}' cannot be empty"),
            });
        }
        Ok(())
    }
}

/// Saves a new address for a user.
///
/// # Errors
/// Returns `Error::UserNotFound` if the user does not exist, `Error::Config` if a required
/// field is blank, or `Error::Database`.
pub async fn add_address(
    db: &DatabaseConnection,
    user_id: i64,
    fields: AddressFields,
) -> Result<address::Model> {
    fields.validate()?;
    if User::find_by_id(user_id).one(db).await?.is_none() {
        return Err(Error::UserNotFound {
            id: user_id.to_string(),
        });
    }

    let address = address::ActiveModel {
        user_id: Set(user_id),
        phone: Set(fields.phone.trim().to_string()),
        street: Set(fields.street.trim().to_string()),
        city: Set(fields.city.trim().to_string()),
        municipality: Set(fields.municipality.trim().to_string()),
        state: Set(fields.state.trim().to_string()),
        postal_code: Set(fields.postal_code.trim().to_string()),
        ..Default::default()
    };

    let address = address.insert(db).await?;
    info!("Saved address {} for user {}", address.id, user_id);
    Ok(address)
}

/// Lists a user's addresses in the order they were saved.
pub async fn list_addresses(db: &DatabaseConnection, user_id: i64) -> Result<Vec<address::Model>> {
    Address::find()
        .filter(address::Column::UserId.eq(user_id))
        .order_by_asc(address::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an address by ID.
pub async fn get_address_by_id(
    db: &DatabaseConnection,
    address_id: i64,
) -> Result<Option<address::Model>> {
    Address::find_by_id(address_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces the fields of one of the user's addresses.
///
/// An address owned by someone else is reported as not found.
pub async fn update_address(
    db: &DatabaseConnection,
    user_id: i64,
    address_id: i64,
    fields: AddressFields,
) -> Result<address::Model> {
    fields.validate()?;
    let existing = get_address_by_id(db, address_id)
        .await?
        .filter(|a| a.user_id == user_id)
        .ok_or(Error::AddressNotFound { id: address_id })?;

    let mut address: address::ActiveModel = existing.into();
    address.phone = Set(fields.phone.trim().to_string());
    address.street = Set(fields.street.trim().to_string());
    address.city = Set(fields.city.trim().to_string());
    address.municipality = Set(fields.municipality.trim().to_string());
    address.state = Set(fields.state.trim().to_string());
    address.postal_code = Set(fields.postal_code.trim().to_string());
    address.update(db).await.map_err(Into::into)
}
