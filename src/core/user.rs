//! User business logic - Registration and account administration.
//!
//! Credentials and sessions are handled outside this crate; a user here is the profile
//! that orders, carts and addresses hang off.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use std::fmt;
use tracing::{info, instrument};

/// Role given to every self-registered account.
pub const CUSTOMER_ROLE: &str = "customer";

/// Role of back-office accounts.
pub const ADMIN_ROLE: &str = "admin";

/// Whether an account may use the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Normal account
    Active,
    /// Blocked by an admin
    Suspended,
}

impl UserStatus {
    /// The value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile fields supplied at registration and on profile edits.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Given name
    pub first_name: String,
    /// Family name(s)
    pub last_name: String,
    /// Login email
    pub email: String,
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(Error::Config {
            message: format!("Invalid email address: '{email}'"),
        });
    }
    Ok(email)
}

fn validate_names(fields: &NewUser) -> Result<()> {
    if fields.first_name.trim().is_empty() || fields.last_name.trim().is_empty() {
        return Err(Error::Config {
            message: "First and last name cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Registers a new customer account.
///
/// Emails are compared case-insensitively.
///
/// # Errors
/// Returns `Error::Config` for a blank name or malformed email, `Error::DuplicateEmail`
/// if the email is taken, or `Error::Database`.
#[instrument(skip(db, fields))]
pub async fn register_user(db: &DatabaseConnection, fields: NewUser) -> Result<user::Model> {
    validate_names(&fields)?;
    let email = normalize_email(&fields.email)?;

    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::DuplicateEmail { email });
    }

    let user = user::ActiveModel {
        first_name: Set(fields.first_name.trim().to_string()),
        last_name: Set(fields.last_name.trim().to_string()),
        email: Set(email),
        status: Set(UserStatus::Active.as_str().to_string()),
        role: Set(CUSTOMER_ROLE.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let user = user.insert(db).await?;
    info!("Registered user {} ({})", user.id, user.email);
    Ok(user)
}

/// Finds a user by ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by email, ignoring case.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every user, oldest account first.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists users with the given status.
pub async fn list_users_by_status(
    db: &DatabaseConnection,
    status: UserStatus,
) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Status.eq(status.as_str()))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Searches users whose first or last name contains `term`, or whose ID equals it.
pub async fn search_users(db: &DatabaseConnection, term: &str) -> Result<Vec<user::Model>> {
    let term = term.trim();
    if term.is_empty() {
        return list_users(db).await;
    }

    let mut condition = Condition::any()
        .add(user::Column::FirstName.contains(term))
        .add(user::Column::LastName.contains(term));
    if let Ok(id) = term.parse::<i64>() {
        condition = condition.add(user::Column::Id.eq(id));
    }

    User::find()
        .filter(condition)
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn require_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })
}

/// Replaces a user's profile fields.
///
/// # Errors
/// Returns `Error::UserNotFound`, `Error::Config` for invalid fields,
/// `Error::DuplicateEmail` if the new email belongs to someone else, or `Error::Database`.
#[instrument(skip(db, fields))]
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    fields: NewUser,
) -> Result<user::Model> {
    validate_names(&fields)?;
    let email = normalize_email(&fields.email)?;
    let existing = require_user(db, user_id).await?;

    let taken = get_user_by_email(db, &email)
        .await?
        .is_some_and(|owner| owner.id != user_id);
    if taken {
        return Err(Error::DuplicateEmail { email });
    }

    let mut user: user::ActiveModel = existing.into();
    user.first_name = Set(fields.first_name.trim().to_string());
    user.last_name = Set(fields.last_name.trim().to_string());
    user.email = Set(email);
    user.update(db).await.map_err(Into::into)
}

/// Suspends or reactivates an account.
#[instrument(skip(db))]
pub async fn set_user_status(
    db: &DatabaseConnection,
    user_id: i64,
    status: UserStatus,
) -> Result<user::Model> {
    let existing = require_user(db, user_id).await?;
    let mut user: user::ActiveModel = existing.into();
    user.status = Set(status.as_str().to_string());
    let user = user.update(db).await?;
    info!("User {} is now {}", user.id, user.status);
    Ok(user)
}

/// Deletes an account. Returns whether a row was removed.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<bool> {
    let result = User::delete_by_id(user_id).exec(db).await?;
    if result.rows_affected > 0 {
        info!("Deleted user {}", user_id);
    }
    Ok(result.rows_affected > 0)
}
