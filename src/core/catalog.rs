//! Catalog business logic - Categories and products.
//!
//! Provides product CRUD for the back office and the read paths the storefront uses:
//! by id, by category, by name search, and related products. Deleting a product only
//! hides it, because order history keeps pointing at it.

use crate::{
    config::catalog::CatalogConfig,
    entities::{Category, Product, category, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Fields needed to create or fully update a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductFields {
    /// Product name
    pub name: String,
    /// Optional marketing description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price, non-negative
    pub price: f64,
    /// Units in stock, non-negative
    pub stock_quantity: i32,
    /// Optional main image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Category the product is listed under
    pub category_id: i64,
    /// Optional seller or brand
    #[serde(default)]
    pub seller: Option<String>,
}

/// Counts of rows created by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Categories that did not exist before
    pub categories_created: usize,
    /// Products that did not exist before
    pub products_created: usize,
}

fn validate_fields(fields: &ProductFields) -> Result<()> {
    if fields.name.trim().is_empty() {
        return Err(Error::Config {
            message: "Product name cannot be empty".to_string(),
        });
    }

    if !fields.price.is_finite() || fields.price < 0.0 {
        return Err(Error::InvalidAmount {
            amount: fields.price,
        });
    }

    if fields.stock_quantity < 0 {
        return Err(Error::InvalidQuantity {
            quantity: fields.stock_quantity,
        });
    }

    Ok(())
}

async fn ensure_category_exists(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    Category::find_by_id(category_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::CategoryNotFound {
            name: category_id.to_string(),
        })
}

/// Lists all categories, ordered alphabetically.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its exact name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the category with this name, creating it if needed.
pub async fn get_or_create_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<category::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Category name cannot be empty".to_string(),
        });
    }

    if let Some(existing) = get_category_by_name(db, name).await? {
        return Ok(existing);
    }

    let category = category::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    };
    category.insert(db).await.map_err(Into::into)
}

/// Creates a new product after validating its fields.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative or not finite
/// - The stock quantity is negative
/// - The category does not exist
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    fields: ProductFields,
) -> Result<product::Model> {
    validate_fields(&fields)?;
    ensure_category_exists(db, fields.category_id).await?;

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        name: Set(fields.name.trim().to_string()),
        description: Set(fields.description),
        price: Set(fields.price),
        stock_quantity: Set(fields.stock_quantity),
        image_url: Set(fields.image_url),
        category_id: Set(fields.category_id),
        seller: Set(fields.seller),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Replaces every editable field of an existing product.
///
/// # Errors
/// Returns an error if validation fails, the category does not exist, or the product
/// does not exist or was deleted.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    fields: ProductFields,
) -> Result<product::Model> {
    validate_fields(&fields)?;
    ensure_category_exists(db, fields.category_id).await?;

    let existing = get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let mut product: product::ActiveModel = existing.into();
    product.name = Set(fields.name.trim().to_string());
    product.description = Set(fields.description);
    product.price = Set(fields.price);
    product.stock_quantity = Set(fields.stock_quantity);
    product.image_url = Set(fields.image_url);
    product.category_id = Set(fields.category_id);
    product.seller = Set(fields.seller);
    product.updated_at = Set(chrono::Utc::now());
    product.update(db).await.map_err(Into::into)
}

/// Hides a product from the catalog.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let existing = get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let mut product: product::ActiveModel = existing.into();
    product.is_deleted = Set(true);
    product.updated_at = Set(chrono::Utc::now());
    let deleted = product.update(db).await?;
    info!("Deleted product {} ('{}')", deleted.id, deleted.name);
    Ok(deleted)
}

/// Finds an active product by ID.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .filter(product::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the active products of the named category, alphabetically.
pub async fn get_products_by_category(
    db: &DatabaseConnection,
    category_name: &str,
) -> Result<Vec<product::Model>> {
    let category = get_category_by_name(db, category_name)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: category_name.to_string(),
        })?;

    Product::find()
        .filter(product::Column::CategoryId.eq(category.id))
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds active products whose name contains `term`.
pub async fn search_products(db: &DatabaseConnection, term: &str) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::Name.contains(term.trim()))
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists other products from the same category, for "you may also like" panels.
pub async fn get_related_products(
    db: &DatabaseConnection,
    category_id: i64,
    exclude_product_id: i64,
    limit: u64,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::CategoryId.eq(category_id))
        .filter(product::Column::Id.ne(exclude_product_id))
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_desc(product::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the newest active products together with their category.
pub async fn get_latest_products(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<(product::Model, Option<category::Model>)>> {
    Product::find()
        .filter(product::Column::IsDeleted.eq(false))
        .find_also_related(Category)
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates the categories and products listed in the catalog config that are missing.
///
/// Products are matched by name; existing products are left untouched so restarts never
/// reset stock levels.
#[instrument(skip(db, config))]
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for category_config in &config.categories {
        if get_category_by_name(db, category_config.name.trim())
            .await?
            .is_none()
        {
            get_or_create_category(db, &category_config.name).await?;
            summary.categories_created += 1;
        }
    }

    for product_config in &config.products {
        let exists = Product::find()
            .filter(product::Column::Name.eq(product_config.name.trim()))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        if get_category_by_name(db, product_config.category.trim())
            .await?
            .is_none()
        {
            summary.categories_created += 1;
        }
        let category = get_or_create_category(db, &product_config.category).await?;
        create_product(
            db,
            ProductFields {
                name: product_config.name.clone(),
                description: product_config.description.clone(),
                price: product_config.price,
                stock_quantity: product_config.stock,
                image_url: product_config.image_url.clone(),
                category_id: category.id,
                seller: product_config.seller.clone(),
            },
        )
        .await?;
        summary.products_created += 1;
    }

    info!(
        "Catalog seeded: {} categories and {} products created",
        summary.categories_created, summary.products_created
    );
    Ok(summary)
}
