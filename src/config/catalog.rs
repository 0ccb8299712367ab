//! Catalog seed configuration loaded from `config.toml`.
//!
//! The categories and products listed here are created on startup when missing, so a
//! fresh database comes up with a browsable catalog.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Categories to ensure exist
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Products to ensure exist
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// A single catalog category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Category name, unique
    pub name: String,
}

/// A single seeded product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Product name
    pub name: String,
    /// Name of the category the product is listed under
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Initial stock level
    #[serde(default)]
    pub stock: i32,
    /// Optional marketing description
    #[serde(default)]
    pub description: Option<String>,
    /// Optional main image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Optional seller or brand
    #[serde(default)]
    pub seller: Option<String>,
}

/// Loads catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}
