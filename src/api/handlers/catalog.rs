//! Catalog handlers - public product and category reads.

use crate::{
    api::{AppState, error::{ApiError, ApiResult}},
    core::catalog,
    entities::{category, product},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

const LATEST_PRODUCTS_LIMIT: u64 = 12;
const RELATED_PRODUCTS_LIMIT: u64 = 4;

/// Query string of the product search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Name fragment to look for
    #[serde(default)]
    pub q: String,
}

/// A product page: the product and a few others from its category.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    /// The requested product
    pub product: product::Model,
    /// Other products of the same category
    pub related: Vec<product::Model>,
}

/// A product in the "new arrivals" listing.
#[derive(Debug, Serialize)]
pub struct LatestProduct {
    /// The product
    #[serde(flatten)]
    pub product: product::Model,
    /// Name of its category
    pub category: Option<String>,
}

/// `GET /api/products`
pub async fn latest_products(State(state): State<AppState>) -> ApiResult<Json<Vec<LatestProduct>>> {
    let rows = catalog::get_latest_products(&state.database, LATEST_PRODUCTS_LIMIT).await?;
    Ok(Json(
        rows.into_iter()
            .map(|(product, category)| LatestProduct {
                product,
                category: category.map(|c| c.name),
            })
            .collect(),
    ))
}

/// `GET /api/products/:id`
pub async fn show_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<ProductPage>> {
    let product = catalog::get_product_by_id(&state.database, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {product_id}")))?;
    let related = catalog::get_related_products(
        &state.database,
        product.category_id,
        product.id,
        RELATED_PRODUCTS_LIMIT,
    )
    .await?;
    Ok(Json(ProductPage { product, related }))
}

/// `GET /api/products/search?q=`
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<product::Model>>> {
    Ok(Json(catalog::search_products(&state.database, &params.q).await?))
}

/// `GET /api/categories`
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<category::Model>>> {
    Ok(Json(catalog::list_categories(&state.database).await?))
}

/// `GET /api/categories/:name/products`
pub async fn category_products(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<product::Model>>> {
    Ok(Json(
        catalog::get_products_by_category(&state.database, &name).await?,
    ))
}
