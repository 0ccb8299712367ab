//! HTTP layer - JSON API over the core operations.
//!
//! Handlers are thin: they extract the caller and parameters, call into [`crate::core`]
//! and map [`crate::errors::Error`] to status codes through [`error::ApiError`].

/// Error responses
pub mod error;
/// Caller identity extractors
pub mod extract;
/// Route handlers
pub mod handlers;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use handlers::{accounts, admin, cart, catalog, checkout, orders};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state available to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all store operations, shared across requests
    pub database: Arc<DatabaseConnection>,
    /// Payment method label stored on new orders
    pub payment_method: String,
}

impl AppState {
    /// Creates the state from a connection and the configured payment method.
    #[must_use]
    pub const fn new(database: Arc<DatabaseConnection>, payment_method: String) -> Self {
        Self {
            database,
            payment_method,
        }
    }
}

/// Builds the application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/products", get(catalog::latest_products))
        .route("/api/products/search", get(catalog::search_products))
        .route("/api/products/:id", get(catalog::show_product))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/categories/:name/products", get(catalog::category_products))
        .route("/api/cart", get(cart::show).delete(cart::clear))
        .route("/api/cart/items", post(cart::add_item))
        .route("/api/cart/items/:product_id", delete(cart::remove_item))
        .route("/api/cart/count", get(cart::count))
        .route("/api/checkout", post(checkout::checkout))
        .route("/api/orders", get(orders::list))
        .route("/api/orders/:id", get(orders::show))
        .route("/api/orders/:id/cancel", post(orders::cancel))
        .route("/api/orders/:id/refund", get(orders::refund))
        .route("/api/orders/:id/reorder", get(orders::reorder))
        .route("/api/tracking", get(orders::tracking))
        .route("/api/users", post(accounts::register))
        .route("/api/me", get(accounts::me).put(accounts::update_profile))
        .route(
            "/api/addresses",
            get(accounts::list_addresses).post(accounts::add_address),
        )
        .route("/api/addresses/:id", put(accounts::update_address))
        .route("/api/admin/users", get(admin::list_users))
        .route(
            "/api/admin/users/:id",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/api/admin/users/:id/status", post(admin::set_user_status))
        .route("/api/admin/orders/:id", put(admin::update_order))
        .route("/api/admin/products", post(admin::create_product))
        .route(
            "/api/admin/products/:id",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/api/admin/sales", get(admin::sales))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{cart as core_cart, catalog as core_catalog, user::ADMIN_ROLE};
    use crate::entities::user;
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use sea_orm::{ActiveModelTrait, Set};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(db: &Arc<DatabaseConnection>) -> Router {
        router(AppState::new(Arc::clone(db), "PayPal".to_string()))
    }

    fn request(method: &str, uri: &str, user_id: Option<i64>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = user_id {
            builder = builder.header(extract::USER_ID_HEADER, id.to_string());
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn make_admin(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
        let admin = create_test_user(db, email).await?;
        let mut active: user::ActiveModel = admin.into();
        active.role = Set(ADMIN_ROLE.to_string());
        Ok(active.update(db).await?)
    }

    #[tokio::test]
    async fn test_checkout_flow_clears_cart() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let db = Arc::new(db);
        let app = app(&db);

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/cart/items",
                Some(user.id),
                Some(json!({ "product_id": product.id, "quantity": 2 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, request("GET", "/api/cart/count", Some(user.id), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);

        let (status, body) = send(&app, request("POST", "/api/checkout", Some(user.id), None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["tracking_number"], "S01");
        assert_eq!(body["total"], 20.0);
        assert_eq!(body["payment_method"], "PayPal");

        assert!(core_cart::get_cart(&db, user.id).await?.is_empty());
        let stock = core_catalog::get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(stock.stock_quantity, 8);

        let (status, body) = send(&app, request("GET", "/api/orders", Some(user.id), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_cart() -> Result<()> {
        let db = Arc::new(setup_test_db().await?);
        let user = create_test_user(&db, "short@example.com").await?;
        let product = create_test_product(&db, "Straw Hat", 10.0, 5).await?;
        core_cart::add_to_cart(&db, user.id, product.id, 4).await?;
        let other = create_test_user(&db, "other@example.com").await?;
        place_test_order(&db, other.id, &[cart_line(&product, 3)]).await?;

        let app = app(&db);
        let (status, body) = send(&app, request("POST", "/api/checkout", Some(user.id), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("Straw Hat"));
        assert_eq!(core_cart::cart_count(&db, user.id).await?, 4);

        let (status, _) = send(&app, request("DELETE", "/api/cart", Some(user.id), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, request("POST", "/api/checkout", Some(user.id), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn test_identity_is_required() -> Result<()> {
        let (db, _user, _product) = setup_with_product().await?;
        let db = Arc::new(db);
        let app = app(&db);

        let (status, _) = send(&app, request("GET", "/api/cart", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, request("GET", "/api/cart", Some(999), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, request("GET", "/api/categories", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], TEST_CATEGORY);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_then_refund() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let db = Arc::new(db);
        let order = place_test_order(&db, user.id, &[cart_line(&product, 1)]).await?;
        let app = app(&db);
        let cancel_uri = format!("/api/orders/{}/cancel", order.id);
        let refund_uri = format!("/api/orders/{}/refund", order.id);

        let (status, _) = send(&app, request("GET", &refund_uri, Some(user.id), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, request("POST", &cancel_uri, Some(user.id), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "cancelled");

        let (status, _) = send(&app, request("POST", &cancel_uri, Some(user.id), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&app, request("GET", &refund_uri, Some(user.id), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["id"], order.id);

        let stranger = create_test_user(&db, "stranger@example.com").await?;
        let (status, _) = send(&app, request("POST", &cancel_uri, Some(stranger.id), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let db = Arc::new(db);
        let admin = make_admin(&db, "admin@example.com").await?;
        let order = place_test_order(&db, user.id, &[cart_line(&product, 2)]).await?;
        let app = app(&db);

        let (status, _) = send(&app, request("GET", "/api/admin/sales", Some(user.id), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            request("GET", "/api/admin/sales?period=all", Some(admin.id), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["units"], 2);
        assert_eq!(body["rows"][0]["tracking_number"], "S01");

        let (status, body) = send(
            &app,
            request(
                "PUT",
                &format!("/api/admin/orders/{}", order.id),
                Some(admin.id),
                Some(json!({ "status": "shipped", "tracking_number": "S01" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "shipped");

        let (status, body) = send(
            &app,
            request(
                "POST",
                &format!("/api/admin/users/{}/status", user.id),
                Some(admin.id),
                Some(json!({ "status": "suspended" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "suspended");

        let (status, _) = send(&app, request("GET", "/api/orders", Some(user.id), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        Ok(())
    }
}
