use dotenvy::dotenv;
use std::{path::Path, sync::Arc};
use storefront::{
    api::{self, AppState},
    config::{catalog, database, server},
    core::catalog::seed_catalog,
    errors::Result,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed the catalog when a seed file is present
    let catalog_path = server::get_catalog_path();
    if Path::new(&catalog_path).exists() {
        let config = catalog::load_config(&catalog_path)
            .inspect_err(|e| error!("Failed to load catalog config: {}", e))?;
        seed_catalog(&db, &config)
            .await
            .inspect(|summary| {
                info!(
                    "Catalog seeded: {} categories and {} products created.",
                    summary.categories_created, summary.products_created
                );
            })
            .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    } else {
        warn!("Catalog file {} not found, skipping seeding.", catalog_path);
    }

    // 5. Serve the API
    let state = AppState::new(Arc::new(db), server::get_payment_method());
    let bind_address = server::get_bind_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_address, e))?;
    info!("Storefront listening on {}", bind_address);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Storefront stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
