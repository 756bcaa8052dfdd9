//! Toycart API server entry point.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use toycart_api::auth::TokenVerifier;
use toycart_api::config::AppConfig;
use toycart_api::error::AppError;
use toycart_api::state::AppState;
use toycart_api::telemetry::Telemetry;
use toycart_api::{build_router, shutdown};
use toycart_clients::{HttpCatalogClient, HttpEntitlementClient};
use toycart_store::{MIGRATOR, PgCartStore};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = Telemetry::init(&config.telemetry)?;

    let result = run(config).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "server exited with error");
    }

    telemetry.shutdown();
    result
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Toycart API server");

    // Fails fast if the database is unreachable within the acquire timeout.
    let pool = toycart_store::connect(config.database_url.expose_secret(), &config.pool).await?;
    MIGRATOR.run(&pool).await?;

    let addr = config.socket_addr();
    let store = PgCartStore::new(pool).with_operation_timeout(config.store_operation_timeout);
    let entitlements =
        HttpEntitlementClient::new(config.entitlement.base_url, config.entitlement.timeout)?;
    let catalog = HttpCatalogClient::new(
        config.catalog.base_url,
        config.catalog.attempt_timeout,
        config.catalog.max_retries,
    )?;
    let tokens = TokenVerifier::new(config.token_secret);

    let app_state = AppState::new(
        Arc::new(store),
        Arc::new(entitlements),
        Arc::new(catalog),
        Arc::new(tokens),
    );

    // TODO: Replace CorsLayer::permissive() with the storefront origins once they are fixed.
    let app = build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::graceful())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
