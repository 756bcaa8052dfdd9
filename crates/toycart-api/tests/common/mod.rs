//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use secrecy::SecretString;
use sqlx::PgPool;
use toycart_core::catalog::CatalogClient;
use toycart_core::entitlement::EntitlementClient;
use toycart_store::PgCartStore;
use toycart_test_support::{FixedClock, StubCatalogClient, StubEntitlementClient};
use tower::ServiceExt;

use toycart_api::auth::{TokenClaims, TokenVerifier};
use toycart_api::build_router;
use toycart_api::state::AppState;

const TOKEN_SECRET: &str = "it-Xb9!qM2wZ7rK4pL8vN1cT6yH3dF0sJ5";

/// Verifier pinned to the fixed test instant.
fn verifier() -> TokenVerifier {
    TokenVerifier::with_clock(
        SecretString::from(TOKEN_SECRET),
        Arc::new(FixedClock::default_instant()),
    )
}

/// Build the full app router over a real `PgCartStore` with a subscribed
/// caller and an always-available catalog.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(
        pool,
        StubEntitlementClient::subscribed(),
        StubCatalogClient::available(),
    )
}

/// Build the full app router with the given downstream doubles.
pub fn build_test_app_with(
    pool: PgPool,
    entitlements: impl EntitlementClient + 'static,
    catalog: impl CatalogClient + 'static,
) -> Router {
    let app_state = AppState::new(
        Arc::new(PgCartStore::new(pool)),
        Arc::new(entitlements),
        Arc::new(catalog),
        Arc::new(verifier()),
    );

    build_router(app_state)
}

/// `Authorization` value for `uid`, valid for an hour past the test instant.
pub fn bearer(uid: i64) -> String {
    let exp = FixedClock::default_instant().0.timestamp() + 3600;
    let token = verifier().issue(&TokenClaims { uid, exp }).unwrap();
    format!("Bearer {token}")
}

/// `Authorization` value for `uid` that expired a minute before the test
/// instant.
pub fn expired_bearer(uid: i64) -> String {
    let exp = FixedClock::default_instant().0.timestamp() - 60;
    let token = verifier().issue(&TokenClaims { uid, exp }).unwrap();
    format!("Bearer {token}")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn request(method: &str, uri: &str, auth: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match auth {
        Some(auth) => builder.header("authorization", auth),
        None => builder,
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    auth: Option<&str>,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = request("POST", uri, auth)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(
    app: Router,
    uri: &str,
    auth: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let request = request("GET", uri, auth).body(Body::empty()).unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the response.
pub async fn delete_json(
    app: Router,
    uri: &str,
    auth: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let request = request("DELETE", uri, auth).body(Body::empty()).unwrap();

    send(app, request).await
}
