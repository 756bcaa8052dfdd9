//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use toycart_clients::ClientError;
use toycart_core::error::CartError;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging or trace export could not be initialised.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A downstream HTTP client could not be built.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `CartError` that implements `IntoResponse`.
///
/// Cart operations report their outcome in a 200 body; this type covers
/// requests rejected before orchestration runs.
#[derive(Debug)]
pub struct ApiError(pub CartError);

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Only validation failures reach this type from the routes. The
        // other variants travel as an `OperationOutcome` in a 200 body.
        let (status, error_code) = match &self.0 {
            CartError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
            CartError::AuthenticationMissing => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            CartError::NotEntitled => (StatusCode::FORBIDDEN, "permission_denied"),
            CartError::ItemUnavailable(_) => (StatusCode::NOT_FOUND, "not_found"),
            CartError::Store(_) | CartError::Downstream(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
