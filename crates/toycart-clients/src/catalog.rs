//! HTTP client for the catalog (toy) service.
//!
//! Every lookup forwards the caller's `Authorization` header unchanged. A
//! caller without one is refused locally, so no unauthenticated request ever
//! reaches the catalog. Not-found, conflict and timeout responses are retried
//! within the configured budget, each attempt under its own timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, error, warn};

use toycart_core::catalog::{CatalogClient, CatalogItem, CatalogLookup};
use toycart_core::identity::{BearerCredential, CallerIdentity, ItemId};

use crate::error::ClientError;
use crate::retry::{RetryConfig, retry_on_transient};

const SERVICE: &str = "catalog";

/// Message reported when the catalog does not know the item.
pub const ITEM_NOT_FOUND: &str = "toy not found";

/// Catalog client backed by `GET {base}/api/v1/toys/{item_id}`.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
    attempt_timeout: Duration,
    retry: RetryConfig,
}

impl HttpCatalogClient {
    /// Creates a client making at most `max_attempts` attempts per lookup,
    /// each bounded by `attempt_timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidBaseUrl` if `base_url` is not an http(s)
    /// URL, or `ClientError::Build` if the HTTP client fails to build.
    pub fn new(
        base_url: impl Into<String>,
        attempt_timeout: Duration,
        max_attempts: u32,
    ) -> Result<Self, ClientError> {
        let base_url = crate::normalize_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url,
            attempt_timeout,
            retry: RetryConfig::with_max_attempts(max_attempts),
        })
    }

    /// Replaces the backoff policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_once(
        &self,
        credential: &BearerCredential,
        item_id: ItemId,
    ) -> Result<CatalogItem, ClientError> {
        let url = format!("{}/api/v1/toys/{item_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, credential.expose())
            .timeout(self.attempt_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| ClientError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get_item(&self, caller: &CallerIdentity, item_id: ItemId) -> CatalogLookup {
        let Some(credential) = caller.credential.as_ref() else {
            warn!(user_id = %caller.user_id, %item_id, "catalog lookup refused without credential");
            return CatalogLookup::internal_error(ClientError::MissingCredential.to_string());
        };

        let outcome = retry_on_transient(&self.retry, move |attempt| {
            debug!(%item_id, attempt, "catalog lookup");
            self.fetch_once(credential, item_id)
        })
        .await
        .into_result();

        match outcome {
            Ok(item) => CatalogLookup::found(item),
            Err(err) if err.status_code() == Some(404) => CatalogLookup::not_found(ITEM_NOT_FOUND),
            Err(err) => {
                error!(user_id = %caller.user_id, %item_id, error = %err, "catalog lookup failed");
                CatalogLookup::internal_error(err.to_string())
            }
        }
    }
}
