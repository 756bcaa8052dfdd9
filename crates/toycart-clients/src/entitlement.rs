//! HTTP client for the entitlement (subscription) service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{debug, error};

use toycart_core::entitlement::{EntitlementClient, SubscriptionState};
use toycart_core::error::CartError;
use toycart_core::identity::CallerIdentity;

use crate::error::ClientError;

const SERVICE: &str = "entitlement";

/// Message reported when the subscription check cannot be completed.
pub const SUBSCRIPTION_CHECK_FAILED: &str = "failed to check subscription";

#[derive(Debug, Deserialize)]
struct SubscriptionResponse {
    status: SubscriptionState,
}

/// Entitlement client backed by `GET {base}/api/v1/subscriptions/{user_id}`.
#[derive(Debug, Clone)]
pub struct HttpEntitlementClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEntitlementClient {
    /// Creates a client whose every call is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidBaseUrl` if `base_url` is not an http(s)
    /// URL, or `ClientError::Build` if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = crate::normalize_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url,
        })
    }

    async fn fetch(&self, caller: &CallerIdentity) -> Result<SubscriptionState, ClientError> {
        let url = format!("{}/api/v1/subscriptions/{}", self.base_url, caller.user_id);

        let mut request = self.client.get(&url);
        if let Some(credential) = &caller.credential {
            request = request.header(AUTHORIZATION, credential.expose());
        }
        let response = request.send().await?;

        let status = response.status();
        // No record on file is a plain "not subscribed".
        if status == StatusCode::NOT_FOUND {
            return Ok(SubscriptionState::NotSubscribed);
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body: SubscriptionResponse =
            response.json().await.map_err(|e| ClientError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(body.status)
    }
}

#[async_trait]
impl EntitlementClient for HttpEntitlementClient {
    async fn check_subscription(
        &self,
        caller: &CallerIdentity,
    ) -> Result<SubscriptionState, CartError> {
        match self.fetch(caller).await {
            Ok(state) => {
                debug!(user_id = %caller.user_id, ?state, "subscription checked");
                Ok(state)
            }
            Err(err) => {
                error!(user_id = %caller.user_id, error = %err, "{SUBSCRIPTION_CHECK_FAILED}");
                Err(CartError::Downstream(SUBSCRIPTION_CHECK_FAILED.to_owned()))
            }
        }
    }
}
