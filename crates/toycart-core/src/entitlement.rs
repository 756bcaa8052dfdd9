//! Entitlement (subscription) lookup abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::identity::CallerIdentity;

/// Subscription state reported by the entitlement service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionState {
    /// Active subscription; cart operations are allowed.
    Subscribed,
    /// No subscription on record.
    NotSubscribed,
    /// A subscription that has lapsed.
    Expired,
    /// Any state this service does not recognise.
    #[serde(other)]
    Unknown,
}

impl SubscriptionState {
    /// Returns `true` only for `Subscribed`.
    #[must_use]
    pub fn is_subscribed(self) -> bool {
        self == Self::Subscribed
    }
}

/// Answers whether a caller holds an active subscription.
#[async_trait]
pub trait EntitlementClient: Send + Sync {
    /// Looks up the caller's subscription state in a single round trip.
    async fn check_subscription(
        &self,
        caller: &CallerIdentity,
    ) -> Result<SubscriptionState, CartError>;
}
