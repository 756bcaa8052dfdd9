//! Stub `EntitlementClient` and `CatalogClient`
//! implementations for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use toycart_core::catalog::{CatalogClient, CatalogItem, CatalogLookup, CatalogStatus};
use toycart_core::entitlement::{EntitlementClient, SubscriptionState};
use toycart_core::error::CartError;
use toycart_core::identity::{CallerIdentity, ItemId};

use crate::call_log::CallLog;

/// An entitlement client answering every call with a configured state, or
/// failing if built with `failing`. Counts calls.
#[derive(Debug)]
pub struct StubEntitlementClient {
    answer: Option<SubscriptionState>,
    calls: AtomicUsize,
    log: Option<CallLog>,
}

impl StubEntitlementClient {
    /// Answers `state` on every call.
    #[must_use]
    pub fn with_state(state: SubscriptionState) -> Self {
        Self {
            answer: Some(state),
            calls: AtomicUsize::new(0),
            log: None,
        }
    }

    /// Answers `Subscribed`.
    #[must_use]
    pub fn subscribed() -> Self {
        Self::with_state(SubscriptionState::Subscribed)
    }

    /// Answers `NotSubscribed`.
    #[must_use]
    pub fn not_subscribed() -> Self {
        Self::with_state(SubscriptionState::NotSubscribed)
    }

    /// Fails every call with a downstream error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
            log: None,
        }
    }

    /// Records each call as `entitlement.check_subscription` in `log`.
    #[must_use]
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntitlementClient for StubEntitlementClient {
    async fn check_subscription(
        &self,
        _caller: &CallerIdentity,
    ) -> Result<SubscriptionState, CartError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.record("entitlement.check_subscription");
        }
        self.answer
            .ok_or_else(|| CartError::Downstream("entitlement service unavailable".into()))
    }
}

#[derive(Debug, Clone, Copy)]
enum CatalogAnswer {
    Available,
    Unavailable,
    NotFound,
    InternalError,
}

/// A catalog client answering every lookup the same way. Like the real
/// client, it refuses callers without a credential. Counts calls and records
/// the credential each call carried.
#[derive(Debug)]
pub struct StubCatalogClient {
    answer: CatalogAnswer,
    calls: AtomicUsize,
    credentials: Mutex<Vec<Option<String>>>,
    log: Option<CallLog>,
}

impl StubCatalogClient {
    fn answering(answer: CatalogAnswer) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            credentials: Mutex::new(Vec::new()),
            log: None,
        }
    }

    /// Every item exists and is available.
    #[must_use]
    pub fn available() -> Self {
        Self::answering(CatalogAnswer::Available)
    }

    /// Every item exists but cannot be ordered.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::answering(CatalogAnswer::Unavailable)
    }

    /// No item exists.
    #[must_use]
    pub fn not_found() -> Self {
        Self::answering(CatalogAnswer::NotFound)
    }

    /// Every lookup fails.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::answering(CatalogAnswer::InternalError)
    }

    /// Records each call as `catalog.get_item` in `log`.
    #[must_use]
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The credential carried by each call, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn forwarded_credentials(&self) -> Vec<Option<String>> {
        self.credentials.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for StubCatalogClient {
    async fn get_item(&self, caller: &CallerIdentity, item_id: ItemId) -> CatalogLookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.record("catalog.get_item");
        }
        self.credentials
            .lock()
            .unwrap()
            .push(caller.credential.as_ref().map(|c| c.expose().to_owned()));

        if caller.credential.is_none() {
            return CatalogLookup::internal_error("missing authorization credential");
        }

        let item = |available| CatalogItem {
            item_id,
            title: format!("toy {item_id}"),
            available,
        };
        match self.answer {
            CatalogAnswer::Available => CatalogLookup::found(item(true)),
            CatalogAnswer::Unavailable => CatalogLookup::found(item(false)),
            CatalogAnswer::NotFound => CatalogLookup::not_found("toy not found"),
            CatalogAnswer::InternalError => CatalogLookup {
                status: CatalogStatus::InternalError,
                message: "catalog unreachable".into(),
                item: None,
            },
        }
    }
}
