//! Shared application state.

use std::fmt;
use std::sync::Arc;

use axum::extract::FromRef;
use toycart_core::catalog::CatalogClient;
use toycart_core::entitlement::EntitlementClient;
use toycart_core::store::CartStore;

use crate::auth::TokenVerifier;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cart persistence.
    pub store: Arc<dyn CartStore>,
    /// Subscription checks.
    pub entitlements: Arc<dyn EntitlementClient>,
    /// Item lookups.
    pub catalog: Arc<dyn CatalogClient>,
    /// Bearer token verification.
    pub tokens: Arc<TokenVerifier>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn CartStore>,
        entitlements: Arc<dyn EntitlementClient>,
        catalog: Arc<dyn CatalogClient>,
        tokens: Arc<TokenVerifier>,
    ) -> Self {
        Self {
            store,
            entitlements,
            catalog,
            tokens,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.tokens)
    }
}
