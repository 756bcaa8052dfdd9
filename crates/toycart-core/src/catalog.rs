//! Catalog lookup abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::identity::{CallerIdentity, ItemId};

/// Existence status reported for a catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogStatus {
    /// The item exists.
    Ok,
    /// The catalog has no such item.
    NotFound,
    /// The lookup could not be completed.
    InternalError,
}

/// Catalog payload for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// The catalog identifier.
    pub item_id: ItemId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Whether the item can currently be ordered.
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Outcome of a catalog lookup. Faults are folded into `status` rather than
/// returned as errors, so a lookup always yields a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLookup {
    /// Existence status.
    pub status: CatalogStatus,
    /// Diagnostic message.
    pub message: String,
    /// Item payload when found.
    pub item: Option<CatalogItem>,
}

impl CatalogLookup {
    /// The item was found.
    #[must_use]
    pub fn found(item: CatalogItem) -> Self {
        Self {
            status: CatalogStatus::Ok,
            message: String::new(),
            item: Some(item),
        }
    }

    /// The catalog reported the item as unknown.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: CatalogStatus::NotFound,
            message: message.into(),
            item: None,
        }
    }

    /// The lookup failed or was refused before reaching the catalog.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status: CatalogStatus::InternalError,
            message: message.into(),
            item: None,
        }
    }

    /// Returns `true` if the item exists and is available to order.
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.status == CatalogStatus::Ok && self.item.as_ref().is_none_or(|item| item.available)
    }
}

/// Answers whether an item exists and is orderable.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Looks up `item_id`, forwarding the caller's bearer credential. A caller
    /// without a credential yields an `InternalError` lookup without any
    /// remote call.
    async fn get_item(&self, caller: &CallerIdentity, item_id: ItemId) -> CatalogLookup;
}
