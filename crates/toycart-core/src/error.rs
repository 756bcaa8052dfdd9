//! Cart error taxonomy.

use thiserror::Error;

use crate::identity::ItemId;
use crate::status::OperationStatus;

/// Top-level error type for cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No verified identity was attached to the call.
    #[error("invalid user")]
    AuthenticationMissing,

    /// The caller does not hold an active subscription.
    #[error("user is not subscribed")]
    NotEntitled,

    /// The catalog does not report the item as existing and orderable.
    #[error("toy is not exist in database!")]
    ItemUnavailable(ItemId),

    /// A persistence failure. The message is reported to the caller as is.
    #[error("{0}")]
    Store(String),

    /// An entitlement or catalog call failed.
    #[error("{0}")]
    Downstream(String),

    /// A validation error on inbound data.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CartError {
    /// Maps the error onto the status reported to callers.
    #[must_use]
    pub fn status(&self) -> OperationStatus {
        match self {
            Self::AuthenticationMissing | Self::NotEntitled => OperationStatus::InvalidUser,
            Self::ItemUnavailable(_)
            | Self::Store(_)
            | Self::Downstream(_)
            | Self::Validation(_) => OperationStatus::InternalError,
        }
    }
}
