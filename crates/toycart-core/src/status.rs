//! Operation status reported back to callers.

use serde::Serialize;

use crate::error::CartError;

/// Result code of a cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// The operation succeeded.
    Ok,
    /// The caller is unauthenticated or not entitled.
    InvalidUser,
    /// A downstream, catalog, or storage failure.
    InternalError,
}

/// Exactly one status plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    /// The result code.
    pub status: OperationStatus,
    /// The message shown to the caller.
    pub message: String,
}

impl OperationOutcome {
    /// A successful outcome.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Ok,
            message: message.into(),
        }
    }

    /// Returns `true` if the status is `Ok`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == OperationStatus::Ok
    }
}

impl From<CartError> for OperationOutcome {
    fn from(err: CartError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}
