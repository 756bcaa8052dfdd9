//! Caller identity and identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// Verified numeric identity of the calling user. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Creates a `UserId`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if `value` is zero or negative.
    pub fn new(value: i64) -> Result<Self, CartError> {
        if value <= 0 {
            return Err(CartError::Validation(format!(
                "user id must be positive, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = CartError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque catalog identifier of an item. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ItemId(i64);

impl ItemId {
    /// Creates an `ItemId`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if `value` is zero.
    pub fn new(value: i64) -> Result<Self, CartError> {
        if value == 0 {
            return Err(CartError::Validation("item id must be provided".into()));
        }
        Ok(Self(value))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ItemId {
    type Error = CartError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for i64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The inbound `Authorization` header value, forwarded verbatim to the
/// catalog service.
///
/// Implements `Debug` manually so the token never reaches log output.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl BearerCredential {
    /// Wraps a raw `Authorization` header value (e.g. `Bearer abc.def.ghi`).
    #[must_use]
    pub fn new(header_value: impl Into<String>) -> Self {
        Self(header_value.into())
    }

    /// Returns the header value for forwarding.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential([REDACTED])")
    }
}

/// Identity attached to a call by the transport after verifying the inbound
/// credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The verified user.
    pub user_id: UserId,
    /// The credential the caller authenticated with, if any.
    pub credential: Option<BearerCredential>,
}

impl CallerIdentity {
    /// Identity carrying the credential it was verified from.
    #[must_use]
    pub fn new(user_id: UserId, credential: BearerCredential) -> Self {
        Self {
            user_id,
            credential: Some(credential),
        }
    }

    /// Identity with no forwardable credential.
    #[must_use]
    pub fn without_credential(user_id: UserId) -> Self {
        Self {
            user_id,
            credential: None,
        }
    }
}
