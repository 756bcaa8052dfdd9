//! Cart line items and the aggregate read model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::identity::ItemId;

/// Number of units of an item. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// Creates a `Quantity`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if `value` is zero or negative.
    pub fn new(value: i32) -> Result<Self, CartError> {
        if value <= 0 {
            return Err(CartError::Validation("quantity must be provided".into()));
        }
        Ok(Self(value))
    }

    /// Returns the raw count.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Quantity {
    type Error = CartError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line in a user's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The catalog item.
    pub item_id: ItemId,
    /// Accumulated quantity across all additions.
    pub quantity: Quantity,
}

/// A cart listing with its derived totals. Computed on every read, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartAggregate {
    /// Line items, ordered by item id.
    pub items: Vec<CartItem>,
    /// Number of distinct items.
    pub total_items: i64,
    /// Sum of all quantities.
    pub total_quantity: i64,
}

impl CartAggregate {
    /// An empty cart with zero totals.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds an aggregate whose totals are derived from `items`.
    #[must_use]
    pub fn from_items(mut items: Vec<CartItem>) -> Self {
        items.sort_by_key(|item| item.item_id);
        let total_items = i64::try_from(items.len()).unwrap_or(i64::MAX);
        let total_quantity = items
            .iter()
            .map(|item| i64::from(item.quantity.get()))
            .sum();
        Self {
            items,
            total_items,
            total_quantity,
        }
    }

    /// Returns `true` when the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of listing a cart.
///
/// `Unavailable` is the store-failure sentinel. It reads as an empty cart but
/// is never equal to a cart that is genuinely empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartListing {
    /// The cart as read (possibly empty).
    Cart(CartAggregate),
    /// The store failed to produce a listing.
    Unavailable,
}

impl CartListing {
    /// Items to report; empty for `Unavailable`.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        match self {
            Self::Cart(aggregate) => &aggregate.items,
            Self::Unavailable => &[],
        }
    }

    /// Distinct item count; zero for `Unavailable`.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        match self {
            Self::Cart(aggregate) => aggregate.total_items,
            Self::Unavailable => 0,
        }
    }

    /// Summed quantity; zero for `Unavailable`.
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        match self {
            Self::Cart(aggregate) => aggregate.total_quantity,
            Self::Unavailable => 0,
        }
    }

    /// Returns `true` for the store-failure sentinel.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}
