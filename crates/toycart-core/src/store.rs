//! Cart persistence abstraction.

use async_trait::async_trait;

use crate::cart::{CartAggregate, Quantity};
use crate::error::CartError;
use crate::identity::{ItemId, UserId};

/// Message reported after a successful upsert.
pub const ITEM_ADDED_MESSAGE: &str = "item added to cart";
/// Message reported after a successful delete.
pub const ITEM_REMOVED_MESSAGE: &str = "item removed from cart";
/// Failure to ensure the per-user cart row.
pub const CART_ENSURE_FAILED: &str = "failed to get user cart";
/// Failure to insert or merge the line item.
pub const ITEM_UPSERT_FAILED: &str = "failed to add item";
/// Failure to delete, including deleting a row that does not exist.
pub const ITEM_DELETE_FAILED: &str = "failed to delete item";
/// Failure of any of the aggregate read queries.
pub const CART_READ_FAILED: &str = "failed to read cart";

/// Store owning durable cart and line-item state.
///
/// Implementations are the sole writers of cart rows. Failures are returned as
/// `CartError::Store` carrying one of the messages above.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Ensures a cart exists for `user_id`, then inserts the line item or, if
    /// one already exists for the pair, adds `quantity` to it.
    async fn upsert_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
        quantity: Quantity,
    ) -> Result<(), CartError>;

    /// Deletes the line item. Deleting nothing is an error.
    async fn delete_item(&self, user_id: UserId, item_id: ItemId) -> Result<(), CartError>;

    /// Reads all line items plus their count and quantity totals. A user
    /// without a cart gets an empty aggregate.
    async fn read_aggregate(&self, user_id: UserId) -> Result<CartAggregate, CartError>;
}
