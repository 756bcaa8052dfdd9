//! Commands and queries for the cart context.

use toycart_core::cart::Quantity;
use toycart_core::identity::ItemId;
use uuid::Uuid;

/// Command to add units of an item to the caller's cart.
#[derive(Debug, Clone)]
pub struct AddItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item identifier.
    pub item_id: ItemId,
    /// Units to add; merged into any existing line.
    pub quantity: Quantity,
}

/// Command to remove an item line from the caller's cart.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item identifier.
    pub item_id: ItemId,
}

/// Query for the caller's cart and its totals.
#[derive(Debug, Clone)]
pub struct ListCart {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}
