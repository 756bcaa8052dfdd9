//! Query handlers for the cart context.

use toycart_core::cart::{CartAggregate, CartListing};
use toycart_core::entitlement::EntitlementClient;
use toycart_core::identity::CallerIdentity;
use toycart_core::store::CartStore;
use tracing::{debug, instrument, warn};

use crate::application::access::authorize;
use crate::domain::commands::ListCart;

/// Lists the caller's cart with its totals.
///
/// A caller that fails the identity or entitlement gate gets an empty cart.
/// A store failure yields `CartListing::Unavailable`, which callers can tell
/// apart from a cart that is merely empty.
#[instrument(skip_all, fields(correlation_id = %query.correlation_id))]
pub async fn handle_list_cart(
    query: &ListCart,
    caller: Option<&CallerIdentity>,
    entitlements: &dyn EntitlementClient,
    store: &dyn CartStore,
) -> CartListing {
    let caller = match authorize(caller, entitlements).await {
        Ok(caller) => caller,
        Err(err) => {
            warn!(error = %err, "cart listing refused");
            return CartListing::Cart(CartAggregate::empty());
        }
    };

    match store.read_aggregate(caller.user_id).await {
        Ok(cart) => {
            debug!(
                user_id = %caller.user_id,
                total_items = cart.total_items,
                empty = cart.is_empty(),
                "cart listed"
            );
            CartListing::Cart(cart)
        }
        Err(err) => {
            warn!(user_id = %caller.user_id, error = %err, "cart listing unavailable");
            CartListing::Unavailable
        }
    }
}
