//! Identity and entitlement gate shared by every cart operation.

use toycart_core::entitlement::EntitlementClient;
use toycart_core::error::CartError;
use toycart_core::identity::CallerIdentity;

/// Admits a caller only if an identity is attached and the entitlement
/// service reports an active subscription. Makes no remote call for an
/// anonymous caller.
pub(crate) async fn authorize<'a>(
    caller: Option<&'a CallerIdentity>,
    entitlements: &dyn EntitlementClient,
) -> Result<&'a CallerIdentity, CartError> {
    let caller = caller.ok_or(CartError::AuthenticationMissing)?;
    let state = entitlements.check_subscription(caller).await?;
    if !state.is_subscribed() {
        return Err(CartError::NotEntitled);
    }
    Ok(caller)
}
