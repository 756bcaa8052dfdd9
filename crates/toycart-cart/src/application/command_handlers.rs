//! Command handlers for the cart context.
//!
//! Each handler runs the identity gate, then the entitlement check, then any
//! catalog check, then the store, strictly in that order. The first failure
//! stops the sequence and becomes the reported outcome.

use toycart_core::catalog::CatalogClient;
use toycart_core::entitlement::EntitlementClient;
use toycart_core::error::CartError;
use toycart_core::identity::CallerIdentity;
use toycart_core::status::OperationOutcome;
use toycart_core::store::{CartStore, ITEM_ADDED_MESSAGE, ITEM_REMOVED_MESSAGE};
use tracing::{info, instrument, warn};

use crate::application::access::authorize;
use crate::domain::commands::{AddItem, RemoveItem};

/// Handles the `AddItem` command: verifies the caller, checks the item in the
/// catalog, and merges the quantity into the caller's cart.
#[instrument(
    skip_all,
    fields(correlation_id = %command.correlation_id, item_id = %command.item_id)
)]
pub async fn handle_add_item(
    command: &AddItem,
    caller: Option<&CallerIdentity>,
    entitlements: &dyn EntitlementClient,
    catalog: &dyn CatalogClient,
    store: &dyn CartStore,
) -> OperationOutcome {
    match add_item(command, caller, entitlements, catalog, store).await {
        Ok(()) => {
            info!(quantity = %command.quantity, "item added");
            OperationOutcome::ok(ITEM_ADDED_MESSAGE)
        }
        Err(err) => {
            warn!(error = %err, "add item rejected");
            OperationOutcome::from(err)
        }
    }
}

async fn add_item(
    command: &AddItem,
    caller: Option<&CallerIdentity>,
    entitlements: &dyn EntitlementClient,
    catalog: &dyn CatalogClient,
    store: &dyn CartStore,
) -> Result<(), CartError> {
    let caller = authorize(caller, entitlements).await?;

    let lookup = catalog.get_item(caller, command.item_id).await;
    if !lookup.is_orderable() {
        return Err(CartError::ItemUnavailable(command.item_id));
    }

    store
        .upsert_item(caller.user_id, command.item_id, command.quantity)
        .await
}

/// Handles the `RemoveItem` command: verifies the caller and deletes the line.
/// The catalog is not consulted, so items since withdrawn can still be
/// removed.
#[instrument(
    skip_all,
    fields(correlation_id = %command.correlation_id, item_id = %command.item_id)
)]
pub async fn handle_remove_item(
    command: &RemoveItem,
    caller: Option<&CallerIdentity>,
    entitlements: &dyn EntitlementClient,
    store: &dyn CartStore,
) -> OperationOutcome {
    let result = match authorize(caller, entitlements).await {
        Ok(caller) => store.delete_item(caller.user_id, command.item_id).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => {
            info!("item removed");
            OperationOutcome::ok(ITEM_REMOVED_MESSAGE)
        }
        Err(err) => {
            warn!(error = %err, "remove item rejected");
            OperationOutcome::from(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use toycart_core::cart::Quantity;
    use toycart_core::entitlement::SubscriptionState;
    use toycart_core::identity::{BearerCredential, CallerIdentity, ItemId, UserId};
    use toycart_core::status::OperationStatus;
    use toycart_core::store::CartStore;
    use toycart_test_support::{
        CallLog, FailingCartStore, FixedClock, InMemoryCartStore, StubCatalogClient,
        StubEntitlementClient,
    };
    use uuid::Uuid;

    use crate::application::command_handlers::{handle_add_item, handle_remove_item};
    use crate::domain::commands::{AddItem, RemoveItem};

    fn caller() -> CallerIdentity {
        CallerIdentity::new(
            UserId::new(42).unwrap(),
            BearerCredential::new("Bearer token-42"),
        )
    }

    fn add(item_id: i64, quantity: i32) -> AddItem {
        AddItem {
            correlation_id: Uuid::new_v4(),
            item_id: ItemId::new(item_id).unwrap(),
            quantity: Quantity::new(quantity).unwrap(),
        }
    }

    fn remove(item_id: i64) -> RemoveItem {
        RemoveItem {
            correlation_id: Uuid::new_v4(),
            item_id: ItemId::new(item_id).unwrap(),
        }
    }

    // --- handle_add_item ---

    #[tokio::test]
    async fn test_add_item_merges_quantities() {
        // Arrange
        let caller = caller();
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::new();

        // Act
        let first =
            handle_add_item(&add(5, 2), Some(&caller), &entitlements, &catalog, &store).await;
        let second =
            handle_add_item(&add(5, 3), Some(&caller), &entitlements, &catalog, &store).await;

        // Assert
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(second.message, "item added to cart");
        assert_eq!(store.quantity(caller.user_id, ItemId::new(5).unwrap()), Some(5));
    }

    #[tokio::test]
    async fn test_add_item_calls_collaborators_in_order() {
        // Arrange
        let log = CallLog::new();
        let entitlements = StubEntitlementClient::subscribed().with_log(log.clone());
        let catalog = StubCatalogClient::available().with_log(log.clone());
        let store = InMemoryCartStore::new().with_log(log.clone());

        // Act
        handle_add_item(&add(5, 1), Some(&caller()), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(
            log.calls(),
            vec![
                "entitlement.check_subscription",
                "catalog.get_item",
                "store.upsert_item"
            ]
        );
    }

    #[tokio::test]
    async fn test_add_item_without_identity_is_invalid_user_and_calls_nothing() {
        // Arrange
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::new();

        // Act
        let outcome = handle_add_item(&add(5, 1), None, &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InvalidUser);
        assert_eq!(outcome.message, "invalid user");
        assert_eq!(entitlements.call_count(), 0);
        assert_eq!(catalog.call_count(), 0);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_add_item_for_unsubscribed_user_stops_before_catalog() {
        // Arrange
        let entitlements = StubEntitlementClient::with_state(SubscriptionState::Expired);
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::new();

        // Act
        let outcome =
            handle_add_item(&add(5, 1), Some(&caller()), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InvalidUser);
        assert_eq!(outcome.message, "user is not subscribed");
        assert_eq!(entitlements.call_count(), 1);
        assert_eq!(catalog.call_count(), 0);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_add_item_when_entitlement_fails_is_internal_error() {
        // Arrange
        let entitlements = StubEntitlementClient::failing();
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::new();

        // Act
        let outcome =
            handle_add_item(&add(5, 1), Some(&caller()), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InternalError);
        assert_eq!(catalog.call_count(), 0);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_add_unknown_item_is_internal_error_and_skips_store() {
        // Arrange
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::not_found();
        let store = InMemoryCartStore::new();

        // Act
        let outcome =
            handle_add_item(&add(5, 1), Some(&caller()), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InternalError);
        assert_eq!(outcome.message, "toy is not exist in database!");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_add_unavailable_item_is_rejected() {
        // Arrange
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::unavailable();
        let store = InMemoryCartStore::new();

        // Act
        let outcome =
            handle_add_item(&add(5, 1), Some(&caller()), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InternalError);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_add_item_forwards_the_callers_credential() {
        // Arrange
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::new();

        // Act
        handle_add_item(&add(5, 1), Some(&caller()), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(
            catalog.forwarded_credentials(),
            vec![Some("Bearer token-42".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_add_item_without_credential_fails_closed_at_catalog() {
        // Arrange
        let anonymous = CallerIdentity::without_credential(UserId::new(42).unwrap());
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::new();

        // Act
        let outcome =
            handle_add_item(&add(5, 1), Some(&anonymous), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InternalError);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_add_item_store_failure_reports_store_message() {
        // Arrange
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::available();
        let store = FailingCartStore::new();

        // Act
        let outcome =
            handle_add_item(&add(5, 1), Some(&caller()), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InternalError);
        assert_eq!(outcome.message, "failed to add item");
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_add_item_stamps_line_with_clock() {
        // Arrange
        let fixed_now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let caller = caller();
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::with_clock(FixedClock(fixed_now));

        // Act
        handle_add_item(&add(5, 1), Some(&caller), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(
            store.updated_at(caller.user_id, ItemId::new(5).unwrap()),
            Some(fixed_now)
        );
    }

    #[tokio::test]
    async fn test_add_item_when_catalog_faults_is_internal_error_and_skips_store() {
        // Arrange
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::internal_error();
        let store = InMemoryCartStore::new();

        // Act
        let outcome =
            handle_add_item(&add(5, 1), Some(&caller()), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InternalError);
        assert_eq!(outcome.message, "toy is not exist in database!");
        assert_eq!(catalog.call_count(), 1);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_first_add_creates_the_cart() {
        // Arrange
        let caller = caller();
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::new();
        assert!(!store.has_cart(caller.user_id));

        // Act
        let outcome =
            handle_add_item(&add(5, 1), Some(&caller), &entitlements, &catalog, &store).await;

        // Assert
        assert!(outcome.is_ok());
        assert!(store.has_cart(caller.user_id));
    }

    #[tokio::test]
    async fn test_rejected_add_leaves_no_cart_behind() {
        // Arrange
        let caller = caller();
        let entitlements = StubEntitlementClient::not_subscribed();
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::new();

        // Act
        handle_add_item(&add(5, 1), Some(&caller), &entitlements, &catalog, &store).await;

        // Assert
        assert!(!store.has_cart(caller.user_id));
    }

    #[tokio::test]
    async fn test_add_item_only_upserts() {
        // Arrange
        let entitlements = StubEntitlementClient::subscribed();
        let catalog = StubCatalogClient::available();
        let store = InMemoryCartStore::new();

        // Act
        handle_add_item(&add(5, 1), Some(&caller()), &entitlements, &catalog, &store).await;
        handle_add_item(&add(6, 2), Some(&caller()), &entitlements, &catalog, &store).await;

        // Assert
        assert_eq!(store.upsert_count(), 2);
        assert_eq!(store.delete_count(), 0);
        assert_eq!(store.read_count(), 0);
    }

    // --- handle_remove_item ---

    #[tokio::test]
    async fn test_remove_existing_item() {
        // Arrange
        let caller = caller();
        let entitlements = StubEntitlementClient::subscribed();
        let store = InMemoryCartStore::new();
        store
            .upsert_item(caller.user_id, ItemId::new(5).unwrap(), Quantity::new(2).unwrap())
            .await
            .unwrap();

        // Act
        let outcome = handle_remove_item(&remove(5), Some(&caller), &entitlements, &store).await;

        // Assert
        assert!(outcome.is_ok());
        assert_eq!(outcome.message, "item removed from cart");
        assert_eq!(store.quantity(caller.user_id, ItemId::new(5).unwrap()), None);
    }

    #[tokio::test]
    async fn test_remove_item_only_deletes() {
        // Arrange
        let caller = caller();
        let entitlements = StubEntitlementClient::subscribed();
        let store = InMemoryCartStore::new();
        store
            .upsert_item(caller.user_id, ItemId::new(5).unwrap(), Quantity::new(2).unwrap())
            .await
            .unwrap();

        // Act
        handle_remove_item(&remove(5), Some(&caller), &entitlements, &store).await;
        handle_remove_item(&remove(5), Some(&caller), &entitlements, &store).await;

        // Assert
        assert_eq!(store.upsert_count(), 1);
        assert_eq!(store.delete_count(), 2);
    }

    #[tokio::test]
    async fn test_remove_missing_item_is_internal_error() {
        // Arrange
        let entitlements = StubEntitlementClient::subscribed();
        let store = InMemoryCartStore::new();

        // Act
        let outcome = handle_remove_item(&remove(5), Some(&caller()), &entitlements, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InternalError);
        assert_eq!(outcome.message, "failed to delete item");
    }

    #[tokio::test]
    async fn test_remove_without_identity_calls_nothing() {
        // Arrange
        let entitlements = StubEntitlementClient::subscribed();
        let store = InMemoryCartStore::new();

        // Act
        let outcome = handle_remove_item(&remove(5), None, &entitlements, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InvalidUser);
        assert_eq!(entitlements.call_count(), 0);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_for_unsubscribed_user_skips_store() {
        // Arrange
        let entitlements = StubEntitlementClient::not_subscribed();
        let store = InMemoryCartStore::new();

        // Act
        let outcome = handle_remove_item(&remove(5), Some(&caller()), &entitlements, &store).await;

        // Assert
        assert_eq!(outcome.status, OperationStatus::InvalidUser);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_calls_entitlement_then_store() {
        // Arrange
        let log = CallLog::new();
        let entitlements = StubEntitlementClient::subscribed().with_log(log.clone());
        let store = InMemoryCartStore::new().with_log(log.clone());

        // Act
        handle_remove_item(&remove(5), Some(&caller()), &entitlements, &store).await;

        // Assert
        assert_eq!(
            log.calls(),
            vec!["entitlement.check_subscription", "store.delete_item"]
        );
    }
}
