//! Routes for the shopping cart.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use toycart_cart::application::{command_handlers, query_handlers};
use toycart_cart::domain::commands;
use toycart_core::cart::{CartAggregate, CartListing, Quantity};
use toycart_core::identity::ItemId;
use toycart_core::status::OperationOutcome;

use crate::auth::MaybeCaller;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /items.
///
/// Absent fields decode as zero and are rejected by validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddItemRequest {
    /// Catalog id of the item to add.
    pub item_id: i64,
    /// Units to add.
    pub quantity: i32,
}

/// POST /items
#[instrument(
    skip(state, caller, request),
    fields(item_id = request.item_id, quantity = request.quantity)
)]
async fn add_item(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let command = commands::AddItem {
        correlation_id: Uuid::new_v4(),
        item_id: ItemId::new(request.item_id)?,
        quantity: Quantity::new(request.quantity)?,
    };

    info!(correlation_id = %command.correlation_id, "handling add_item command");

    let outcome = command_handlers::handle_add_item(
        &command,
        caller.as_ref(),
        &*state.entitlements,
        &*state.catalog,
        &*state.store,
    )
    .await;

    Ok(Json(outcome))
}

/// DELETE /items/{item_id}
#[instrument(skip(state, caller))]
async fn remove_item(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Path(item_id): Path<i64>,
) -> Result<Json<OperationOutcome>, ApiError> {
    let command = commands::RemoveItem {
        correlation_id: Uuid::new_v4(),
        item_id: ItemId::new(item_id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_item command");

    let outcome = command_handlers::handle_remove_item(
        &command,
        caller.as_ref(),
        &*state.entitlements,
        &*state.store,
    )
    .await;

    Ok(Json(outcome))
}

/// GET /
#[instrument(skip(state, caller))]
async fn list_cart(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
) -> Json<CartAggregate> {
    let query = commands::ListCart {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %query.correlation_id, "handling list_cart query");

    let listing =
        query_handlers::handle_list_cart(&query, caller.as_ref(), &*state.entitlements, &*state.store)
            .await;

    match listing {
        CartListing::Cart(aggregate) => Json(aggregate),
        CartListing::Unavailable => {
            warn!(correlation_id = %query.correlation_id, "cart unavailable, responding with empty listing");
            Json(CartAggregate::empty())
        }
    }
}

/// Returns the router for the cart, mounted at `/api/v1/cart`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cart))
        .route("/items", post(add_item))
        .route("/items/{item_id}", delete(remove_item))
}
