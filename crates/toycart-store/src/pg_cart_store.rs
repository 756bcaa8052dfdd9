//! `PostgreSQL` implementation of the `CartStore` trait.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, error};

use toycart_core::cart::{CartAggregate, CartItem, Quantity};
use toycart_core::error::CartError;
use toycart_core::identity::{ItemId, UserId};
use toycart_core::store::{
    CART_ENSURE_FAILED, CART_READ_FAILED, CartStore, ITEM_DELETE_FAILED, ITEM_UPSERT_FAILED,
};

use crate::queries;

/// Default bound on a single store operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Low-level cause of a store failure. Logged, never shown to callers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or failed a query.
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// The operation did not finish within its bound.
    #[error("operation exceeded {0:?}")]
    Timeout(Duration),

    /// A delete matched no rows.
    #[error("no matching row")]
    NothingDeleted,

    /// A stored row violates a domain invariant.
    #[error("invalid stored row: {0}")]
    InvalidRow(CartError),
}

/// A failure paired with the message reported to the caller.
type Failure = (&'static str, StoreError);

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    item_id: i64,
    quantity: i32,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = StoreError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            item_id: ItemId::new(row.item_id).map_err(StoreError::InvalidRow)?,
            quantity: Quantity::new(row.quantity).map_err(StoreError::InvalidRow)?,
        })
    }
}

/// PostgreSQL-backed cart store.
///
/// Each trait method runs under `operation_timeout`. Statements within one
/// method are independent; a failure between them leaves earlier statements
/// applied.
#[derive(Debug, Clone)]
pub struct PgCartStore {
    pool: PgPool,
    operation_timeout: Duration,
}

impl PgCartStore {
    /// Creates a new `PgCartStore` with the default operation timeout.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Overrides the per-operation timeout.
    #[must_use]
    pub fn with_operation_timeout(mut self, operation_timeout: Duration) -> Self {
        self.operation_timeout = operation_timeout;
        self
    }

    async fn bounded<T, F>(&self, on_timeout: &'static str, operation: F) -> Result<T, Failure>
    where
        F: Future<Output = Result<T, Failure>> + Send,
    {
        match tokio::time::timeout(self.operation_timeout, operation).await {
            Ok(result) => result,
            Err(_elapsed) => Err((on_timeout, StoreError::Timeout(self.operation_timeout))),
        }
    }
}

fn report(method: &'static str, user_id: UserId, (message, source): Failure) -> CartError {
    error!(method, %user_id, error = %source, "{message}");
    CartError::Store(message.to_owned())
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn upsert_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
        quantity: Quantity,
    ) -> Result<(), CartError> {
        let operation = async {
            sqlx::query(queries::ENSURE_CART)
                .bind(user_id.get())
                .execute(&self.pool)
                .await
                .map_err(|e| (CART_ENSURE_FAILED, StoreError::from(e)))?;

            let row_id: i64 = sqlx::query_scalar(queries::UPSERT_ITEM)
                .bind(user_id.get())
                .bind(item_id.get())
                .bind(quantity.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| (ITEM_UPSERT_FAILED, StoreError::from(e)))?;

            debug!(%user_id, %item_id, row_id, "cart item upserted");
            Ok(())
        };

        self.bounded(ITEM_UPSERT_FAILED, operation)
            .await
            .map_err(|failure| report("store.upsert_item", user_id, failure))
    }

    async fn delete_item(&self, user_id: UserId, item_id: ItemId) -> Result<(), CartError> {
        let operation = async {
            let rows_affected = sqlx::query(queries::DELETE_ITEM)
                .bind(user_id.get())
                .bind(item_id.get())
                .execute(&self.pool)
                .await
                .map_err(|e| (ITEM_DELETE_FAILED, StoreError::from(e)))?
                .rows_affected();

            if rows_affected == 0 {
                return Err((ITEM_DELETE_FAILED, StoreError::NothingDeleted));
            }
            Ok(())
        };

        self.bounded(ITEM_DELETE_FAILED, operation)
            .await
            .map_err(|failure| report("store.delete_item", user_id, failure))
    }

    async fn read_aggregate(&self, user_id: UserId) -> Result<CartAggregate, CartError> {
        let operation = async {
            let rows: Vec<CartItemRow> = sqlx::query_as(queries::SELECT_ITEMS)
                .bind(user_id.get())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| (CART_READ_FAILED, StoreError::from(e)))?;

            let items = rows
                .into_iter()
                .map(CartItem::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| (CART_READ_FAILED, e))?;

            // Totals come from their own round trips, not from `items`.
            let total_items: i64 = sqlx::query_scalar(queries::COUNT_ITEMS)
                .bind(user_id.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| (CART_READ_FAILED, StoreError::from(e)))?;

            let total_quantity: i64 = sqlx::query_scalar(queries::SUM_QUANTITY)
                .bind(user_id.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| (CART_READ_FAILED, StoreError::from(e)))?;

            Ok(CartAggregate {
                items,
                total_items,
                total_quantity,
            })
        };

        self.bounded(CART_READ_FAILED, operation)
            .await
            .map_err(|failure| report("store.read_aggregate", user_id, failure))
    }
}
