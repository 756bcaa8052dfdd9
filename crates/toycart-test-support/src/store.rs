//! In-memory `CartStore` implementations for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use toycart_core::cart::{CartAggregate, CartItem, Quantity};
use toycart_core::clock::{Clock, SystemClock};
use toycart_core::error::CartError;
use toycart_core::identity::{ItemId, UserId};
use toycart_core::store::{CART_READ_FAILED, CartStore, ITEM_DELETE_FAILED, ITEM_UPSERT_FAILED};

use crate::call_log::CallLog;

#[derive(Debug, Clone, Copy)]
struct Line {
    quantity: i32,
    updated_at: DateTime<Utc>,
}

/// A cart store held in memory. Merges quantities on repeat adds, treats a
/// delete that matches nothing as a failure, and counts every call.
pub struct InMemoryCartStore {
    clock: Box<dyn Clock>,
    carts: Mutex<BTreeSet<UserId>>,
    lines: Mutex<BTreeMap<(UserId, ItemId), Line>>,
    upserts: AtomicUsize,
    deletes: AtomicUsize,
    reads: AtomicUsize,
    log: Option<CallLog>,
}

impl std::fmt::Debug for InMemoryCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCartStore")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryCartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCartStore {
    /// Creates an empty store stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty store stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            carts: Mutex::new(BTreeSet::new()),
            lines: Mutex::new(BTreeMap::new()),
            upserts: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            log: None,
        }
    }

    /// Records each call as `store.*` in `log`.
    #[must_use]
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Total calls across all methods.
    pub fn call_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
            + self.reads.load(Ordering::SeqCst)
    }

    /// Calls to `upsert_item`.
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Calls to `delete_item`.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Calls to `read_aggregate`.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Returns `true` if a cart row exists for `user_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn has_cart(&self, user_id: UserId) -> bool {
        self.carts.lock().unwrap().contains(&user_id)
    }

    /// The stored quantity for a line, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn quantity(&self, user_id: UserId, item_id: ItemId) -> Option<i32> {
        self.lines
            .lock()
            .unwrap()
            .get(&(user_id, item_id))
            .map(|line| line.quantity)
    }

    /// When a line was last written, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn updated_at(&self, user_id: UserId, item_id: ItemId) -> Option<DateTime<Utc>> {
        self.lines
            .lock()
            .unwrap()
            .get(&(user_id, item_id))
            .map(|line| line.updated_at)
    }

    fn record(&self, call: &'static str) {
        if let Some(log) = &self.log {
            log.record(call);
        }
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn upsert_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
        quantity: Quantity,
    ) -> Result<(), CartError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.record("store.upsert_item");

        self.carts.lock().unwrap().insert(user_id);

        let now = self.clock.now();
        let mut lines = self.lines.lock().unwrap();
        let line = lines.entry((user_id, item_id)).or_insert(Line {
            quantity: 0,
            updated_at: now,
        });
        line.quantity = line
            .quantity
            .checked_add(quantity.get())
            .ok_or_else(|| CartError::Store(ITEM_UPSERT_FAILED.to_owned()))?;
        line.updated_at = now;
        Ok(())
    }

    async fn delete_item(&self, user_id: UserId, item_id: ItemId) -> Result<(), CartError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.record("store.delete_item");

        match self.lines.lock().unwrap().remove(&(user_id, item_id)) {
            Some(_) => Ok(()),
            None => Err(CartError::Store(ITEM_DELETE_FAILED.to_owned())),
        }
    }

    async fn read_aggregate(&self, user_id: UserId) -> Result<CartAggregate, CartError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.record("store.read_aggregate");

        let lines = self.lines.lock().unwrap();
        let items = lines
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|((_, item_id), line)| {
                Ok(CartItem {
                    item_id: *item_id,
                    quantity: Quantity::new(line.quantity)
                        .map_err(|_| CartError::Store(CART_READ_FAILED.to_owned()))?,
                })
            })
            .collect::<Result<Vec<_>, CartError>>()?;
        Ok(CartAggregate::from_items(items))
    }
}

/// A cart store whose every method fails with the store's own message for
/// that operation. Counts calls.
#[derive(Debug, Default)]
pub struct FailingCartStore {
    calls: AtomicUsize,
}

impl FailingCartStore {
    /// Creates a failing store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total calls across all methods.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CartStore for FailingCartStore {
    async fn upsert_item(
        &self,
        _user_id: UserId,
        _item_id: ItemId,
        _quantity: Quantity,
    ) -> Result<(), CartError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CartError::Store(ITEM_UPSERT_FAILED.to_owned()))
    }

    async fn delete_item(&self, _user_id: UserId, _item_id: ItemId) -> Result<(), CartError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CartError::Store(ITEM_DELETE_FAILED.to_owned()))
    }

    async fn read_aggregate(&self, _user_id: UserId) -> Result<CartAggregate, CartError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CartError::Store(CART_READ_FAILED.to_owned()))
    }
}
