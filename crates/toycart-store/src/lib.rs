//! `PostgreSQL` persistence for carts and line items.

pub mod pg_cart_store;
pub mod pool;
mod queries;

pub use pg_cart_store::PgCartStore;
pub use pool::{PoolSettings, connect};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
