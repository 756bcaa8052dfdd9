//! Application-level handlers for cart operations.

mod access;
pub mod command_handlers;
pub mod query_handlers;
