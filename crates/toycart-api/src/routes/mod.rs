//! HTTP route modules.

pub mod cart;
pub mod health;
