//! Shared cart abstractions: identities, cart types, outcomes and the capability traits.
//!
//! This crate defines the identity and cart types, the status and error
//! taxonomy, and the capability traits (`CartStore`, `EntitlementClient`,
//! `CatalogClient`) that the orchestration layer composes. It contains no
//! infrastructure code.

pub mod cart;
pub mod catalog;
pub mod clock;
pub mod entitlement;
pub mod error;
pub mod identity;
pub mod status;
pub mod store;
