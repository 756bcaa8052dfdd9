//! Cart orchestration.
//!
//! Sequences each cart operation through identity, entitlement, catalog and
//! store, and maps the first failure onto a single reported status.

pub mod application;
pub mod domain;
