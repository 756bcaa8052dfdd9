//! Cart operation inputs.

pub mod commands;
