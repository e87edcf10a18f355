//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod bestiary;
pub mod clock;
pub mod debounced_saver;
pub mod json_store;
pub mod ports;
pub mod rule_based_generator;
