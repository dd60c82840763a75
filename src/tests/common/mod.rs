//! Common Test Utilities
//!
//! Shared catalog fixtures and in-memory catalog sources.

pub mod fixtures;

pub use fixtures::*;
