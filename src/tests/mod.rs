//! Crate-internal test suites.
//!
//! - `common`: shared catalog fixtures and in-memory sources
//! - `property`: proptest invariants for normalization and resolution
//! - `unit`: loader tests against a mocked HTTP catalog (wiremock)

mod common;
mod property;
mod unit;
