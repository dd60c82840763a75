//! Catalog Loader Unit Tests
//!
//! Uses wiremock for HTTP mocking to test:
//! - Successful catalog loads and reloads
//! - Error payloads (string and object form)
//! - Non-success HTTP status handling
//! - Malformed bodies
//! - Timeouts
//! - Registry state after failed loads

mod loader_tests;
