//! Stat Matching Error Types
//!
//! Error handling for catalog loading and stat resolution.
//!
//! "No match" and "no number found" are not errors: the resolver returns
//! [`Resolution::NoMatch`](super::Resolution::NoMatch) and the value
//! extractor returns `0.0`. Only transport failures, bad payloads and use
//! before the first successful load surface here.

use thiserror::Error;

/// Stat catalog and resolution errors.
#[derive(Error, Debug)]
pub enum StatError {
    /// The catalog source could not be reached (transport failure, timeout,
    /// non-success HTTP status without an error payload).
    #[error("Catalog fetch failed: {0}")]
    Fetch(String),

    /// A response arrived but carried an error payload or could not be decoded.
    #[error("Catalog data error: {0}")]
    Data(String),

    /// The resolver was invoked before any catalog was loaded.
    #[error("Stat catalog not initialized - load the catalog first")]
    NotInitialized,
}

impl StatError {
    /// Whether retrying the same request could reasonably succeed.
    ///
    /// Only transport-level failures qualify; a payload the source rejected
    /// or that we could not decode will come back the same way.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StatError::Fetch(_))
    }
}

impl From<reqwest::Error> for StatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StatError::Data(e.to_string())
        } else {
            StatError::Fetch(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StatError {
    fn from(e: serde_json::Error) -> Self {
        StatError::Data(e.to_string())
    }
}

impl From<std::io::Error> for StatError {
    fn from(e: std::io::Error) -> Self {
        StatError::Fetch(e.to_string())
    }
}

/// Result type alias for stat operations
pub type Result<T> = std::result::Result<T, StatError>;
