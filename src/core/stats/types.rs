//! Catalog data model.
//!
//! [`StatOption`] is the flattened catalog record the rest of the crate works
//! with. [`CatalogResponse`], [`StatGroup`] and [`StatEntry`] mirror the wire
//! payload returned by the catalog endpoint:
//!
//! ```json
//! { "result": [ { "label": "Explicit", "entries": [ { "id": "...", "text": "..." } ] } ] }
//! ```
//!
//! or, on failure, `{ "error": "..." }` (the live trade API sends
//! `{ "error": { "code": 2, "message": "..." } }`).

use serde::{Deserialize, Serialize};

use super::error::{Result, StatError};

/// Category label of fixed, always-present item modifiers.
pub const IMPLICIT_CATEGORY: &str = "Implicit";

// ============================================================================
// Flattened catalog record
// ============================================================================

/// A single stat template from the reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatOption {
    /// Opaque identifier used by the trade query engine. Never rewritten.
    pub id: String,
    /// Display template, e.g. `"#% increased Fire Damage"`.
    pub text: String,
    /// Group label the entry came from ("Explicit", "Implicit", "Crafted", ...).
    #[serde(rename = "type")]
    pub category: String,
    /// Auxiliary metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<serde_json::Value>,
}

impl StatOption {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
            option: None,
        }
    }

    pub fn with_option(mut self, option: serde_json::Value) -> Self {
        self.option = Some(option);
        self
    }

    pub fn is_implicit(&self) -> bool {
        self.category == IMPLICIT_CATEGORY
    }
}

// ============================================================================
// Wire payload
// ============================================================================

/// One entry inside a catalog group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatEntry {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<serde_json::Value>,
}

/// A labelled group of catalog entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatGroup {
    pub label: String,
    #[serde(default)]
    pub entries: Vec<StatEntry>,
}

/// Error payload sent by the catalog source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteError {
    Message(String),
    Detailed {
        #[serde(default)]
        code: Option<i64>,
        message: String,
    },
    Other(serde_json::Value),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Message(message) => write!(f, "{message}"),
            RemoteError::Detailed {
                code: Some(code),
                message,
            } => write!(f, "{message} (code {code})"),
            RemoteError::Detailed { code: None, message } => write!(f, "{message}"),
            RemoteError::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Top-level catalog payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<StatGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

impl CatalogResponse {
    /// Build a successful payload from groups.
    pub fn from_groups(groups: Vec<StatGroup>) -> Self {
        Self {
            result: Some(groups),
            error: None,
        }
    }

    /// Unwrap the groups, treating a present `error` as a hard failure even
    /// when `result` is also set.
    pub fn into_groups(self) -> Result<Vec<StatGroup>> {
        if let Some(error) = self.error {
            return Err(StatError::Data(error.to_string()));
        }
        self.result
            .ok_or_else(|| StatError::Data("payload has no `result` field".to_string()))
    }
}

/// Flatten grouped entries into catalog records, preserving group order and
/// entry order. The group label becomes the record category.
pub fn flatten_groups(groups: Vec<StatGroup>) -> Vec<StatOption> {
    groups
        .into_iter()
        .flat_map(|group| {
            let label = group.label;
            group.entries.into_iter().map(move |entry| StatOption {
                id: entry.id,
                text: entry.text,
                category: label.clone(),
                option: entry.option,
            })
        })
        .collect()
}
