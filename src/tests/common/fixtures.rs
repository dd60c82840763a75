//! Test Fixtures
//!
//! Small but realistic slices of the trade stat catalog, in both wire and
//! flattened form, plus a scripted [`CatalogSource`].

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::stats::{
    CatalogResponse, CatalogSource, MatchConfig, Result, StatError, StatOption, StatSnapshot,
};

// =============================================================================
// Catalog Fixtures
// =============================================================================

/// Wire payload with explicit, implicit and crafted groups.
pub fn catalog_payload() -> Value {
    json!({
        "result": [
            {
                "label": "Explicit",
                "entries": [
                    { "id": "explicit.stat_3299347043", "text": "+# to maximum Life" },
                    { "id": "explicit.stat_3962278098", "text": "#% increased Fire Damage" },
                    { "id": "explicit.stat_4080418644", "text": "+# to Strength" },
                    { "id": "explicit.stat_3372524247", "text": "+#% to Fire Resistance" },
                    { "id": "explicit.stat_1379411836", "text": "+# to all Attributes" },
                    { "id": "explicit.stat_709508406", "text": "Adds # to # Fire Damage" },
                    {
                        "id": "explicit.stat_2974417149",
                        "text": "#% increased Spell Damage",
                        "option": { "options": [] }
                    }
                ]
            },
            {
                "label": "Implicit",
                "entries": [
                    { "id": "implicit.stat_4080418644", "text": "+# to Strength" },
                    { "id": "implicit.stat_3372524247", "text": "+#% to Fire Resistance" },
                    { "id": "implicit.stat_1379411836", "text": "+# to all Attributes" }
                ]
            },
            {
                "label": "Crafted",
                "entries": [
                    { "id": "crafted.stat_3299347043", "text": "+# to maximum Life" }
                ]
            }
        ]
    })
}

pub fn catalog_response() -> CatalogResponse {
    serde_json::from_value(catalog_payload()).expect("fixture payload must decode")
}

/// Flattened form of [`catalog_payload`].
pub fn catalog_options() -> Vec<StatOption> {
    catalog_response()
        .into_groups()
        .map(crate::core::stats::flatten_groups)
        .expect("fixture payload has groups")
}

pub fn test_snapshot() -> StatSnapshot {
    StatSnapshot::build(catalog_options(), MatchConfig::default(), 1)
}

// =============================================================================
// Scripted Source
// =============================================================================

/// Catalog source that replays queued outcomes, one per fetch.
pub struct ScriptedSource {
    outcomes: Mutex<Vec<Result<CatalogResponse>>>,
}

impl ScriptedSource {
    pub fn new(outcomes: Vec<Result<CatalogResponse>>) -> Self {
        let mut outcomes = outcomes;
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
        }
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    fn describe(&self) -> String {
        "scripted".to_string()
    }

    async fn fetch(&self) -> Result<CatalogResponse> {
        self.outcomes
            .lock()
            .expect("scripted source lock")
            .pop()
            .unwrap_or_else(|| Err(StatError::Fetch("script exhausted".to_string())))
    }
}
