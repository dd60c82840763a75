//! Stat line resolution.
//!
//! Maps one raw stat line to a catalog identifier.
//!
//! # Resolution Order
//!
//! ```text
//! 1. Scope     line mentions "implicit"  -> Implicit entries only
//! 2. Exact     normalized text equal     -> first entry in catalog order
//! 3. Fuzzy     top index hit             -> accepted if score < accept_below
//! 4. NoMatch
//! ```
//!
//! An exact match always wins, however the fuzzy index would rank other
//! entries. Not finding anything is a [`Resolution::NoMatch`] value, never an
//! error; the only error is resolving through a [`StatRegistry`] that has no
//! catalog yet.

use serde::Serialize;

use super::error::Result;
use super::normalize::normalize_stat_text;
use super::snapshot::{StatRegistry, StatSnapshot};
use super::types::StatOption;

/// Candidate pool for a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatScope {
    /// The whole catalog.
    All,
    /// Only entries whose category is exactly "Implicit".
    Implicit,
}

impl StatScope {
    /// Scope implied by a raw line: any case-insensitive "implicit" restricts
    /// the pool to implicit stats.
    pub fn for_line(raw: &str) -> Self {
        if raw.to_lowercase().contains("implicit") {
            StatScope::Implicit
        } else {
            StatScope::All
        }
    }

    pub fn admits(&self, option: &StatOption) -> bool {
        match self {
            StatScope::All => true,
            StatScope::Implicit => option.is_implicit(),
        }
    }
}

/// Outcome of resolving one stat line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Normalized text matched a catalog entry exactly.
    Exact { id: String },
    /// Best fuzzy hit, with its score (0 = identical).
    Fuzzy { id: String, score: f64 },
    /// Nothing close enough.
    NoMatch,
}

impl Resolution {
    /// The resolved identifier, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Resolution::Exact { id } | Resolution::Fuzzy { id, .. } => Some(id),
            Resolution::NoMatch => None,
        }
    }

    pub fn into_id(self) -> Option<String> {
        match self {
            Resolution::Exact { id } | Resolution::Fuzzy { id, .. } => Some(id),
            Resolution::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, Resolution::NoMatch)
    }
}

impl StatSnapshot {
    /// Resolve a raw stat line against this snapshot.
    pub fn resolve(&self, raw: &str) -> Resolution {
        let normalized = normalize_stat_text(raw);
        let scope = StatScope::for_line(raw);

        if let Some(option) = self.exact_match(&normalized, scope) {
            log::debug!(
                "Exact match: {:?} -> {} ({:?})",
                normalized,
                option.id,
                option.text
            );
            return Resolution::Exact {
                id: option.id.clone(),
            };
        }

        let Some(hit) = self.index_for(scope).best(&normalized) else {
            log::debug!("No fuzzy candidates for {:?} ({:?})", normalized, scope);
            return Resolution::NoMatch;
        };

        let accept_below = self.config().accept_below;
        match self.option(hit.position) {
            Some(option) if hit.score < accept_below => {
                log::debug!(
                    "Fuzzy match: {:?} -> {} ({:?}, score {:.3})",
                    normalized,
                    option.id,
                    option.text,
                    hit.score
                );
                Resolution::Fuzzy {
                    id: option.id.clone(),
                    score: hit.score,
                }
            }
            _ => {
                log::debug!(
                    "Rejected fuzzy hit for {:?}: score {:.3} >= {:.3}",
                    normalized,
                    hit.score,
                    accept_below
                );
                Resolution::NoMatch
            }
        }
    }

    /// First entry in catalog order, within `scope`, whose normalized text
    /// equals `normalized`.
    fn exact_match(&self, normalized: &str, scope: StatScope) -> Option<&StatOption> {
        self.exact_positions(normalized)
            .iter()
            .filter_map(|&position| self.option(position))
            .find(|option| scope.admits(option))
    }
}

impl StatRegistry {
    /// Resolve a raw stat line against the current snapshot.
    ///
    /// Fails with `NotInitialized` when no catalog has been loaded; never
    /// loads one implicitly.
    pub fn resolve(&self, raw: &str) -> Result<Resolution> {
        Ok(self.snapshot()?.resolve(raw))
    }
}
