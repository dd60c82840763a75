//! Pasted item text.
//!
//! Item text copied from the game client is split into sections by
//! `--------` lines:
//!
//! ```text
//! Item Class: Rings            <- header section, skipped
//! Rarity: Rare
//! Vermillion Loop
//! Ruby Ring
//! --------
//! Requirements:                <- property lines, skipped
//! Level: 40
//! --------
//! Item Level: 84
//! --------
//! +29% to Fire Resistance (implicit)
//! --------
//! +45 to maximum Life          <- stat lines, resolved
//! 12% increased Fire Damage
//! --------
//! Corrupted                    <- marker, skipped
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::error::Result;
use super::resolver::Resolution;
use super::snapshot::{StatRegistry, StatSnapshot};
use super::value::extract_value;

const SECTION_SEPARATOR: &str = "--------";

/// Lines that mark the header section.
const HEADER_KEYS: &[&str] = &["Rarity:", "Item Class:"];

/// Standalone flag lines that carry no stat.
const MARKER_LINES: &[&str] = &[
    "Corrupted",
    "Unidentified",
    "Mirrored",
    "Split",
    "Fractured Item",
    "Synthesised Item",
    "Searing Exarch Item",
    "Eater of Worlds Item",
    "Shaper Item",
    "Elder Item",
    "Crusader Item",
    "Hunter Item",
    "Redeemer Item",
    "Warlord Item",
];

/// `Key: value` property lines such as "Item Level: 84" or "Requirements:".
static PROPERTY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][A-Za-z' ]*:(\s|$)").expect("Failed to compile property line regex")
});

/// Stat lines pulled out of a pasted item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemText {
    pub stat_lines: Vec<String>,
}

impl ItemText {
    pub fn parse(text: &str) -> Self {
        let mut stat_lines = Vec::new();

        for section in split_sections(text) {
            if section
                .iter()
                .any(|line| HEADER_KEYS.iter().any(|key| line.starts_with(key)))
            {
                continue;
            }
            stat_lines.extend(
                section
                    .into_iter()
                    .filter(|line| !is_property(line) && !MARKER_LINES.contains(line))
                    .map(str::to_string),
            );
        }

        Self { stat_lines }
    }

    pub fn is_empty(&self) -> bool {
        self.stat_lines.is_empty()
    }
}

fn split_sections(text: &str) -> Vec<Vec<&str>> {
    let mut sections = vec![Vec::new()];
    for line in text.lines().map(str::trim) {
        if line == SECTION_SEPARATOR {
            sections.push(Vec::new());
        } else if !line.is_empty() {
            if let Some(current) = sections.last_mut() {
                current.push(line);
            }
        }
    }
    sections.retain(|section| !section.is_empty());
    sections
}

fn is_property(line: &str) -> bool {
    PROPERTY_LINE.is_match(line)
}

/// One stat line that resolved to a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStat {
    pub line: String,
    pub value: f64,
    #[serde(flatten)]
    pub resolution: Resolution,
}

impl ResolvedStat {
    pub fn id(&self) -> &str {
        self.resolution.id().unwrap_or_default()
    }
}

/// Result of resolving every stat line of an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemResolution {
    pub stats: Vec<ResolvedStat>,
    pub unmatched: Vec<String>,
}

impl StatSnapshot {
    /// Resolve every stat line of a pasted item. Lines that do not resolve
    /// are collected in `unmatched`; they never stop the rest of the item.
    pub fn resolve_item(&self, text: &str) -> ItemResolution {
        let item = ItemText::parse(text);
        let mut resolution = ItemResolution::default();

        for line in item.stat_lines {
            match self.resolve(&line) {
                Resolution::NoMatch => resolution.unmatched.push(line),
                matched => resolution.stats.push(ResolvedStat {
                    value: extract_value(&line),
                    resolution: matched,
                    line,
                }),
            }
        }

        if !resolution.unmatched.is_empty() {
            log::debug!(
                "{} of {} item lines unmatched: {:?}",
                resolution.unmatched.len(),
                resolution.unmatched.len() + resolution.stats.len(),
                resolution.unmatched
            );
        }
        resolution
    }
}

impl StatRegistry {
    pub fn resolve_item(&self, text: &str) -> Result<ItemResolution> {
        Ok(self.snapshot()?.resolve_item(text))
    }
}
