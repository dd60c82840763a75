//! Stat text normalization.
//!
//! Catalog templates and pasted item lines differ in numeric values and in
//! small bits of decoration (tier markers, alternate phrasing, implicit
//! tags). Normalizing both sides makes textually equivalent stats compare
//! equal regardless of their rolled values:
//!
//! ```text
//! "+45% increased [Fire] Damage"  ->  "#% increased fire damage"
//! "#% increased Fire Damage"      ->  "#% increased fire damage"
//! ```
//!
//! Pipeline (order matters):
//!
//! 1. lowercase
//! 2. drop a `+` directly in front of a digit
//! 3. drop `[` and `]`, keeping their contents
//! 4. drop `|annotation` up to the next whitespace
//! 5. replace numeric literals with [`VALUE_PLACEHOLDER`]
//! 6. collapse whitespace
//! 7. strip one leading `adds ` / `gain ` / `you `
//! 8. strip a trailing `(implicit)`
//! 9. trim
//!
//! Steps 7-9 repeat until nothing changes, so the function is idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder every numeric literal collapses to.
pub const VALUE_PLACEHOLDER: &str = "#";

/// Leading verbs stripped from stat text, checked in this order.
const LEADING_VERBS: &[&str] = &["adds ", "gain ", "you "];

const IMPLICIT_SUFFIX: &str = "(implicit)";

// ============================================================================
// Regex Patterns
// ============================================================================

/// `+` followed by a digit; the digit is captured so it can be put back.
static PLUS_BEFORE_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+([0-9])").expect("Failed to compile plus-sign regex"));

static SQUARE_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\[\]]").expect("Failed to compile bracket regex"));

/// `|` up to (not including) the next whitespace or end of input.
static PIPE_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\S*").expect("Failed to compile pipe annotation regex"));

/// Optionally signed integer or decimal. ASCII digits only.
pub(crate) static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[+-]?[0-9]+\.?[0-9]*").expect("Failed to compile numeric literal regex")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

// ============================================================================
// Normalization
// ============================================================================

/// Canonicalize stat text for comparison.
///
/// Total and deterministic: any input, including the empty string, produces
/// a normalized string.
///
/// Leading verbs are stripped repeatedly, not once: "You gain Onslaught"
/// becomes "onslaught", where a single strip would leave "gain onslaught"
/// and a second call would change it again.
pub fn normalize_stat_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let unsigned = PLUS_BEFORE_DIGIT.replace_all(&lowered, "$1");
    let unbracketed = SQUARE_BRACKETS.replace_all(&unsigned, "");
    let unannotated = PIPE_ANNOTATION.replace_all(&unbracketed, "");
    let templated = NUMERIC_LITERAL.replace_all(&unannotated, VALUE_PLACEHOLDER);
    let collapsed = WHITESPACE_RUN.replace_all(&templated, " ");

    strip_decorations(&collapsed).to_string()
}

/// Steps 7-9, repeated to a fixpoint.
fn strip_decorations(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let before = current.len();

        if let Some(rest) = LEADING_VERBS
            .iter()
            .find_map(|verb| current.strip_prefix(verb))
        {
            current = rest.trim();
        }
        if let Some(rest) = current.strip_suffix(IMPLICIT_SUFFIX) {
            current = rest.trim();
        }

        if current.len() == before {
            return current;
        }
    }
}

/// Whether two stat texts are equivalent once normalized.
pub fn same_stat(a: &str, b: &str) -> bool {
    normalize_stat_text(a) == normalize_stat_text(b)
}
