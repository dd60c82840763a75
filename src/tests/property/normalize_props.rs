//! Property-based tests for the Text Normalizer
//!
//! Tests invariants:
//! - normalize(normalize(x)) == normalize(x)
//! - Rolled values collapse to the same placeholder
//! - Output has no uppercase ASCII, digits, brackets or pipes
//! - extract_value never fails and finds the first literal

use proptest::prelude::*;

use crate::core::stats::{extract_value, normalize_stat_text, VALUE_PLACEHOLDER};

// ============================================================================
// Strategies
// ============================================================================

/// Printable ASCII, which covers everything the game client pastes.
fn arb_line() -> impl Strategy<Value = String> {
    "[ -~]{0,80}"
}

/// Stat-shaped text: optional verb, signed value, decorations, suffix.
fn arb_stat_line() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just(""), Just("Adds "), Just("Gain "), Just("You ")],
        prop_oneof![Just(""), Just("+"), Just("-")],
        prop_oneof![
            Just("increased [Fire|Fire Damage] Damage"),
            Just("to maximum Life"),
            Just("to [Strength] Requirement"),
            Just("of Physical Attack Damage Leeched as Life"),
        ],
        prop_oneof![Just(""), Just(" (implicit)"), Just("  ")],
    )
        .prop_map(|(verb, sign, body, suffix)| format!("{verb}{sign}{{}}% {body}{suffix}"))
}

fn fill(template: &str, value: &str) -> String {
    template.replace("{}", value)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(line in arb_line()) {
        let once = normalize_stat_text(&line);
        prop_assert_eq!(normalize_stat_text(&once), once.clone());
    }

    #[test]
    fn prop_normalize_is_idempotent_for_unicode(line in "\\PC{0,40}") {
        let once = normalize_stat_text(&line);
        prop_assert_eq!(normalize_stat_text(&once), once.clone());
    }

    #[test]
    fn prop_rolled_values_do_not_matter(
        template in arb_stat_line(),
        a in 0u32..100_000,
        b in 0u32..100_000,
        frac in 0u32..100,
    ) {
        let left = normalize_stat_text(&fill(&template, &a.to_string()));
        let right = normalize_stat_text(&fill(&template, &format!("{b}.{frac}")));
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_output_is_canonical(line in arb_line()) {
        let normalized = normalize_stat_text(&line);
        prop_assert_eq!(normalized.trim(), normalized.as_str());
        prop_assert!(!normalized.contains("  "));
        prop_assert!(!normalized.chars().any(|c| c.is_ascii_uppercase()));
        prop_assert!(!normalized.chars().any(|c| c.is_ascii_digit()));
        prop_assert!(!normalized.contains(['[', ']', '|']));
        prop_assert!(!normalized.ends_with("(implicit)"));
    }

    #[test]
    fn prop_numbers_become_placeholders(value in 1u32..1_000_000) {
        let normalized = normalize_stat_text(&format!("{value} to maximum Life"));
        prop_assert_eq!(normalized, format!("{VALUE_PLACEHOLDER} to maximum life"));
    }

    #[test]
    fn prop_extract_value_is_total(line in arb_line()) {
        let value = extract_value(&line);
        prop_assert!(value.is_finite());
        if !line.chars().any(|c| c.is_ascii_digit()) {
            prop_assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn prop_extract_value_finds_first_literal(
        first in 0u32..10_000,
        second in 0u32..10_000,
        negative in any::<bool>(),
    ) {
        let sign = if negative { "-" } else { "+" };
        let line = format!("Adds {sign}{first} to {second} Cold Damage");
        let expected = if negative { -(first as f64) } else { first as f64 };
        prop_assert_eq!(extract_value(&line), expected);
    }
}
