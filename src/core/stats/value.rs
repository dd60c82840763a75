//! Numeric value extraction from stat lines.

use super::normalize::NUMERIC_LITERAL;

/// Extract the first numeric literal from a stat line.
///
/// Scans left to right for an optionally signed integer or decimal and
/// parses it. Lines without a number yield `0.0`.
///
/// ```
/// use statmatch::core::stats::extract_value;
///
/// assert_eq!(extract_value("+30% increased Physical Damage"), 30.0);
/// assert_eq!(extract_value("Adds 5 to 10 Fire Damage"), 5.0);
/// assert_eq!(extract_value("Grants a random Skill"), 0.0);
/// ```
pub fn extract_value(line: &str) -> f64 {
    NUMERIC_LITERAL
        .find(line)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Extract every numeric literal, in order. Range stats ("Adds 5 to 10")
/// carry their bounds here.
pub fn extract_values(line: &str) -> Vec<f64> {
    NUMERIC_LITERAL
        .find_iter(line)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}
