//! Property-based tests for stat matching
//!
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Test Modules
//!
//! - `normalize_props`: Text normalizer and value extractor
//!   - Normalization is idempotent
//!   - Rolled values never change the normalized text
//!   - Output is lowercase, trimmed, single-spaced
//!   - Value extraction is total
//!
//! - `resolution_props`: Stat resolver policy
//!   - Templates with rolled values resolve exactly
//!   - Implicit lines only ever resolve to Implicit entries
//!   - Accepted fuzzy hits always score below the cut-off
//!   - Resolution is deterministic
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod normalize_props;
