pub mod logging;

// Stat normalization, catalog loading and fuzzy resolution
pub mod stats;
