//! Stat Matching Module
//!
//! Maps free-text item stat lines ("+45% increased Fire Damage") to the
//! stable identifiers of a reference stat catalog.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   fetch    ┌──────────────┐  install  ┌──────────────┐
//! │ CatalogSource│ ─────────> │ load_catalog │ ────────> │ StatRegistry │
//! │ (http, file) │            │  (flatten)   │           │ Arc<Snapshot>│
//! └──────────────┘            └──────────────┘           └──────┬───────┘
//!                                                                │ resolve
//!                             ┌──────────────┐           ┌──────┴───────┐
//!                             │  MatchIndex  │ <──────── │ StatSnapshot │
//!                             │  (fuzzy)     │           │ exact table  │
//!                             └──────────────┘           └──────────────┘
//! ```
//!
//! Both catalog templates and pasted lines go through
//! [`normalize_stat_text`] before they are compared, so rolled values never
//! affect a match.
//!
//! # Example
//!
//! ```
//! use statmatch::core::stats::{Resolution, StatOption, StatRegistry};
//!
//! let registry = StatRegistry::default();
//! registry.install(vec![StatOption::new(
//!     "stat_fire",
//!     "#% increased Fire Damage",
//!     "Explicit",
//! )]);
//!
//! let resolution = registry.resolve("+45% increased Fire Damage").unwrap();
//! assert_eq!(resolution, Resolution::Exact { id: "stat_fire".into() });
//! ```

pub mod api;
pub mod error;
pub mod index;
pub mod item;
pub mod loader;
pub mod normalize;
pub mod resolver;
pub mod snapshot;
pub mod types;
pub mod value;

pub use api::{fetch_stats, fetch_stats_from, find_stat_id};
pub use error::{Result, StatError};
pub use index::{MatchConfig, MatchIndex, SearchHit};
pub use item::{ItemResolution, ItemText, ResolvedStat};
pub use loader::{
    fetch_catalog, load_catalog, source_from_config, CatalogLoader, CatalogSource,
    FileCatalogSource, HttpCatalogSource,
};
pub use normalize::{normalize_stat_text, same_stat, VALUE_PLACEHOLDER};
pub use resolver::{Resolution, StatScope};
pub use snapshot::{CatalogSummary, StatRegistry, StatSnapshot};
pub use types::{
    flatten_groups, CatalogResponse, RemoteError, StatEntry, StatGroup, StatOption,
    IMPLICIT_CATEGORY,
};
pub use value::{extract_value, extract_values};
