//! Consumer entry points over the process-wide registry.
//!
//! These mirror the interface the item-pricing front end calls. Code that can
//! hold a [`StatRegistry`] or [`StatSnapshot`](super::StatSnapshot) directly
//! should prefer `StatRegistry::resolve` / `StatSnapshot::resolve`: the
//! functions here read hidden global state.

use super::error::Result;
use super::loader::{load_catalog, CatalogLoader, CatalogSource};
use super::snapshot::StatRegistry;
use super::types::StatOption;
use crate::config::AppConfig;

pub use super::value::extract_value;

/// Load the catalog from the configured source into the process-wide
/// registry and return the flattened records.
pub async fn fetch_stats() -> Result<Vec<StatOption>> {
    let config = AppConfig::load();
    StatRegistry::init_global(config.matching.clone());
    let snapshot = CatalogLoader::from_config(&config.catalog, StatRegistry::global())?
        .load()
        .await?;
    Ok(snapshot.catalog().to_vec())
}

/// [`fetch_stats`] with an explicit source.
pub async fn fetch_stats_from(source: &dyn CatalogSource) -> Result<Vec<StatOption>> {
    let snapshot = load_catalog(source, StatRegistry::global()).await?;
    Ok(snapshot.catalog().to_vec())
}

/// Resolve a raw stat line to a catalog id.
///
/// `_catalog` is accepted for interface compatibility only. Resolution is
/// always served from the process-wide registry, whatever is passed here.
/// Fails with `NotInitialized` until [`fetch_stats`] has succeeded once.
pub fn find_stat_id(raw: &str, _catalog: &[StatOption]) -> Result<Option<String>> {
    Ok(StatRegistry::global().resolve(raw)?.into_id())
}
