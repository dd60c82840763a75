//! Immutable catalog snapshots and the registry that publishes them.
//!
//! A [`StatSnapshot`] bundles everything one catalog load produces: the
//! flattened records, an exact-match table keyed by normalized text, the
//! full-catalog [`MatchIndex`] and a lazily built Implicit-only index. A
//! snapshot is never modified after construction.
//!
//! [`StatRegistry`] holds the current snapshot behind a single
//! `RwLock<Option<Arc<_>>>`. Loads build the next snapshot off to the side and
//! swap the reference in one write; readers clone the `Arc` and resolve
//! without holding any lock, so they always see a complete generation.
//!
//! ```text
//!   loader ──build──> StatSnapshot(gen N+1) ──swap──┐
//!                                                   v
//!   resolver ──clone Arc──> [ registry: Option<Arc<StatSnapshot>> ]
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{Result, StatError};
use super::index::{MatchConfig, MatchIndex};
use super::resolver::StatScope;
use super::types::{StatOption, IMPLICIT_CATEGORY};

// ============================================================================
// StatSnapshot
// ============================================================================

/// Which catalog generation answered, and how fresh it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub entries: usize,
}

/// One fully built catalog generation.
#[derive(Debug)]
pub struct StatSnapshot {
    generation: u64,
    loaded_at: DateTime<Utc>,
    catalog: Vec<StatOption>,
    /// Normalized text -> catalog positions, ascending.
    exact: HashMap<String, Vec<usize>>,
    index: MatchIndex,
    implicit_index: OnceLock<MatchIndex>,
}

impl StatSnapshot {
    /// Build a snapshot over the full, unfiltered catalog.
    pub fn build(catalog: Vec<StatOption>, config: MatchConfig, generation: u64) -> Self {
        let index = MatchIndex::from_options(&catalog, config);

        let mut exact: HashMap<String, Vec<usize>> = HashMap::with_capacity(catalog.len());
        for (position, key) in index.keys() {
            exact.entry(key.to_string()).or_default().push(position);
        }

        Self {
            generation,
            loaded_at: Utc::now(),
            catalog,
            exact,
            index,
            implicit_index: OnceLock::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            generation: self.generation,
            loaded_at: self.loaded_at,
            entries: self.catalog.len(),
        }
    }

    pub fn catalog(&self) -> &[StatOption] {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn option(&self, position: usize) -> Option<&StatOption> {
        self.catalog.get(position)
    }

    pub fn config(&self) -> &MatchConfig {
        self.index.config()
    }

    /// Index for a resolution scope. The Implicit index is built on first
    /// use and reused for the lifetime of the snapshot.
    pub fn index_for(&self, scope: StatScope) -> &MatchIndex {
        match scope {
            StatScope::All => &self.index,
            StatScope::Implicit => self.implicit_index.get_or_init(|| {
                let index =
                    MatchIndex::scoped(&self.catalog, IMPLICIT_CATEGORY, self.config().clone());
                log::debug!(
                    "Built implicit index for generation {} ({} entries)",
                    self.generation,
                    index.len()
                );
                index
            }),
        }
    }

    /// Catalog positions whose normalized text equals `normalized`, in
    /// catalog order.
    pub fn exact_positions(&self, normalized: &str) -> &[usize] {
        self.exact
            .get(normalized)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ids that occur more than once, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(self.catalog.len());
        let mut duplicates = Vec::new();
        for option in &self.catalog {
            let count = seen.entry(option.id.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(option.id.as_str());
            }
        }
        duplicates
    }
}

// ============================================================================
// StatRegistry
// ============================================================================

static GLOBAL_REGISTRY: OnceLock<StatRegistry> = OnceLock::new();

/// Holder of the current catalog snapshot.
#[derive(Debug)]
pub struct StatRegistry {
    current: RwLock<Option<Arc<StatSnapshot>>>,
    generation: AtomicU64,
    config: MatchConfig,
}

impl Default for StatRegistry {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl StatRegistry {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            config,
        }
    }

    /// The process-wide registry used by the consumer API.
    ///
    /// Created with default settings on first access unless
    /// [`StatRegistry::init_global`] ran earlier.
    pub fn global() -> &'static StatRegistry {
        GLOBAL_REGISTRY.get_or_init(StatRegistry::default)
    }

    /// Configure the process-wide registry. Returns `false` if it already
    /// exists, in which case its settings are left unchanged.
    pub fn init_global(config: MatchConfig) -> bool {
        GLOBAL_REGISTRY.set(StatRegistry::new(config)).is_ok()
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// The current snapshot, if a catalog has been loaded.
    pub fn current(&self) -> Option<Arc<StatSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current snapshot, or [`StatError::NotInitialized`].
    pub fn snapshot(&self) -> Result<Arc<StatSnapshot>> {
        self.current().ok_or(StatError::NotInitialized)
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// Build a snapshot from `catalog` and make it current.
    ///
    /// The snapshot is fully built before the swap, so concurrent readers
    /// observe either the previous generation or this one.
    pub fn install(&self, catalog: Vec<StatOption>) -> Arc<StatSnapshot> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(StatSnapshot::build(catalog, self.config.clone(), generation));

        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::clone(&snapshot));

        log::info!(
            "Installed stat catalog generation {} at {} ({} entries, replaced {:?})",
            generation,
            snapshot.loaded_at().to_rfc3339(),
            snapshot.len(),
            previous.map(|p| p.generation())
        );
        snapshot
    }

    /// Drop the current snapshot. Resolvers fail with
    /// [`StatError::NotInitialized`] until the next load. Returns whether a
    /// snapshot was installed.
    pub fn invalidate(&self) -> bool {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(ref snapshot) = previous {
            log::info!("Invalidated stat catalog generation {}", snapshot.generation());
        }
        previous.is_some()
    }
}
