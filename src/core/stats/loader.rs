//! Catalog loading.
//!
//! A [`CatalogSource`] produces the raw grouped payload; [`load_catalog`]
//! flattens it, builds a new snapshot and installs it in a
//! [`StatRegistry`]. Nothing is installed unless the whole load succeeds, and
//! dropping the load future part-way (timeout, cancellation) leaves the
//! previous snapshot in place.
//!
//! No retries happen here. [`StatError::is_retryable`] tells callers whether
//! trying again makes sense.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::error::{Result, StatError};
use super::snapshot::{StatRegistry, StatSnapshot};
use super::types::{flatten_groups, CatalogResponse, StatGroup, StatOption};
use crate::config::CatalogConfig;

/// Number of groups/entries echoed at debug level after a fetch.
const SAMPLE_SIZE: usize = 2;

// ============================================================================
// Sources
// ============================================================================

/// Anything that can hand over the grouped catalog payload.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    /// Fetch the raw payload. Payload-level errors (an `error` field) are
    /// left for the caller to inspect.
    async fn fetch(&self) -> Result<CatalogResponse>;
}

/// Catalog served over HTTP as JSON.
pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Build a client with the configured timeout and user agent.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self::new(client, config.url.clone()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<CatalogResponse> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed = serde_json::from_str::<CatalogResponse>(&body);

        if !status.is_success() {
            // An error payload is a data error whatever the status says.
            return match parsed {
                Ok(payload) if payload.error.is_some() => Ok(payload),
                _ => Err(StatError::Fetch(format!(
                    "{} returned HTTP {}",
                    self.url, status
                ))),
            };
        }

        parsed.map_err(|e| {
            StatError::Data(format!("undecodable catalog from {}: {}", self.url, e))
        })
    }
}

/// Catalog read from a JSON file in the endpoint's format.
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<CatalogResponse> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Build the source selected by configuration: a local file when one is
/// set, the HTTP endpoint otherwise.
pub fn source_from_config(config: &CatalogConfig) -> Result<Box<dyn CatalogSource>> {
    match &config.file {
        Some(path) => Ok(Box::new(FileCatalogSource::new(path))),
        None => Ok(Box::new(HttpCatalogSource::from_config(config)?)),
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Fetch and flatten the catalog without touching any registry.
pub async fn fetch_catalog(source: &dyn CatalogSource) -> Result<Vec<StatOption>> {
    let groups = source.fetch().await?.into_groups()?;
    log_sample(&groups);

    let group_count = groups.len();
    let options = flatten_groups(groups);
    log::info!(
        "Fetched stat catalog from {}: {} groups, {} entries",
        source.describe(),
        group_count,
        options.len()
    );
    Ok(options)
}

/// Fetch the catalog and install it as the registry's current snapshot.
///
/// On failure the registry keeps whatever snapshot it had.
pub async fn load_catalog(
    source: &dyn CatalogSource,
    registry: &StatRegistry,
) -> Result<Arc<StatSnapshot>> {
    let options = match fetch_catalog(source).await {
        Ok(options) => options,
        Err(e) => {
            log::error!("Failed to fetch stats from {}: {}", source.describe(), e);
            return Err(e);
        }
    };

    if options.is_empty() {
        log::warn!("Stat catalog from {} is empty", source.describe());
    }

    let snapshot = registry.install(options);
    let duplicates = snapshot.duplicate_ids();
    if !duplicates.is_empty() {
        log::warn!(
            "Stat catalog has {} duplicate ids (first: {}); earliest entry wins on exact match",
            duplicates.len(),
            duplicates[0]
        );
    }
    Ok(snapshot)
}

/// A catalog source bound to the registry it loads into.
pub struct CatalogLoader<'r> {
    source: Box<dyn CatalogSource>,
    registry: &'r StatRegistry,
}

impl<'r> CatalogLoader<'r> {
    pub fn new(source: Box<dyn CatalogSource>, registry: &'r StatRegistry) -> Self {
        Self { source, registry }
    }

    pub fn from_config(config: &CatalogConfig, registry: &'r StatRegistry) -> Result<Self> {
        Ok(Self::new(source_from_config(config)?, registry))
    }

    pub fn source(&self) -> &dyn CatalogSource {
        self.source.as_ref()
    }

    /// Fetch and install a new snapshot. Safe to call repeatedly.
    pub async fn load(&self) -> Result<Arc<StatSnapshot>> {
        load_catalog(self.source.as_ref(), self.registry).await
    }
}

fn log_sample(groups: &[StatGroup]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    for group in groups.iter().take(SAMPLE_SIZE) {
        let sample: Vec<&str> = group
            .entries
            .iter()
            .take(SAMPLE_SIZE)
            .map(|entry| entry.text.as_str())
            .collect();
        log::debug!(
            "Stat group {:?}: {} entries, e.g. {:?}",
            group.label,
            group.entries.len(),
            sample
        );
    }
}
