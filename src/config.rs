use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::core::stats::MatchConfig;

/// Public trade API endpoint serving the stat catalog.
pub const DEFAULT_CATALOG_URL: &str = "https://www.pathofexile.com/api/trade/data/stats";

/// Prefix of environment overrides, e.g. `STATMATCH_CATALOG__URL`.
const ENV_PREFIX: &str = "STATMATCH_";

/// A config file that could not be parsed; defaults were used instead.
#[derive(Debug, thiserror::Error)]
#[error("Failed to parse config at {}: {source}, using defaults", .path.display())]
pub struct ConfigError {
    pub path: PathBuf,
    #[source]
    pub source: figment::Error,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub matching: MatchConfig,
    pub logging: LoggingConfig,
}

/// Where the stat catalog comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// HTTP endpoint returning the grouped catalog.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent sent with catalog requests.
    pub user_agent: String,
    /// Read the catalog from this JSON file instead of `url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    /// Also write JSON logs to a daily rolling file.
    pub file_logging: bool,
    /// Override the log directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
            file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/statmatch/config.toml` plus
    /// `STATMATCH_*` environment overrides.
    /// Returns `Default` if the result is unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Same as [`AppConfig::load`] with an explicit config file.
    pub fn load_from(path: &Path) -> Self {
        let (config, error) = Self::load_or_default(path);
        if let Some(e) = error {
            log::warn!("{e}");
        }
        config
    }

    /// Load from `path`, falling back to `Default` on a parse failure.
    ///
    /// The failure is handed back instead of logged, for callers that load
    /// configuration before logging is set up.
    pub fn load_or_default(path: &Path) -> (Self, Option<ConfigError>) {
        match Self::figment(path).extract::<AppConfig>() {
            Ok(config) => {
                if path.exists() {
                    log::info!("Loaded config from {}", path.display());
                } else {
                    log::debug!("No config file at {}, using defaults", path.display());
                }
                (config, None)
            }
            Err(source) => (
                Self::default(),
                Some(ConfigError {
                    path: path.to_path_buf(),
                    source,
                }),
            ),
        }
    }

    /// Layered sources: defaults, then the TOML file, then the environment.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.logging.log_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("statmatch").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("statmatch").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
