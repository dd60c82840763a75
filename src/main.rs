//! statmatch command line.
//!
//! Usage:
//!   statmatch resolve "+45% increased Fire Damage" "+15 to Strength (implicit)"
//!   statmatch item item.txt              # or pipe the item on stdin
//!   statmatch normalize "+45% increased [Fire] Damage"
//!   statmatch config                     # effective configuration as TOML
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;

use statmatch::config::{AppConfig, ConfigError};
use statmatch::core::stats::{extract_value, normalize_stat_text, CatalogLoader, StatRegistry};

#[derive(Parser)]
#[command(name = "statmatch", version)]
#[command(about = "Match pasted item stat lines to trade catalog ids")]
struct Cli {
    /// Config file (default: ~/.config/statmatch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog endpoint override
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    /// Read the catalog from a JSON file instead of the endpoint
    #[arg(long, global = true, conflicts_with = "catalog_url")]
    catalog_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve individual stat lines
    Resolve {
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// Resolve every stat line of a pasted item
    Item {
        /// Item text file; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Show the normalized form of a stat text
    Normalize { text: String },
    /// Print the effective configuration
    Config,
}

impl Cli {
    /// Effective configuration plus any parse failure, which is reported
    /// once logging is up.
    fn app_config(&self) -> (AppConfig, Option<ConfigError>) {
        let path = self.config.clone().unwrap_or_else(AppConfig::config_path);
        let (mut config, error) = AppConfig::load_or_default(&path);
        if let Some(url) = &self.catalog_url {
            config.catalog.url = url.clone();
            config.catalog.file = None;
        }
        if let Some(file) = &self.catalog_file {
            config.catalog.file = Some(file.clone());
        }
        (config, error)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = cli.app_config();

    let _log_guard = statmatch::core::logging::init(&config.logging, &config.log_dir());
    if let Some(e) = config_error {
        log::warn!("{e}");
    }
    log::debug!("{} v{} starting", statmatch::NAME, statmatch::VERSION);

    match cli.command {
        Command::Normalize { text } => {
            print_json(&json!({
                "text": text,
                "normalized": normalize_stat_text(&text),
                "value": extract_value(&text),
            }))?;
        }
        Command::Config => {
            print!("{}", config.to_toml().context("Failed to render config")?);
        }
        Command::Resolve { lines } => {
            let registry = load_registry(&config).await?;
            let snapshot = registry.snapshot()?;
            let results: Vec<_> = lines
                .iter()
                .map(|line| {
                    json!({
                        "line": line,
                        "normalized": normalize_stat_text(line),
                        "value": extract_value(line),
                        "resolution": snapshot.resolve(line),
                    })
                })
                .collect();
            print_json(&json!({
                "catalog": snapshot.summary(),
                "results": results,
            }))?;
        }
        Command::Item { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    io::stdin()
                        .read_to_string(&mut buffer)
                        .context("Failed to read item from stdin")?;
                    buffer
                }
            };
            let registry = load_registry(&config).await?;
            let snapshot = registry.snapshot()?;
            print_json(&json!({
                "catalog": snapshot.summary(),
                "item": snapshot.resolve_item(&text),
            }))?;
        }
    }

    Ok(())
}

async fn load_registry(config: &AppConfig) -> anyhow::Result<StatRegistry> {
    let registry = StatRegistry::new(config.matching.clone());
    {
        let loader = CatalogLoader::from_config(&config.catalog, &registry)?;
        loader.load().await.with_context(|| {
            format!("Failed to load stat catalog from {}", loader.source().describe())
        })?;
    }
    Ok(registry)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
