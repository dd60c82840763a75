//! Logging setup.
//!
//! Library code logs through the `log` facade. [`init`] installs a
//! `tracing-subscriber` registry and bridges `log` records into it:
//!
//! - stderr layer, human readable (stdout is reserved for command output)
//! - optional JSON file layer, rolling daily
//!
//! `RUST_LOG` takes precedence over the configured level.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "statmatch.log";

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize logging. Keep the returned guard alive for as long as file
/// logs should be flushed; it is `None` when file logging is off.
pub fn init(config: &LoggingConfig, log_dir: &Path) -> Option<WorkerGuard> {
    // 1. File layer: JSON, daily rolling
    let (file_layer, guard) = if config.file_logging {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory {}: {}", log_dir.display(), e);
        }
        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_target(true)
            .with_filter(env_filter(&config.level));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // 2. Stderr layer
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(env_filter(&config.level));

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer);

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
        return guard;
    }

    // 3. Redirect `log` macros to `tracing`
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    if config.file_logging {
        log::debug!(
            "Logging initialized. Writing to: {:?} (daily rolling)",
            log_dir.join(LOG_FILE_NAME)
        );
    }

    guard
}
