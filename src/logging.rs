//! Tracing subscriber setup shared by both binaries
//!
//! Logs go to a file in the data directory so stdout stays reserved for the
//! report itself.

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::LoggingConfig;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "HELMFILE_AUDIT_LOG";

const LOG_FILE_NAME: &str = "helmfile-audit.log";

/// Install the global subscriber.
///
/// The returned guard flushes the non-blocking writer on drop and must be
/// held until the process exits.
pub fn init(config: &LoggingConfig, log_dir: &Path, verbose: bool) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
    if config.json {
        layers.push(file_layer.json().boxed());
    } else {
        layers.push(file_layer.boxed());
    }
    if verbose {
        layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(build_filter(config, verbose))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn build_filter(config: &LoggingConfig, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { config.level.as_str() };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}
