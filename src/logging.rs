//! Tracing setup for the dbdrive binary.
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to this
//! crate only and everything else, sqlx statement logging included, stays at
//! `warn`.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::{DriveError, Result};

/// Parse a configured level name such as `info` or `warning`.
fn level_filter(level: &str) -> Result<LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "warning" => Ok(LevelFilter::WARN),
        other => other
            .parse()
            .map_err(|_| DriveError::Config(format!("logging.level: unknown level '{level}'"))),
    }
}

/// Filter for the given level, unless `RUST_LOG` overrides it.
fn drive_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.to_string().to_ascii_lowercase();
        EnvFilter::new(format!("warn,{}={level}", env!("CARGO_CRATE_NAME")))
    })
}

/// Install a subscriber that logs to stdout and appends to `logging.file`.
pub fn init(config: &Config) -> Result<()> {
    let level = level_filter(&config.logging.level)?;
    let file_err =
        |e: std::io::Error| DriveError::Config(format!("log file {}: {e}", config.logging.file));

    if let Some(dir) = Path::new(&config.logging.file).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(file_err)?;
        }
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.logging.file)
        .map_err(file_err)?;

    tracing_subscriber::registry()
        .with(drive_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(Arc::new(log_file)))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| DriveError::Config(format!("logging: {e}")))?;

    debug!(
        "Logging for tree {} of {} to {}",
        config.drive.tree_id, config.drive.relation, config.logging.file
    );
    Ok(())
}

/// Stdout-only fallback. Unknown level names fall back to `info`.
pub fn init_console_only(level: &str) {
    let level = level_filter(level).unwrap_or(LevelFilter::INFO);

    // A subscriber may already be installed; keep it.
    let _ = tracing_subscriber::registry()
        .with(drive_filter(level))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
