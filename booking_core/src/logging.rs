//! Logging infrastructure for booksync.
//!
//! Console output always goes through an `EnvFilter`. When the config names
//! log files, two more sinks are attached: a debug log that receives
//! everything this workspace emits, and a failed-bookings log that only
//! receives warnings and errors, i.e. the rows an operator has to look at.

use crate::config::FilesConfig;
use crate::Result;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize console-only logging with a specific default level
///
/// This can still be overridden by RUST_LOG environment variable.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().compact().with_filter(filter))
        .try_init();
}

/// Initialize console logging plus the file sinks named in `files`
///
/// Log files are opened in append mode so consecutive runs accumulate.
pub fn init_with_files(default_level: &str, files: &FilesConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let debug_layer = match &files.debug_log {
        Some(path) => {
            let writer = open_log(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(debug_log_targets()),
            )
        }
        None => None,
    };

    let failed_layer = match &files.failed_bookings_log {
        Some(path) => {
            let writer = open_log(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(failed_bookings_targets()),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().compact().with_filter(filter))
        .with(debug_layer)
        .with(failed_layer)
        .try_init();

    Ok(())
}

/// Debug for this workspace, info for dependencies
fn debug_log_targets() -> Targets {
    Targets::new()
        .with_default(Level::INFO)
        .with_target("booking_core", Level::DEBUG)
        .with_target("booksync", Level::DEBUG)
}

/// Warnings and errors from this workspace only
fn failed_bookings_targets() -> Targets {
    Targets::new()
        .with_target("booking_core", Level::WARN)
        .with_target("booksync", Level::WARN)
}

fn open_log(path: &Path) -> Result<Arc<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Arc::new(file))
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
