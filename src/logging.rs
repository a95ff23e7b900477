//! Diagnostic logging setup.
//!
//! Logging is off unless `CASTPLAYER_LOG` holds a filter (`debug`,
//! `castplayer=trace`, ...). Output goes to a file because the terminal
//! belongs to the player.

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CASTPLAYER_LOG";

/// Environment variable overriding the log file location.
pub const LOG_FILE_ENV: &str = "CASTPLAYER_LOG_FILE";

/// Where logs go when [`LOG_FILE_ENV`] is unset.
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("castplayer")
        .join("castplayer.log")
}

/// Install the global subscriber if logging was requested.
///
/// Returns the log file path when logging is active.
pub fn init_logging() -> Result<Option<PathBuf>> {
    let Ok(directives) = std::env::var(LOG_ENV) else {
        return Ok(None);
    };
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid {} filter: {}", LOG_ENV, directives))?;

    let path = std::env::var_os(LOG_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    if install(filter, file) {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    }
    Ok(Some(path))
}

/// Install the file subscriber. Returns false when one is already installed,
/// in which case the existing subscriber is kept.
fn install(filter: EnvFilter, file: File) -> bool {
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "log subscriber already installed, keeping it");
            false
        }
    }
}
