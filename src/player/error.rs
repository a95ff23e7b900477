//! Player errors.

use std::path::PathBuf;

/// Errors that can occur while loading a recording for playback.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Recording not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse recording: {0}")]
    Parse(String),

    #[error("Recording has an invalid terminal size {cols}x{rows}")]
    InvalidSize { cols: u32, rows: u32 },

    #[error("Loader stopped before the recording was ready")]
    Disconnected,
}

impl LoadError {
    /// Wrap an `anyhow` parse error, keeping its context chain in the message.
    pub fn parse(err: anyhow::Error) -> Self {
        Self::Parse(format!("{:#}", err))
    }
}
