//! Configuration file handling.
//!
//! The config lives at `<config dir>/castplayer/config.toml`. Every field is
//! optional in the file; missing ones take their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::player::layout::SizePolicy;
use crate::player::scheduler::Cadence;
use crate::player::PlayerOptions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine the user config directory")]
    NoConfigDir,

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub playback: PlaybackConfig,
    pub timing: TimingConfig,
}

/// `[playback]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Restart when the recording ends
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    /// Playback speed multiplier
    pub speed: f64,
    /// Sizing policy; absent means fixed size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizePolicy>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            loop_playback: false,
            speed: 1.0,
            size: None,
        }
    }
}

/// `[timing]` section, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Load time after which the player shows `waiting`
    pub grace_period_ms: u64,
    pub time_update_ms: u64,
    pub blink_ms: u64,
    pub frame_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 1000,
            time_update_ms: 100,
            blink_ms: 500,
            frame_interval_ms: 16,
        }
    }
}

impl TimingConfig {
    pub fn cadence(&self) -> Cadence {
        Cadence {
            frame: Duration::from_millis(self.frame_interval_ms),
            time_update: Duration::from_millis(self.time_update_ms),
            blink: Duration::from_millis(self.blink_ms),
        }
    }
}

impl Config {
    /// Default config file location.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("castplayer").join("config.toml"))
    }

    /// Load from the default location; a missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, content).map_err(write_err)
    }

    /// Player options from this config. CLI flags are applied on top by the caller.
    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions {
            loop_playback: self.playback.loop_playback,
            cols: None,
            rows: None,
            size_policy: self.playback.size,
            speed: self.playback.speed,
            grace_period: Duration::from_millis(self.timing.grace_period_ms),
            cadence: self.timing.cadence(),
        }
    }
}
