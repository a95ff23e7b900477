//! Command line interface definition.
//!
//! Kept in the library so the xtask man-page generator can reuse it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::player::layout::SizePolicy;
use crate::player::PlayerOptions;

#[derive(Debug, Parser)]
#[command(
    name = "castplayer",
    version,
    about = "Play asciicast terminal recordings in real time",
    long_about = "Play asciicast (v2 and v3) terminal recordings in your terminal.\n\n\
                  Keys while playing: space play/pause, f fullscreen, \
                  left/right seek 5s, q quit."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play a recording
    Play(PlayArgs),

    /// Show information about a recording
    Info {
        /// Path to the .cast file
        file: PathBuf,
    },

    /// Inspect the configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// Path to the .cast file
    pub file: PathBuf,

    /// Restart from the beginning when the recording ends
    #[arg(long = "loop")]
    pub loop_playback: bool,

    /// How the recording is sized against the terminal
    #[arg(long, value_enum)]
    pub size: Option<SizePolicy>,

    /// Override the recording's terminal width
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub cols: Option<u16>,

    /// Override the recording's terminal height
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub rows: Option<u16>,

    /// Playback speed multiplier
    #[arg(long, value_parser = parse_speed)]
    pub speed: Option<f64>,
}

impl PlayArgs {
    /// Player options: config values with these flags on top.
    pub fn player_options(&self, config: &Config) -> PlayerOptions {
        let mut options = config.player_options();
        options.loop_playback |= self.loop_playback;
        options.cols = self.cols;
        options.rows = self.rows;
        if self.size.is_some() {
            options.size_policy = self.size;
        }
        if let Some(speed) = self.speed {
            options.speed = speed;
        }
        options
    }
}

fn parse_speed(value: &str) -> Result<f64, String> {
    let speed: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err("speed must be greater than 0".to_string())
    }
}
