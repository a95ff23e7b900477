//! castplayer: real-time asciicast playback with incremental rendering.
//!
//! The [`player`] module holds the playback engine (clock, frame
//! scheduler, layout engine, state machine) and the crossterm host. The
//! [`terminal`] emulator and the [`asciicast`] decoder feed it.

pub mod asciicast;
pub mod cli;
pub mod config;
pub mod logging;
pub mod player;
pub mod terminal;

pub use config::Config;
pub use player::{Player, PlayerOptions, PlaybackState};
