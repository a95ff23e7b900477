//! Asciicast playback engine and native player.
//!
//! # Architecture
//!
//! The engine is organized into submodules:
//! - `model`: the emulation model interface and the cast-backed model
//! - `playback/`: playback clock, seeking, marker collection
//! - `scheduler`: cooperative timers and the frame scheduler
//! - `layout`: surface scale and size under the sizing policies
//! - `state`: the observable playback lifecycle and shared types
//! - `controller`: the `Player` that ties the above together
//! - `source`: recording sources and the background loader
//! - `input/`, `render/`, `native`: the crossterm host
//!
//! # Usage
//!
//! ```no_run
//! use castplayer::player::{play_session, PlayerOptions};
//! use std::path::Path;
//!
//! let outcome = play_session(Path::new("session.cast"), PlayerOptions::default()).unwrap();
//! if let Some(error) = outcome.load_error {
//!     eprintln!("Error: {}", error);
//! }
//! ```

pub mod controller;
pub mod error;
pub mod input;
pub mod layout;
pub mod model;
mod native;
pub mod playback;
pub mod render;
pub mod scheduler;
pub mod source;
pub mod state;

pub use controller::{Player, PlayerOptions, Renderer};
pub use error::LoadError;
pub use input::{map_key, PlayerAction};
pub use layout::{
    compute_layout, CellMetrics, Geometry, GeometryTracker, LayoutCache, LayoutResult,
    SizePolicy, SurfaceMetrics,
};
pub use model::{CastModel, ChangedRows, EmulationModel, FrameDelta};
pub use native::{play_session, SessionOutcome, TerminalRenderer};
pub use playback::{ClockEvent, ClockSnapshot, PlaybackClock};
pub use scheduler::{Cadence, FrameScheduler, Task, TimerId, Timers};
pub use source::{FileSource, MemorySource, Recording, Source, StartInfo, StartOptions};
pub use state::{
    InputResult, MarkerPosition, Observable, PlaybackState, StatusView, TimersSnapshot,
};
