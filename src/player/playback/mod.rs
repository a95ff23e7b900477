//! Playback timing for the player.
//!
//! This module handles the playback clock, seeking, and marker collection.

mod clock;
mod markers;
mod seeking;

pub use clock::{ClockEvent, ClockSnapshot, PlaybackClock};
pub use markers::collect_markers;
pub use seeking::{clamp_seek_target, find_event_index_at_time};
