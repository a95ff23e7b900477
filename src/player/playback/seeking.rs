//! Event lookup by playback time.

use crate::player::source::TimedEvent;

/// Number of events at or before `time`.
///
/// Equivalently, the index of the first event still in the future. Events
/// must be sorted by time.
pub fn find_event_index_at_time(events: &[TimedEvent], time: f64) -> usize {
    events.partition_point(|event| event.time <= time)
}

/// Clamp a seek target into `[0, duration]`.
pub fn clamp_seek_target(target: f64, duration: f64) -> f64 {
    if target.is_nan() {
        return 0.0;
    }
    target.clamp(0.0, duration.max(0.0))
}
