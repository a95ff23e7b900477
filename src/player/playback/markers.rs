//! Marker collection for the progress bar.
//!
//! Markers are annotation events in the cast file. Their positions use the
//! same idle-capped timeline as playback so the bar lines up with the clock.

use crate::asciicast::AsciicastFile;
use crate::player::state::MarkerPosition;

/// Collect markers with their absolute playback times, sorted by time.
pub fn collect_markers(cast: &AsciicastFile) -> Vec<MarkerPosition> {
    let times = cast.absolute_times(cast.header.idle_time_limit);

    cast.events
        .iter()
        .zip(times)
        .filter(|(event, _)| event.is_marker())
        .map(|(event, time)| MarkerPosition {
            time,
            label: event.data.clone(),
        })
        .collect()
}
