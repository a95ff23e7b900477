//! Terminal emulation model consumed by the frame scheduler.
//!
//! The model answers one question per frame: what changed since the last time
//! I was asked? `take_changes` is destructive and needs `&mut self`, so the
//! single owner of a model (the playback clock) is its only consumer.

use std::collections::BTreeMap;

use crate::player::playback::find_event_index_at_time;
use crate::player::source::{EventAction, Recording};
use crate::terminal::{CursorState, StyledLine, TerminalBuffer};

/// Changed rows keyed by row index.
pub type ChangedRows = BTreeMap<usize, StyledLine>;

/// Everything a renderer needs to bring its last paint up to date.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameDelta {
    /// New cursor state, `None` when unchanged since the previous delta
    pub cursor: Option<CursorState>,
    /// New grid size, `None` when unchanged since the previous delta
    pub resized: Option<(usize, usize)>,
    /// Rows whose content changed, and only those
    pub changed_rows: ChangedRows,
}

impl FrameDelta {
    /// True when applying the delta would not change anything.
    pub fn is_empty(&self) -> bool {
        self.cursor.is_none() && self.resized.is_none() && self.changed_rows.is_empty()
    }
}

/// A terminal emulation model that can be driven to a point in time.
pub trait EmulationModel {
    /// Apply all recorded input up to `time` (seconds). Moving backwards replays
    /// from the start.
    fn advance_to(&mut self, time: f64);

    /// Reset to the blank initial screen at time 0. Every row becomes changed.
    fn rewind(&mut self);

    /// Current cursor.
    fn cursor(&self) -> CursorState;

    /// Rows changed since the previous call; marks them clean.
    fn take_changes(&mut self) -> ChangedRows;

    /// Grid size as (cols, rows).
    fn size(&self) -> (usize, usize);

    /// Full grid content, regardless of what is dirty.
    fn snapshot(&self) -> Vec<StyledLine>;
}

/// Emulation model replaying a [`Recording`] through a [`TerminalBuffer`].
#[derive(Debug)]
pub struct CastModel {
    recording: Recording,
    buffer: TerminalBuffer,
    /// Index of the next event to apply
    next_event: usize,
    /// Time the buffer currently reflects
    position: f64,
}

impl CastModel {
    pub fn new(recording: Recording) -> Self {
        let buffer = TerminalBuffer::new(recording.cols as usize, recording.rows as usize);
        Self {
            recording,
            buffer,
            next_event: 0,
            position: 0.0,
        }
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Time (seconds) the grid currently reflects.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn buffer(&self) -> &TerminalBuffer {
        &self.buffer
    }
}

impl EmulationModel for CastModel {
    fn advance_to(&mut self, time: f64) {
        if time < self.position {
            self.rewind();
        }

        let end = find_event_index_at_time(&self.recording.events, time);
        for event in &self.recording.events[self.next_event.min(end)..end] {
            match &event.action {
                EventAction::Output(data) => self.buffer.process(data),
                EventAction::Resize(cols, rows) => {
                    self.buffer.resize(*cols as usize, *rows as usize)
                }
            }
        }
        self.next_event = self.next_event.max(end);
        self.position = time;
    }

    fn rewind(&mut self) {
        self.buffer =
            TerminalBuffer::new(self.recording.cols as usize, self.recording.rows as usize);
        self.next_event = 0;
        self.position = 0.0;
    }

    fn cursor(&self) -> CursorState {
        self.buffer.cursor()
    }

    fn take_changes(&mut self) -> ChangedRows {
        self.buffer
            .take_dirty_rows()
            .into_iter()
            .filter_map(|idx| {
                self.buffer
                    .row(idx)
                    .map(|row| (idx, StyledLine::from_row(row)))
            })
            .collect()
    }

    fn size(&self) -> (usize, usize) {
        (self.buffer.width(), self.buffer.height())
    }

    fn snapshot(&self) -> Vec<StyledLine> {
        self.buffer.styled_lines()
    }
}
