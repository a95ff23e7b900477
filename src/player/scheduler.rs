//! Cooperative timers and the frame scheduler.
//!
//! Everything here runs on the player's thread. The host calls
//! [`Timers::pop_due`] (through the player) and dispatches each due [`Task`];
//! nothing fires on its own.

use std::time::Duration;

use tracing::trace;

use crate::player::model::{EmulationModel, FrameDelta};
use crate::terminal::CursorState;

/// Handle to an armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// One frame: pull a delta from the model and paint it
    Frame,
    /// Refresh the human-readable timers
    TimeUpdate,
    /// Toggle cursor blink
    Blink,
    /// Loading has taken longer than the grace period
    LoadGrace,
}

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    task: Task,
    due: Duration,
    /// Re-arm period for intervals; `None` for one-shots
    period: Option<Duration>,
}

/// Single-threaded timer queue keyed by host time.
#[derive(Debug, Default)]
pub struct Timers {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `task` once, `delay` after `now`.
    pub fn set_timeout(&mut self, now: Duration, delay: Duration, task: Task) -> TimerId {
        self.insert(now + delay, None, task)
    }

    /// Fire `task` every `period`, first at `now + period`.
    pub fn set_interval(&mut self, now: Duration, period: Duration, task: Task) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(now + period, Some(period), task)
    }

    /// Arm a one-shot frame tick.
    pub fn request_frame(&mut self, now: Duration, interval: Duration) -> TimerId {
        self.set_timeout(now, interval, Task::Frame)
    }

    /// Disarm a timer. Returns false if it had already fired or been cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    /// Earliest deadline, if anything is armed.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Take the earliest timer due at or before `now`.
    ///
    /// One-shots are removed; intervals are re-armed one period later (or one
    /// period after `now` if they fell behind, so a stall never causes a burst).
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, Task)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.id))
            .map(|(idx, _)| idx)?;

        let entry = &mut self.entries[idx];
        let fired = (entry.id, entry.task);
        match entry.period {
            Some(period) => {
                let next = entry.due + period;
                entry.due = if next <= now { now + period } else { next };
            }
            None => {
                self.entries.swap_remove(idx);
            }
        }
        trace!(task = ?fired.1, "timer fired");
        Some(fired)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn insert(&mut self, due: Duration, period: Option<Duration>, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            task,
            due,
            period,
        });
        id
    }
}

/// Frame, time-update and blink cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub frame: Duration,
    pub time_update: Duration,
    pub blink: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            frame: Duration::from_millis(16),
            time_update: Duration::from_millis(100),
            blink: Duration::from_millis(500),
        }
    }
}

/// The three periodic activities that run while playing.
///
/// They are started and stopped together; the scheduler keeps their handles
/// so stopping never leaves one armed.
#[derive(Debug)]
pub struct FrameScheduler {
    cadence: Cadence,
    frame: Option<TimerId>,
    time_update: Option<TimerId>,
    blink: Option<TimerId>,
    blink_visible: bool,
    last_cursor: Option<CursorState>,
    last_size: Option<(usize, usize)>,
}

impl FrameScheduler {
    pub fn new(cadence: Cadence) -> Self {
        // A zero frame interval would spin run_due forever
        let cadence = Cadence {
            frame: cadence.frame.max(Duration::from_millis(1)),
            ..cadence
        };
        Self {
            cadence,
            frame: None,
            time_update: None,
            blink: None,
            blink_visible: true,
            last_cursor: None,
            last_size: None,
        }
    }

    /// Arm the frame tick (immediately due) and both intervals.
    ///
    /// Any handles from a previous start are cancelled first.
    pub fn start(&mut self, timers: &mut Timers, now: Duration) {
        self.stop(timers);
        self.frame = Some(timers.request_frame(now, Duration::ZERO));
        self.time_update = Some(timers.set_interval(now, self.cadence.time_update, Task::TimeUpdate));
        self.blink = Some(timers.set_interval(now, self.cadence.blink, Task::Blink));
    }

    /// Cancel all three activities and reset blink to visible.
    pub fn stop(&mut self, timers: &mut Timers) {
        for id in [self.frame.take(), self.time_update.take(), self.blink.take()]
            .into_iter()
            .flatten()
        {
            timers.cancel(id);
        }
        self.blink_visible = true;
    }

    /// Request the next frame tick. Called at the top of every tick.
    pub fn rearm(&mut self, timers: &mut Timers, now: Duration) {
        if let Some(old) = self.frame.take() {
            timers.cancel(old);
        }
        self.frame = Some(timers.request_frame(now, self.cadence.frame));
    }

    pub fn toggle_blink(&mut self) -> bool {
        self.blink_visible = !self.blink_visible;
        self.blink_visible
    }

    pub fn blink_visible(&self) -> bool {
        self.blink_visible
    }

    /// True if any of the three activities is armed.
    pub fn is_running(&self, timers: &Timers) -> bool {
        self.active_count(timers) > 0
    }

    /// How many of the three activities are armed.
    pub fn active_count(&self, timers: &Timers) -> usize {
        [self.frame, self.time_update, self.blink]
            .into_iter()
            .flatten()
            .filter(|id| timers.is_active(*id))
            .count()
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Pull what changed from the model since the previous delta.
    pub fn collect_delta(&mut self, model: &mut dyn EmulationModel) -> FrameDelta {
        let changed_rows = model.take_changes();

        let size = model.size();
        let resized = (self.last_size != Some(size)).then_some(size);
        self.last_size = Some(size);

        let cursor = model.cursor();
        let cursor = (self.last_cursor != Some(cursor)).then_some(cursor);
        if cursor.is_some() {
            self.last_cursor = cursor;
        }

        FrameDelta {
            cursor,
            resized,
            changed_rows,
        }
    }

    /// Forget the last reported cursor and size so the next delta carries both.
    pub fn reset_tracking(&mut self) {
        self.last_cursor = None;
        self.last_size = None;
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(Cadence::default())
    }
}
