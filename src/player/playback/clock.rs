//! Playback clock.
//!
//! Owns the elapsed playback time and the emulation model it drives. Host
//! time is passed in as `now` (time since the player's epoch) so the clock
//! never reads a wall clock itself.

use std::time::Duration;

use tracing::{debug, info};

use super::seeking::clamp_seek_target;
use crate::player::error::LoadError;
use crate::player::model::{CastModel, EmulationModel};
use crate::player::source::{LoadHandle, Source, StartInfo, StartOptions};
use crate::player::state::MarkerPosition;

/// Something the clock noticed while advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Reached the end with looping disabled; the clock has stopped
    Finished,
    /// Reached the end with looping enabled; time wrapped to 0
    Looped,
}

/// Read-only view of the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSnapshot {
    pub elapsed_time: f64,
    /// Unknown until the source has loaded
    pub duration: Option<f64>,
    pub is_playing: bool,
}

#[derive(Debug)]
pub struct PlaybackClock {
    loader: Option<LoadHandle>,
    model: Option<CastModel>,
    duration: Option<f64>,
    loop_playback: bool,
    speed: f64,
    /// Playback time reached before the current run began
    base_time: f64,
    /// Host time the current run began; `None` while not advancing
    running_since: Option<Duration>,
    finished: bool,
}

impl PlaybackClock {
    pub fn new(speed: f64) -> Self {
        Self {
            loader: None,
            model: None,
            duration: None,
            loop_playback: false,
            speed: sanitize_speed(speed),
            base_time: 0.0,
            running_since: None,
            finished: false,
        }
    }

    /// Begin loading `source` in the background. Returns immediately.
    ///
    /// Any previous load or model is dropped first.
    pub fn start(&mut self, source: Box<dyn Source>, options: StartOptions) {
        self.stop();
        self.loop_playback = options.loop_playback;
        self.base_time = 0.0;
        self.finished = false;
        self.duration = None;
        self.loader = Some(LoadHandle::spawn(source, options));
    }

    /// Check whether the pending load has resolved.
    ///
    /// On success playback begins at time 0 as of `now`. Returns `None` while
    /// the load is still running or when nothing is loading.
    pub fn poll_start(&mut self, now: Duration) -> Option<Result<StartInfo, LoadError>> {
        let result = self.loader.as_ref()?.poll()?;
        self.loader = None;

        match result {
            Ok(recording) => {
                let info = recording.start_info();
                info!(
                    cols = info.cols,
                    rows = info.rows,
                    duration = info.duration,
                    events = recording.events.len(),
                    "recording loaded"
                );
                self.model = Some(CastModel::new(recording));
                self.duration = Some(info.duration);
                self.base_time = 0.0;
                self.finished = false;
                self.running_since = Some(now);
                Some(Ok(info))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Toggle between advancing and paused. Returns whether the clock is now playing.
    ///
    /// Resuming a finished clock restarts from the beginning.
    pub fn pause_or_resume(&mut self, now: Duration) -> bool {
        if self.model.is_none() {
            return false;
        }

        if self.running_since.is_some() {
            self.base_time = self.current_time(now);
            self.running_since = None;
            debug!(time = self.base_time, "clock paused");
            return false;
        }

        let at_end = self.duration.is_some_and(|d| self.base_time >= d);
        if self.finished || at_end {
            self.base_time = 0.0;
            self.finished = false;
            if let Some(model) = self.model.as_mut() {
                model.rewind();
            }
        }
        self.running_since = Some(now);
        debug!(time = self.base_time, "clock resumed");
        true
    }

    /// Halt advancement, drop the model and abandon any pending load.
    pub fn stop(&mut self) {
        if self.loader.take().is_some() {
            debug!("pending load abandoned");
        }
        self.model = None;
        self.running_since = None;
    }

    /// Advance the model to the current time.
    pub fn tick(&mut self, now: Duration) -> Option<ClockEvent> {
        self.running_since?;
        let duration = self.duration?;
        let time = self.raw_time(now);

        if time < duration {
            if let Some(model) = self.model.as_mut() {
                model.advance_to(time);
            }
            return None;
        }

        // A zero-length recording would loop on every tick
        if self.loop_playback && duration > 0.0 {
            self.base_time = 0.0;
            self.running_since = Some(now);
            if let Some(model) = self.model.as_mut() {
                model.rewind();
                model.advance_to(0.0);
            }
            debug!("playback looped");
            return Some(ClockEvent::Looped);
        }

        if let Some(model) = self.model.as_mut() {
            model.advance_to(duration);
        }
        self.base_time = duration;
        self.running_since = None;
        self.finished = true;
        info!(duration, "playback finished");
        Some(ClockEvent::Finished)
    }

    /// Move playback to `time`, clamped to the recording.
    pub fn seek(&mut self, now: Duration, time: f64) {
        let (Some(model), Some(duration)) = (self.model.as_mut(), self.duration) else {
            return;
        };
        let target = clamp_seek_target(time, duration);
        model.advance_to(target);
        self.base_time = target;
        self.finished = false;
        if self.running_since.is_some() {
            self.running_since = Some(now);
        }
        debug!(target, "clock seeked");
    }

    /// Current playback time, clamped to the duration.
    pub fn current_time(&self, now: Duration) -> f64 {
        let time = self.raw_time(now);
        match self.duration {
            Some(duration) => time.min(duration),
            None => time,
        }
    }

    pub fn remaining_time(&self, now: Duration) -> f64 {
        self.duration
            .map(|d| (d - self.current_time(now)).max(0.0))
            .unwrap_or(0.0)
    }

    /// Fraction of the recording played, in `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f64 {
        match self.duration {
            Some(d) if d > 0.0 => (self.current_time(now) / d).clamp(0.0, 1.0),
            Some(_) if self.finished => 1.0,
            _ => 0.0,
        }
    }

    pub fn snapshot(&self, now: Duration) -> ClockSnapshot {
        ClockSnapshot {
            elapsed_time: self.current_time(now),
            duration: self.duration,
            is_playing: self.is_playing(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, now: Duration, speed: f64) {
        // Fold elapsed time at the old speed into the base first
        if self.running_since.is_some() {
            self.base_time = self.current_time(now);
            self.running_since = Some(now);
        }
        self.speed = sanitize_speed(speed);
    }

    pub fn markers(&self) -> &[MarkerPosition] {
        self.model
            .as_ref()
            .map(|m| m.recording().markers.as_slice())
            .unwrap_or(&[])
    }

    /// The emulation model, once loaded. The clock is its only owner.
    pub fn model_mut(&mut self) -> Option<&mut CastModel> {
        self.model.as_mut()
    }

    pub fn model(&self) -> Option<&CastModel> {
        self.model.as_ref()
    }

    fn raw_time(&self, now: Duration) -> f64 {
        match self.running_since {
            Some(since) => {
                self.base_time + now.saturating_sub(since).as_secs_f64() * self.speed
            }
            None => self.base_time,
        }
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        1.0
    }
}
