//! The player: wires clock, scheduler, layout and state together.
//!
//! A [`Player`] is driven by its host. The host forwards user actions and
//! container changes, and calls [`Player::run_due`] whenever the next
//! deadline passes (or at least every few tens of milliseconds while a load
//! is pending). All callbacks into the renderer happen inside those calls.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::player::error::LoadError;
use crate::player::input::PlayerAction;
use crate::player::layout::{GeometryTracker, LayoutCache, LayoutResult, SizePolicy, SurfaceMetrics};
use crate::player::model::FrameDelta;
use crate::player::playback::{ClockEvent, PlaybackClock};
use crate::player::scheduler::{Cadence, FrameScheduler, Task, TimerId, Timers};
use crate::player::source::{Source, StartOptions};
use crate::player::state::{
    Observable, PlaybackState, StatusView, SubscriptionId, TimersSnapshot,
};

/// Paints what the player tells it to. Receives deltas only.
pub trait Renderer {
    /// Apply the rows and cursor that changed since the previous frame.
    fn apply_frame(&mut self, delta: &FrameDelta) -> Result<()>;

    /// Apply a new surface scale and size.
    fn apply_layout(&mut self, layout: &LayoutResult) -> Result<()>;

    fn set_blink(&mut self, visible: bool) -> Result<()>;

    /// Refresh controls (progress, time, state). Optional.
    fn update_status(&mut self, _status: &StatusView<'_>) -> Result<()> {
        Ok(())
    }
}

/// How a player is set up.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOptions {
    pub loop_playback: bool,
    /// Terminal size overrides; they also size the measurement grid
    pub cols: Option<u16>,
    pub rows: Option<u16>,
    /// `None` means fixed size
    pub size_policy: Option<SizePolicy>,
    pub speed: f64,
    /// How long a load may take before the state turns to `Waiting`
    pub grace_period: Duration,
    pub cadence: Cadence,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            loop_playback: false,
            cols: None,
            rows: None,
            size_policy: None,
            speed: 1.0,
            grace_period: Duration::from_millis(1000),
            cadence: Cadence::default(),
        }
    }
}

pub struct Player<R: Renderer> {
    renderer: R,
    options: PlayerOptions,
    source: Option<Box<dyn Source>>,
    state: Observable<PlaybackState>,
    clock: PlaybackClock,
    timers: Timers,
    scheduler: FrameScheduler,
    grace_timer: Option<TimerId>,
    geometry: GeometryTracker,
    layout_cache: LayoutCache,
    applied_layout: Option<LayoutResult>,
    /// Grid used for layout: overrides, then the recording's size once loaded
    grid: (u16, u16),
    fullscreen: bool,
    timers_snapshot: Option<TimersSnapshot>,
    on_finish: Option<Box<dyn FnMut()>>,
    load_error: Option<LoadError>,
}

impl<R: Renderer> Player<R> {
    pub fn new(source: Box<dyn Source>, renderer: R, options: PlayerOptions) -> Self {
        let geometry = GeometryTracker::new(options.cols, options.rows);
        let grid = (
            options.cols.filter(|c| *c > 0).unwrap_or(80),
            options.rows.filter(|r| *r > 0).unwrap_or(24),
        );
        Self {
            renderer,
            clock: PlaybackClock::new(options.speed),
            scheduler: FrameScheduler::new(options.cadence),
            options,
            source: Some(source),
            state: Observable::new(PlaybackState::Initial),
            timers: Timers::new(),
            grace_timer: None,
            geometry,
            layout_cache: LayoutCache::new(),
            applied_layout: None,
            grid,
            fullscreen: false,
            timers_snapshot: None,
            on_finish: None,
            load_error: None,
        }
    }

    /// Called once per natural end of a non-looping recording.
    pub fn on_finish(&mut self, callback: impl FnMut() + 'static) {
        self.on_finish = Some(Box::new(callback));
    }

    pub fn subscribe_state(
        &mut self,
        subscriber: impl FnMut(&PlaybackState) + 'static,
    ) -> SubscriptionId {
        self.state.subscribe(subscriber)
    }

    pub fn unsubscribe_state(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    // Host signals

    /// The surface has been laid out and can be measured.
    pub fn mount(&mut self, surface: SurfaceMetrics, container_width: f64, container_height: f64) {
        self.geometry.mount(surface, container_width, container_height);
        debug!(measured = self.geometry.is_measured(), "surface mounted");
        self.refresh_layout();
    }

    /// The container changed size; re-measure it.
    pub fn resize_container(&mut self, width: f64, height: f64) {
        self.geometry.resize(width, height);
        self.refresh_layout();
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        if self.fullscreen == fullscreen {
            return;
        }
        self.fullscreen = fullscreen;
        self.refresh_layout();
        self.push_status();
    }

    pub fn toggle_fullscreen(&mut self) {
        self.set_fullscreen(!self.fullscreen);
    }

    // User actions

    /// Start playback from `Initial`, or resume from `Paused`.
    pub fn play(&mut self, now: Duration) {
        match self.state.get() {
            PlaybackState::Initial => self.begin_loading(now),
            PlaybackState::Paused => {
                self.pause_or_resume(now);
            }
            _ => {}
        }
    }

    /// Toggle play/pause. Returns whether the player is playing afterwards.
    ///
    /// From `Initial` this starts loading; while loading or failed it does nothing.
    pub fn pause_or_resume(&mut self, now: Duration) -> bool {
        match self.state.get() {
            PlaybackState::Initial => {
                self.begin_loading(now);
                false
            }
            PlaybackState::Playing => {
                // Bring the grid up to the pause instant, which may be past the end
                let event = self.clock.tick(now);
                self.render_frame();
                if event == Some(ClockEvent::Finished) {
                    self.finish(now);
                    return false;
                }
                self.clock.pause_or_resume(now);
                self.leave_playing(now, PlaybackState::Paused);
                false
            }
            PlaybackState::Paused => {
                if self.clock.pause_or_resume(now) {
                    self.enter_playing(now);
                    true
                } else {
                    false
                }
            }
            PlaybackState::Loading | PlaybackState::Waiting | PlaybackState::Failed => false,
        }
    }

    /// Jump to `time` seconds. Ignored until the recording has loaded.
    pub fn seek(&mut self, now: Duration, time: f64) {
        if self.clock.model().is_none() {
            return;
        }
        self.clock.seek(now, time);
        // Paint right away; a paused player has no frame tick to do it
        self.render_frame();
        self.refresh_timers(now);
        self.push_status();
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, now: Duration, offset: f64) {
        let target = self.clock.current_time(now) + offset;
        self.seek(now, target);
    }

    pub fn handle_action(&mut self, action: PlayerAction, now: Duration) {
        match action {
            PlayerAction::TogglePlay => {
                self.pause_or_resume(now);
            }
            PlayerAction::ToggleFullscreen => self.toggle_fullscreen(),
        }
    }

    // Scheduling

    /// Run everything due at `now`: a resolved load, then due timers in
    /// deadline order.
    pub fn run_due(&mut self, now: Duration) {
        self.poll_load(now);
        while let Some((_, task)) = self.timers.pop_due(now) {
            self.dispatch(task, now);
        }
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// Stop everything and release the source. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.scheduler.stop(&mut self.timers);
        if let Some(id) = self.grace_timer.take() {
            self.timers.cancel(id);
        }
        self.timers.clear();
        self.clock.stop();
    }

    // Reads

    pub fn state(&self) -> PlaybackState {
        self.state.get()
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn timers_snapshot(&self) -> Option<TimersSnapshot> {
        self.timers_snapshot
    }

    pub fn blink_visible(&self) -> bool {
        self.scheduler.blink_visible()
    }

    /// Layout last pushed to the renderer.
    pub fn layout(&self) -> Option<LayoutResult> {
        self.applied_layout
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn grid(&self) -> (u16, u16) {
        self.grid
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    /// How many of frame tick, time update and blink are armed.
    pub fn active_periodic_count(&self) -> usize {
        self.scheduler.active_count(&self.timers)
    }

    /// Every armed timer, periodic or not.
    pub fn armed_timer_count(&self) -> usize {
        self.timers.active_count()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn begin_loading(&mut self, now: Duration) {
        let Some(source) = self.source.take() else {
            warn!("no source to load");
            return;
        };
        let options = StartOptions {
            loop_playback: self.options.loop_playback,
            cols: self.options.cols,
            rows: self.options.rows,
        };
        self.clock.start(source, options);
        self.grace_timer = Some(
            self.timers
                .set_timeout(now, self.options.grace_period, Task::LoadGrace),
        );
        self.set_state(PlaybackState::Loading);
    }

    fn poll_load(&mut self, now: Duration) {
        if !self.state.get().is_pending() {
            return;
        }
        let Some(result) = self.clock.poll_start(now) else {
            return;
        };
        if let Some(id) = self.grace_timer.take() {
            self.timers.cancel(id);
        }

        match result {
            Ok(info) => {
                self.grid = (info.cols, info.rows);
                self.scheduler.reset_tracking();
                self.refresh_layout();
                self.enter_playing(now);
            }
            Err(e) => {
                warn!(error = %e, "failed to load recording");
                self.clock.stop();
                self.load_error = Some(e);
                self.set_state(PlaybackState::Failed);
            }
        }
    }

    fn dispatch(&mut self, task: Task, now: Duration) {
        match task {
            Task::Frame => self.frame_tick(now),
            Task::TimeUpdate => {
                self.refresh_timers(now);
                self.push_status();
            }
            Task::Blink => {
                let visible = self.scheduler.toggle_blink();
                if let Err(e) = self.renderer.set_blink(visible) {
                    warn!(error = %e, "blink update failed");
                }
            }
            Task::LoadGrace => {
                self.grace_timer = None;
                if self.state.get() == PlaybackState::Loading {
                    info!("load is taking a while");
                    self.set_state(PlaybackState::Waiting);
                }
            }
        }
    }

    fn frame_tick(&mut self, now: Duration) {
        // Re-arm first so a failing render never ends the loop
        self.scheduler.rearm(&mut self.timers, now);

        let event = self.clock.tick(now);
        self.render_frame();

        match event {
            Some(ClockEvent::Finished) => self.finish(now),
            Some(ClockEvent::Looped) => debug!("looping"),
            None => {}
        }
    }

    fn render_frame(&mut self) {
        let Some(model) = self.clock.model_mut() else {
            return;
        };
        let delta = self.scheduler.collect_delta(model);
        if delta.is_empty() {
            return;
        }

        if let Some((cols, rows)) = delta.resized {
            let grid = (cols as u16, rows as u16);
            if grid != self.grid {
                self.grid = grid;
                self.refresh_layout();
            }
        }

        if let Err(e) = self.renderer.apply_frame(&delta) {
            warn!(error = %e, rows = delta.changed_rows.len(), "frame render failed");
        }
    }

    /// Natural end of a non-looping recording.
    fn finish(&mut self, now: Duration) {
        self.leave_playing(now, PlaybackState::Paused);
        if let Some(callback) = self.on_finish.as_mut() {
            callback();
        }
    }

    fn enter_playing(&mut self, now: Duration) {
        self.scheduler.start(&mut self.timers, now);
        self.set_state(PlaybackState::Playing);
    }

    fn leave_playing(&mut self, now: Duration, next: PlaybackState) {
        self.scheduler.stop(&mut self.timers);
        if let Err(e) = self.renderer.set_blink(true) {
            warn!(error = %e, "blink reset failed");
        }
        // Final refresh so the displayed time matches where playback stopped
        self.refresh_timers(now);
        self.set_state(next);
    }

    fn set_state(&mut self, next: PlaybackState) {
        if self.state.set(next) {
            debug!(state = %next, "state changed");
            self.push_status();
        }
    }

    fn refresh_timers(&mut self, now: Duration) {
        self.timers_snapshot = Some(TimersSnapshot {
            current_time: self.clock.current_time(now),
            remaining_time: self.clock.remaining_time(now),
            progress: self.clock.progress(now),
        });
    }

    fn refresh_layout(&mut self) {
        let layout = self.layout_cache.get(
            self.geometry.geometry(),
            self.grid.0,
            self.grid.1,
            self.options.size_policy,
            self.fullscreen,
        );
        let Some(layout) = layout else {
            return;
        };
        if self.applied_layout == Some(layout) {
            return;
        }
        self.applied_layout = Some(layout);
        if let Err(e) = self.renderer.apply_layout(&layout) {
            warn!(error = %e, "layout update failed");
        }
    }

    fn push_status(&mut self) {
        let view = StatusView {
            state: self.state.get(),
            timers: self.timers_snapshot,
            duration: self.clock.duration(),
            markers: self.clock.markers(),
            speed: self.clock.speed(),
            fullscreen: self.fullscreen,
        };
        if let Err(e) = self.renderer.update_status(&view) {
            warn!(error = %e, "status update failed");
        }
    }
}

impl<R: Renderer> Drop for Player<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<R: Renderer> std::fmt::Debug for Player<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.state.get())
            .field("grid", &self.grid)
            .field("fullscreen", &self.fullscreen)
            .field("armed_timers", &self.timers.active_count())
            .finish()
    }
}
