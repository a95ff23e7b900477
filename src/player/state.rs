//! Player state
//!
//! Contains the observable `PlaybackState` lifecycle and the shared types
//! passed between the player, its renderer, and the input handlers.

use std::fmt;

/// Result of processing an input event.
///
/// Returned by the native host's input handlers to signal control flow
/// decisions to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    /// Continue normal playback/rendering
    Continue,
    /// Exit the player
    Quit,
}

/// Marker information for the progress bar.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPosition {
    /// Playback time when the marker occurs
    pub time: f64,
    /// Marker label (from the cast file)
    pub label: String,
}

/// Externally observable playback lifecycle.
///
/// `Initial -> Loading -> (Waiting) -> Playing <-> Paused`, with `Failed`
/// as the terminal state for a load that could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing started yet
    #[default]
    Initial,
    /// Start requested, source not ready
    Loading,
    /// Loading has outlasted the grace period
    Waiting,
    Playing,
    /// Paused by the user or at the end of a non-looping recording
    Paused,
    /// The source could not be loaded
    Failed,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            PlaybackState::Initial => "ready",
            PlaybackState::Loading => "loading",
            PlaybackState::Waiting => "waiting",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Failed => "failed",
        }
    }

    /// Loading or waiting: a start is in flight.
    pub fn is_pending(self) -> bool {
        matches!(self, PlaybackState::Loading | PlaybackState::Waiting)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-readable timing, refreshed on the time-update cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimersSnapshot {
    pub current_time: f64,
    pub remaining_time: f64,
    /// Fraction played, in `[0, 1]`
    pub progress: f64,
}

/// Everything a control bar needs to draw itself.
#[derive(Debug, Clone, Copy)]
pub struct StatusView<'a> {
    pub state: PlaybackState,
    /// `None` until the first refresh
    pub timers: Option<TimersSnapshot>,
    /// `None` until the source has loaded
    pub duration: Option<f64>,
    pub markers: &'a [MarkerPosition],
    pub speed: f64,
    pub fullscreen: bool,
}

/// Handle returned by [`Observable::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// A value that notifies subscribers when it changes.
///
/// Single-threaded: subscribers run synchronously inside [`Observable::set`].
pub struct Observable<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T: Clone + PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Store `value`; subscribers are notified only if it differs.
    ///
    /// Returns whether the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.value);
        }
        true
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Clone + PartialEq + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
