//! Recording sources and the background loader.
//!
//! A [`Source`] turns something (a file, an in-memory string) into a
//! [`Recording`]. Loading runs on a dedicated thread; the player polls the
//! [`LoadHandle`] from its event loop without blocking.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, warn};

use crate::asciicast::{AsciicastFile, EventType};
use crate::player::error::LoadError;
use crate::player::playback::collect_markers;
use crate::player::state::MarkerPosition;

/// Options handed to a source when playback starts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StartOptions {
    /// Restart from the beginning when the end is reached
    pub loop_playback: bool,
    /// Terminal width override
    pub cols: Option<u16>,
    /// Terminal height override
    pub rows: Option<u16>,
}

/// What the player learns once a source is ready.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartInfo {
    pub cols: u16,
    pub rows: u16,
    pub duration: f64,
}

/// Something the emulator does at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    Output(String),
    Resize(u16, u16),
}

/// An emulator action at an absolute time (seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub time: f64,
    pub action: EventAction,
}

/// A decoded recording ready for playback.
#[derive(Debug, Clone)]
pub struct Recording {
    pub cols: u16,
    pub rows: u16,
    pub duration: f64,
    /// Output and resize events ordered by time
    pub events: Vec<TimedEvent>,
    pub markers: Vec<MarkerPosition>,
}

impl Recording {
    /// Build a recording from a parsed cast, applying the header's idle limit.
    pub fn from_cast(cast: &AsciicastFile) -> Result<Self, LoadError> {
        let cols = cast.header.cols().unwrap_or(80);
        let rows = cast.header.rows().unwrap_or(24);
        if cols == 0 || rows == 0 || cols > u16::MAX as u32 || rows > u16::MAX as u32 {
            return Err(LoadError::InvalidSize { cols, rows });
        }

        let times = cast.absolute_times(cast.header.idle_time_limit);
        let events = cast
            .events
            .iter()
            .zip(times.iter())
            .filter_map(|(event, &time)| {
                let action = match event.event_type {
                    EventType::Output => EventAction::Output(event.data.clone()),
                    EventType::Resize => {
                        let (cols, rows) = event.parse_resize()?;
                        EventAction::Resize(cols, rows)
                    }
                    _ => return None,
                };
                Some(TimedEvent { time, action })
            })
            .collect();

        Ok(Self {
            cols: cols as u16,
            rows: rows as u16,
            duration: times.last().copied().unwrap_or(0.0),
            events,
            markers: collect_markers(cast),
        })
    }

    /// Build a recording from `(absolute time, output)` pairs.
    pub fn from_outputs(cols: u16, rows: u16, outputs: &[(f64, &str)]) -> Self {
        let events: Vec<TimedEvent> = outputs
            .iter()
            .map(|(time, data)| TimedEvent {
                time: *time,
                action: EventAction::Output((*data).to_string()),
            })
            .collect();
        Self {
            cols,
            rows,
            duration: events.last().map(|e| e.time).unwrap_or(0.0),
            events,
            markers: Vec::new(),
        }
    }

    /// Apply user-requested terminal size overrides.
    pub fn with_size_override(mut self, cols: Option<u16>, rows: Option<u16>) -> Self {
        if let Some(cols) = cols.filter(|c| *c > 0) {
            self.cols = cols;
        }
        if let Some(rows) = rows.filter(|r| *r > 0) {
            self.rows = rows;
        }
        self
    }

    pub fn start_info(&self) -> StartInfo {
        StartInfo {
            cols: self.cols,
            rows: self.rows,
            duration: self.duration,
        }
    }
}

/// Produces a recording. Called once, on the loader thread.
pub trait Source: Send {
    fn load(&mut self, options: &StartOptions) -> Result<Recording, LoadError>;
}

/// Loads an asciicast file from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Source for FileSource {
    fn load(&mut self, options: &StartOptions) -> Result<Recording, LoadError> {
        if !self.path.exists() {
            return Err(LoadError::NotFound {
                path: self.path.clone(),
            });
        }
        let cast = AsciicastFile::parse(&self.path).map_err(LoadError::parse)?;
        Ok(Recording::from_cast(&cast)?.with_size_override(options.cols, options.rows))
    }
}

/// Loads an asciicast held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    content: String,
}

impl MemorySource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl Source for MemorySource {
    fn load(&mut self, options: &StartOptions) -> Result<Recording, LoadError> {
        let cast = AsciicastFile::parse_str(&self.content).map_err(LoadError::parse)?;
        Ok(Recording::from_cast(&cast)?.with_size_override(options.cols, options.rows))
    }
}

/// A load running on the loader thread.
///
/// Dropping the handle abandons the load: the thread finishes on its own and
/// its result is discarded.
#[derive(Debug)]
pub struct LoadHandle {
    rx: Receiver<Result<Recording, LoadError>>,
}

impl LoadHandle {
    /// Start loading `source` on a new thread.
    pub fn spawn(mut source: Box<dyn Source>, options: StartOptions) -> Self {
        let (tx, rx) = mpsc::channel();
        let error_tx = tx.clone();

        let spawned = thread::Builder::new()
            .name("castplayer-loader".to_string())
            .spawn(move || {
                let result = source.load(&options);
                // Ignore send errors (the player may have stopped waiting)
                let _ = tx.send(result);
            });

        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn loader thread");
            let _ = error_tx.send(Err(LoadError::Io(e)));
        }
        debug!("loader started");

        Self { rx }
    }

    /// Non-blocking check for the load result.
    pub fn poll(&self) -> Option<Result<Recording, LoadError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Disconnected)),
        }
    }
}
