//! Native terminal host for the player.
//!
//! Draws the recording into the current terminal with crossterm and drives
//! the [`Player`] from a poll loop. One terminal cell counts as one layout
//! "pixel", so cell metrics measure as 1x1 and the layout box is cropped to
//! whole cells.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::style::Print;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::{debug, info, warn};

use crate::player::controller::{Player, PlayerOptions, Renderer};
use crate::player::input::{handle_event, ProgressBarArea};
use crate::player::layout::{LayoutResult, SurfaceMetrics, DEFAULT_GRID};
use crate::player::model::FrameDelta;
use crate::player::render::{bar_width, render_line, render_progress_bar, render_status_line};
use crate::player::source::FileSource;
use crate::player::state::{
    InputResult, MarkerPosition, PlaybackState, StatusView, TimersSnapshot,
};
use crate::terminal::{CursorState, StyledLine};

/// Rows taken by the control bar (progress + status).
pub const CONTROL_BAR_LINES: u16 = 2;

/// Longest the loop sleeps without checking the player.
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Status as last pushed by the player.
#[derive(Debug, Clone)]
struct StatusCache {
    state: PlaybackState,
    timers: Option<TimersSnapshot>,
    duration: Option<f64>,
    markers: Vec<MarkerPosition>,
    speed: f64,
}

/// Renders player output into a terminal through `W`.
#[derive(Debug)]
pub struct TerminalRenderer<W: Write> {
    out: W,
    term_cols: u16,
    term_rows: u16,
    /// Rows as the player last described them
    lines: Vec<StyledLine>,
    cursor: Option<CursorState>,
    layout: Option<LayoutResult>,
    blink_visible: bool,
    fullscreen: bool,
    status: Option<StatusCache>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, term_cols: u16, term_rows: u16) -> Self {
        Self {
            out,
            term_cols,
            term_rows,
            lines: Vec::new(),
            cursor: None,
            layout: None,
            blink_visible: true,
            fullscreen: false,
            status: None,
        }
    }

    /// Space available to the surface, in cells.
    pub fn container_size(&self) -> (f64, f64) {
        (f64::from(self.term_cols), f64::from(self.content_rows()))
    }

    /// Where the progress bar is drawn; `None` in fullscreen.
    pub fn progress_bar_area(&self) -> Option<ProgressBarArea> {
        if self.fullscreen || self.term_rows < CONTROL_BAR_LINES {
            return None;
        }
        Some(ProgressBarArea {
            row: self.term_rows - CONTROL_BAR_LINES,
            start_col: 1,
            width: bar_width(self.term_cols) as u16,
        })
    }

    /// The host terminal changed size; redraw everything.
    pub fn resize_terminal(&mut self, cols: u16, rows: u16) -> io::Result<()> {
        self.term_cols = cols;
        self.term_rows = rows;
        self.repaint_all()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    fn content_rows(&self) -> u16 {
        if self.fullscreen {
            self.term_rows
        } else {
            self.term_rows.saturating_sub(CONTROL_BAR_LINES)
        }
    }

    /// Visible surface box (cols, rows): the layout size cropped to the
    /// terminal and to the grid.
    fn surface_box(&self) -> (usize, usize) {
        let Some(layout) = self.layout else {
            return (0, 0);
        };
        let cols = (layout.pixel_width.floor().max(0.0) as usize).min(self.term_cols as usize);
        let rows = (layout.pixel_height.floor().max(0.0) as usize)
            .min(self.content_rows() as usize)
            .min(self.lines.len());
        (cols, rows)
    }

    fn draw_row(&mut self, row: usize) -> io::Result<()> {
        let (cols, rows) = self.surface_box();
        if row >= rows {
            return Ok(());
        }
        let text = render_line(&self.lines[row], cols);
        queue!(self.out, MoveTo(0, row as u16), Print(text))
    }

    fn repaint_surface(&mut self) -> io::Result<()> {
        for row in 0..self.content_rows() {
            queue!(self.out, MoveTo(0, row), Clear(ClearType::UntilNewLine))?;
        }
        let (_, rows) = self.surface_box();
        for row in 0..rows {
            self.draw_row(row)?;
        }
        Ok(())
    }

    fn repaint_all(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All))?;
        self.repaint_surface()?;
        self.draw_status()?;
        self.place_cursor()?;
        self.out.flush()
    }

    fn draw_status(&mut self) -> io::Result<()> {
        let Some(bar) = self.progress_bar_area() else {
            return Ok(());
        };
        let Some(status) = self.status.as_ref() else {
            return Ok(());
        };

        let current = status.timers.map(|t| t.current_time).unwrap_or(0.0);
        let duration = status.duration.unwrap_or(0.0);
        let view = StatusView {
            state: status.state,
            timers: status.timers,
            duration: status.duration,
            markers: &status.markers,
            speed: status.speed,
            fullscreen: self.fullscreen,
        };
        let scale = self.layout.map(|l| l.scale);

        render_progress_bar(
            &mut self.out,
            self.term_cols,
            bar.row,
            current,
            duration,
            &status.markers,
        )
        .map_err(io::Error::other)?;
        render_status_line(&mut self.out, self.term_cols, bar.row + 1, &view, scale)
            .map_err(io::Error::other)
    }

    fn place_cursor(&mut self) -> io::Result<()> {
        let (cols, rows) = self.surface_box();
        match self.cursor {
            Some(c) if c.visible && self.blink_visible && c.row < rows && c.col < cols => {
                queue!(self.out, MoveTo(c.col as u16, c.row as u16), Show)
            }
            _ => queue!(self.out, Hide),
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn apply_frame(&mut self, delta: &FrameDelta) -> Result<()> {
        let mut full_repaint = false;
        if let Some((_, rows)) = delta.resized {
            self.lines.resize(rows, StyledLine::default());
            full_repaint = true;
        }

        for (&row, line) in &delta.changed_rows {
            if let Some(slot) = self.lines.get_mut(row) {
                *slot = line.clone();
                if !full_repaint {
                    self.draw_row(row)?;
                }
            }
        }
        if full_repaint {
            self.repaint_surface()?;
        }

        if delta.cursor.is_some() {
            self.cursor = delta.cursor;
        }
        self.place_cursor()?;
        self.out.flush().context("failed to flush frame")
    }

    fn apply_layout(&mut self, layout: &LayoutResult) -> Result<()> {
        debug!(
            scale = layout.scale,
            width = layout.pixel_width,
            height = layout.pixel_height,
            "layout changed"
        );
        self.layout = Some(*layout);
        self.repaint_surface()?;
        self.draw_status()?;
        self.place_cursor()?;
        self.out.flush().context("failed to flush layout")
    }

    fn set_blink(&mut self, visible: bool) -> Result<()> {
        self.blink_visible = visible;
        self.place_cursor()?;
        self.out.flush().context("failed to flush cursor")
    }

    fn update_status(&mut self, status: &StatusView<'_>) -> Result<()> {
        self.status = Some(StatusCache {
            state: status.state,
            timers: status.timers,
            duration: status.duration,
            markers: status.markers.to_vec(),
            speed: status.speed,
        });
        if status.fullscreen != self.fullscreen {
            self.fullscreen = status.fullscreen;
            self.repaint_all()?;
            return Ok(());
        }
        self.draw_status()?;
        self.place_cursor()?;
        self.out.flush().context("failed to flush status")
    }
}

/// Raw mode and alternate screen for the lifetime of the guard.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)
            .context("failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), Show, DisableMouseCapture, LeaveAlternateScreen) {
            warn!(error = %e, "failed to restore terminal screen");
        }
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "failed to disable raw mode");
        }
    }
}

/// How a native session ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub state: PlaybackState,
    /// Playback position when the session ended, in seconds
    pub position: f64,
    /// Why the recording could not be loaded, if it could not
    pub load_error: Option<String>,
}

/// Play a cast file in the current terminal until the user quits.
pub fn play_session(path: &Path, options: PlayerOptions) -> Result<SessionOutcome> {
    let (cols, rows) = terminal::size().context("failed to query terminal size")?;
    let measure_cols = options.cols.unwrap_or(DEFAULT_GRID.0);
    let measure_rows = options.rows.unwrap_or(DEFAULT_GRID.1);

    let _guard = TerminalGuard::enter()?;
    let renderer = TerminalRenderer::new(BufWriter::new(io::stdout()), cols, rows);
    let mut player = Player::new(Box::new(FileSource::new(path)), renderer, options);

    // One cell per character: the surface measures as the grid itself
    let surface = SurfaceMetrics {
        outer_width: f64::from(measure_cols),
        outer_height: f64::from(measure_rows),
        content_width: f64::from(measure_cols),
        content_height: f64::from(measure_rows),
    };
    let (width, height) = player.renderer().container_size();
    player.mount(surface, width, height);

    let epoch = Instant::now();
    player.play(epoch.elapsed());
    info!(path = %path.display(), "session started");

    loop {
        player.run_due(epoch.elapsed());
        if player.state() == PlaybackState::Failed {
            break;
        }

        let now = epoch.elapsed();
        let timeout = player
            .next_deadline()
            .map(|due| due.saturating_sub(now))
            .unwrap_or(IDLE_POLL)
            .min(IDLE_POLL);
        if !event::poll(timeout).context("failed to poll terminal events")? {
            continue;
        }

        let event = event::read().context("failed to read terminal event")?;
        let now = epoch.elapsed();
        if let Event::Resize(cols, rows) = event {
            player.renderer_mut().resize_terminal(cols, rows)?;
            let (width, height) = player.renderer().container_size();
            player.resize_container(width, height);
            continue;
        }

        let was_fullscreen = player.is_fullscreen();
        let bar = player.renderer().progress_bar_area();
        if handle_event(&event, &mut player, now, bar) == InputResult::Quit {
            break;
        }
        if player.is_fullscreen() != was_fullscreen {
            let (width, height) = player.renderer().container_size();
            player.resize_container(width, height);
        }
    }

    let outcome = SessionOutcome {
        state: player.state(),
        position: player.clock().current_time(epoch.elapsed()),
        load_error: player.load_error().map(|e| e.to_string()),
    };
    player.teardown();
    info!(state = %outcome.state, position = outcome.position, "session ended");
    Ok(outcome)
}
