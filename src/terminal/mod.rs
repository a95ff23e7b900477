//! Virtual terminal emulator module.
//!
//! Provides a VTE-based terminal buffer for replaying asciicast output.
//! Handles ANSI escape sequences and maintains terminal state.
//!
//! Besides the grid itself the buffer tracks which rows changed since the
//! last call to [`TerminalBuffer::take_dirty_rows`], so a renderer only has
//! to repaint what actually changed.

mod handlers;
mod performer;
mod types;

#[cfg(test)]
mod tests;

pub use types::{Cell, CellStyle, Color, CursorState, StyledLine};

use std::fmt;
use vte::Parser;

/// Grid state mutated by the escape sequence handlers.
#[derive(Debug, Clone)]
pub(crate) struct Screen {
    /// Terminal width in columns
    pub(crate) width: usize,
    /// Terminal height in rows
    pub(crate) height: usize,
    /// The screen buffer - a 2D grid of cells
    pub(crate) buffer: Vec<Vec<Cell>>,
    /// Current cursor column (0-indexed)
    pub(crate) cursor_col: usize,
    /// Current cursor row (0-indexed)
    pub(crate) cursor_row: usize,
    /// Whether the cursor is shown (DECTCEM)
    pub(crate) cursor_visible: bool,
    /// Set after printing into the last column; the next print wraps first
    pub(crate) wrap_pending: bool,
    /// Current style for new characters
    pub(crate) current_style: CellStyle,
    /// Saved cursor position (for CSI s/u and ESC 7/8)
    pub(crate) saved_cursor: Option<(usize, usize)>,
    /// Top margin of scroll region (0-indexed, inclusive)
    pub(crate) scroll_top: usize,
    /// Bottom margin of scroll region (0-indexed, inclusive)
    pub(crate) scroll_bottom: usize,
    /// Rows modified since the last dirty-row query
    pub(crate) dirty: Vec<bool>,
}

impl Screen {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width]; height],
            cursor_col: 0,
            cursor_row: 0,
            cursor_visible: true,
            wrap_pending: false,
            current_style: CellStyle::default(),
            saved_cursor: None,
            scroll_top: 0,
            scroll_bottom: height.saturating_sub(1),
            dirty: vec![true; height],
        }
    }

    pub(crate) fn mark_dirty(&mut self, row: usize) {
        if let Some(flag) = self.dirty.get_mut(row) {
            *flag = true;
        }
    }

    pub(crate) fn mark_rows_dirty(&mut self, top: usize, bottom: usize) {
        for row in top..=bottom.min(self.height.saturating_sub(1)) {
            self.mark_dirty(row);
        }
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|d| *d = true);
    }
}

/// A virtual terminal buffer that processes ANSI escape sequences.
///
/// The buffer maintains a 2D grid of cells representing the terminal
/// screen state. It handles cursor movement, line wrapping, colors,
/// scroll regions and the common erase/insert/delete sequences.
pub struct TerminalBuffer {
    screen: Screen,
    /// VTE parser for handling ANSI sequences
    parser: Parser,
}

impl TerminalBuffer {
    /// Create a new terminal buffer with the given dimensions.
    ///
    /// Every row starts out dirty so the first query reports the full grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            screen: Screen::new(width, height),
            parser: Parser::new(),
        }
    }

    /// Process output data through the terminal emulator.
    ///
    /// This parses ANSI escape sequences and updates the buffer state.
    pub fn process(&mut self, data: &str) {
        let mut perf = performer::TerminalPerformer {
            screen: &mut self.screen,
        };
        self.parser.advance(&mut perf, data.as_bytes());
    }

    /// Resize the terminal buffer to new dimensions.
    ///
    /// Preserves existing content where possible, truncating or extending
    /// rows/columns as needed. Cursor position is clamped to the new bounds
    /// and every row is marked dirty.
    pub fn resize(&mut self, new_width: usize, new_height: usize) {
        let screen = &mut self.screen;
        let mut new_buffer = vec![vec![Cell::default(); new_width]; new_height];

        for (row_idx, row) in screen.buffer.iter().enumerate().take(new_height) {
            for (col_idx, cell) in row.iter().enumerate().take(new_width) {
                new_buffer[row_idx][col_idx] = *cell;
            }
        }

        screen.buffer = new_buffer;
        screen.width = new_width;
        screen.height = new_height;
        screen.dirty = vec![true; new_height];

        screen.cursor_col = screen.cursor_col.min(new_width.saturating_sub(1));
        screen.cursor_row = screen.cursor_row.min(new_height.saturating_sub(1));
        screen.wrap_pending = false;

        // Reset scroll region to full screen on resize
        screen.scroll_top = 0;
        screen.scroll_bottom = new_height.saturating_sub(1);

        if let Some((row, col)) = screen.saved_cursor {
            if row >= new_height || col >= new_width {
                screen.saved_cursor = None;
            }
        }
    }

    /// Get the terminal width.
    pub fn width(&self) -> usize {
        self.screen.width
    }

    /// Get the terminal height.
    pub fn height(&self) -> usize {
        self.screen.height
    }

    /// Get the current cursor row (0-indexed).
    pub fn cursor_row(&self) -> usize {
        self.screen.cursor_row
    }

    /// Get the current cursor column (0-indexed).
    pub fn cursor_col(&self) -> usize {
        self.screen.cursor_col
    }

    /// Current cursor position and visibility.
    pub fn cursor(&self) -> CursorState {
        CursorState {
            col: self.screen.cursor_col,
            row: self.screen.cursor_row,
            visible: self.screen.cursor_visible,
        }
    }

    /// Get styled lines for rendering with color support.
    pub fn styled_lines(&self) -> Vec<StyledLine> {
        self.screen
            .buffer
            .iter()
            .map(|row| StyledLine::from_row(row))
            .collect()
    }

    /// Get a reference to a specific row's cells (no cloning).
    pub fn row(&self, row_idx: usize) -> Option<&[Cell]> {
        self.screen.buffer.get(row_idx).map(|r| r.as_slice())
    }

    /// Whether any row changed since the last query.
    pub fn has_dirty_rows(&self) -> bool {
        self.screen.dirty.iter().any(|d| *d)
    }

    /// Return the indices of rows changed since the last call and mark them clean.
    pub fn take_dirty_rows(&mut self) -> Vec<usize> {
        let mut rows = Vec::new();
        for (idx, flag) in self.screen.dirty.iter_mut().enumerate() {
            if *flag {
                rows.push(idx);
                *flag = false;
            }
        }
        rows
    }
}

impl fmt::Display for TerminalBuffer {
    /// Display the current screen content as a string (without colors).
    ///
    /// Returns the visible content with trailing whitespace trimmed from each line.
    /// Empty trailing lines are removed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self
            .screen
            .buffer
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.char)
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect();

        while lines.last().map(|s| s.is_empty()).unwrap_or(false) {
            lines.pop();
        }

        write!(f, "{}", lines.join("\n"))
    }
}

impl fmt::Debug for TerminalBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalBuffer")
            .field("width", &self.screen.width)
            .field("height", &self.screen.height)
            .field("cursor", &self.cursor())
            .finish()
    }
}
