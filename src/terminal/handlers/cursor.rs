//! Cursor movement handlers.
//!
//! Handles CSI sequences:
//! - A/B/C/D: Cursor up/down/forward/back
//! - E/F: Cursor next/previous line
//! - H/f: Cursor position
//! - G: Cursor horizontal absolute
//! - d: Cursor vertical absolute
//! - s/u: Save/restore cursor
//! - ?25h/?25l: Show/hide cursor (DECTCEM)
//!
//! And ESC sequences:
//! - ESC 7: DEC save cursor
//! - ESC 8: DEC restore cursor

use vte::Params;

use crate::terminal::Screen;

const TAB_WIDTH: usize = 8;

impl Screen {
    pub(crate) fn cursor_up(&mut self, n: usize) {
        // Stop at the top margin when starting inside the scroll region
        let limit = if self.cursor_row >= self.scroll_top {
            self.scroll_top
        } else {
            0
        };
        self.cursor_row = self.cursor_row.saturating_sub(n).max(limit);
        self.wrap_pending = false;
    }

    pub(crate) fn cursor_down(&mut self, n: usize) {
        let limit = if self.cursor_row <= self.scroll_bottom {
            self.scroll_bottom
        } else {
            self.height.saturating_sub(1)
        };
        self.cursor_row = (self.cursor_row + n).min(limit);
        self.wrap_pending = false;
    }

    pub(crate) fn cursor_forward(&mut self, n: usize) {
        self.cursor_col = (self.cursor_col + n).min(self.width.saturating_sub(1));
        self.wrap_pending = false;
    }

    pub(crate) fn cursor_back(&mut self, n: usize) {
        self.cursor_col = self.cursor_col.saturating_sub(n);
        self.wrap_pending = false;
    }

    pub(crate) fn cursor_to(&mut self, row: usize, col: usize) {
        self.cursor_row = row.min(self.height.saturating_sub(1));
        self.cursor_col = col.min(self.width.saturating_sub(1));
        self.wrap_pending = false;
    }

    pub(crate) fn cursor_to_col(&mut self, col: usize) {
        self.cursor_col = col.min(self.width.saturating_sub(1));
        self.wrap_pending = false;
    }

    pub(crate) fn cursor_to_row(&mut self, row: usize) {
        self.cursor_row = row.min(self.height.saturating_sub(1));
        self.wrap_pending = false;
    }

    pub(crate) fn carriage_return(&mut self) {
        self.cursor_col = 0;
        self.wrap_pending = false;
    }

    pub(crate) fn backspace(&mut self) {
        self.cursor_back(1);
    }

    pub(crate) fn tab(&mut self) {
        let next = (self.cursor_col / TAB_WIDTH + 1) * TAB_WIDTH;
        self.cursor_col = next.min(self.width.saturating_sub(1));
        self.wrap_pending = false;
    }

    pub(crate) fn save_cursor(&mut self) {
        self.saved_cursor = Some((self.cursor_row, self.cursor_col));
    }

    pub(crate) fn restore_cursor(&mut self) {
        if let Some((row, col)) = self.saved_cursor {
            self.cursor_to(row, col);
        }
    }

    pub(crate) fn set_private_mode(&mut self, params: &Params, enable: bool) {
        for param in params.iter() {
            if param.first() == Some(&25) {
                self.cursor_visible = enable;
            }
        }
    }
}
