//! Scroll region handlers.
//!
//! Handles CSI sequences:
//! - r: DECSTBM (Set Top and Bottom Margins)
//! - S: Scroll up
//! - T: Scroll down
//!
//! And ESC sequences:
//! - ESC D / LF: Index
//! - ESC M: Reverse index

use crate::terminal::{Cell, Screen};

impl Screen {
    /// Scroll rows `top..=scroll_bottom` up by `n`, blanking the bottom.
    pub(crate) fn scroll_region_up(&mut self, top: usize, n: usize) {
        let bottom = self.scroll_bottom;
        if top > bottom || bottom >= self.height {
            return;
        }
        let n = n.min(bottom - top + 1);
        self.buffer[top..=bottom].rotate_left(n);
        for row in &mut self.buffer[bottom + 1 - n..=bottom] {
            row.fill(Cell::default());
        }
        self.mark_rows_dirty(top, bottom);
    }

    /// Scroll rows `top..=scroll_bottom` down by `n`, blanking the top.
    pub(crate) fn scroll_region_down(&mut self, top: usize, n: usize) {
        let bottom = self.scroll_bottom;
        if top > bottom || bottom >= self.height {
            return;
        }
        let n = n.min(bottom - top + 1);
        self.buffer[top..=bottom].rotate_right(n);
        for row in &mut self.buffer[top..top + n] {
            row.fill(Cell::default());
        }
        self.mark_rows_dirty(top, bottom);
    }

    pub(crate) fn line_feed(&mut self) {
        if self.cursor_row == self.scroll_bottom {
            self.scroll_region_up(self.scroll_top, 1);
        } else if self.cursor_row + 1 < self.height {
            self.cursor_row += 1;
        }
        self.wrap_pending = false;
    }

    pub(crate) fn reverse_index(&mut self) {
        if self.cursor_row == self.scroll_top {
            self.scroll_region_down(self.scroll_top, 1);
        } else {
            self.cursor_row = self.cursor_row.saturating_sub(1);
        }
        self.wrap_pending = false;
    }

    pub(crate) fn scroll_up(&mut self, n: usize) {
        self.scroll_region_up(self.scroll_top, n);
    }

    pub(crate) fn scroll_down(&mut self, n: usize) {
        self.scroll_region_down(self.scroll_top, n);
    }

    /// DECSTBM. Invalid regions are ignored; a valid one homes the cursor.
    pub(crate) fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let bottom = bottom.min(self.height.saturating_sub(1));
        if top >= bottom {
            return;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        self.cursor_to(0, 0);
    }
}
