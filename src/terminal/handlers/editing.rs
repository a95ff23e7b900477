//! Printing and editing handlers.
//!
//! Handles printable characters (with autowrap and wide glyphs) and CSI sequences:
//! - J: Erase in display
//! - K: Erase in line
//! - @: Insert characters
//! - P: Delete characters
//! - X: Erase characters
//! - L: Insert lines
//! - M: Delete lines

use unicode_width::UnicodeWidthChar;

use crate::terminal::{Cell, CellStyle, Screen};

impl Screen {
    /// Blank cell used by erase operations; keeps the current background.
    fn erase_cell(&self) -> Cell {
        Cell::blank(CellStyle {
            bg: self.current_style.bg,
            ..CellStyle::default()
        })
    }

    pub(crate) fn print_char(&mut self, c: char) {
        let width = c.width().unwrap_or(0);
        if width == 0 || self.width == 0 || self.height == 0 {
            return;
        }

        if self.wrap_pending || (width == 2 && self.cursor_col + 1 >= self.width && self.width > 1)
        {
            self.carriage_return();
            self.line_feed();
        }

        let row = self.cursor_row;
        let col = self.cursor_col;
        self.buffer[row][col] = Cell {
            char: c,
            style: self.current_style,
        };
        if width == 2 && col + 1 < self.width {
            self.buffer[row][col + 1] = Cell::blank(self.current_style);
        }
        self.mark_dirty(row);

        let next = col + width;
        if next >= self.width {
            self.cursor_col = self.width - 1;
            self.wrap_pending = true;
        } else {
            self.cursor_col = next;
        }
    }

    pub(crate) fn erase_in_display(&mut self, mode: u16) {
        let blank = self.erase_cell();
        match mode {
            0 => {
                self.erase_in_line(0);
                for row in self.cursor_row + 1..self.height {
                    self.buffer[row].fill(blank);
                    self.mark_dirty(row);
                }
            }
            1 => {
                self.erase_in_line(1);
                for row in 0..self.cursor_row {
                    self.buffer[row].fill(blank);
                    self.mark_dirty(row);
                }
            }
            2 | 3 => {
                for row in self.buffer.iter_mut() {
                    row.fill(blank);
                }
                self.mark_all_dirty();
            }
            _ => {}
        }
    }

    pub(crate) fn erase_in_line(&mut self, mode: u16) {
        if self.height == 0 {
            return;
        }
        let blank = self.erase_cell();
        let row = self.cursor_row;
        let col = self.cursor_col.min(self.width);
        let line = &mut self.buffer[row];
        match mode {
            0 => line[col..].fill(blank),
            1 => {
                let end = (col + 1).min(line.len());
                line[..end].fill(blank)
            }
            2 => line.fill(blank),
            _ => return,
        }
        self.mark_dirty(row);
    }

    pub(crate) fn insert_chars(&mut self, n: usize) {
        let blank = self.erase_cell();
        let col = self.cursor_col;
        let width = self.width;
        let line = &mut self.buffer[self.cursor_row];
        let n = n.min(width.saturating_sub(col));
        line[col..].rotate_right(n);
        line[col..col + n].fill(blank);
        self.mark_dirty(self.cursor_row);
        self.wrap_pending = false;
    }

    pub(crate) fn delete_chars(&mut self, n: usize) {
        let blank = self.erase_cell();
        let col = self.cursor_col;
        let width = self.width;
        let line = &mut self.buffer[self.cursor_row];
        let n = n.min(width.saturating_sub(col));
        line[col..].rotate_left(n);
        line[width - n..].fill(blank);
        self.mark_dirty(self.cursor_row);
        self.wrap_pending = false;
    }

    pub(crate) fn erase_chars(&mut self, n: usize) {
        let blank = self.erase_cell();
        let col = self.cursor_col;
        let end = (col + n).min(self.width);
        self.buffer[self.cursor_row][col..end].fill(blank);
        self.mark_dirty(self.cursor_row);
    }

    pub(crate) fn insert_lines(&mut self, n: usize) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        self.scroll_region_down(self.cursor_row, n);
        self.carriage_return();
    }

    pub(crate) fn delete_lines(&mut self, n: usize) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        self.scroll_region_up(self.cursor_row, n);
        self.carriage_return();
    }
}
