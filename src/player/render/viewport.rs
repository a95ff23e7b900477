//! Viewport rendering for the native player.
//!
//! Turns styled rows into escape-coded text, cropped to the visible box.

use unicode_width::UnicodeWidthChar;

use crate::player::render::ansi::push_style;
use crate::terminal::{CellStyle, StyledLine};

/// Render one row, cropped and padded to exactly `width` columns.
///
/// A wide character that would straddle the right edge is replaced by a
/// space; the spacer cell after a wide character is skipped.
pub fn render_line(line: &StyledLine, width: usize) -> String {
    let mut output = String::with_capacity(width * 2);
    let mut current_style = CellStyle::default();
    let mut used = 0;
    let mut cells = line.cells.iter();

    while used < width {
        let Some(cell) = cells.next() else {
            break;
        };
        if cell.style != current_style {
            push_style(&cell.style, &mut output);
            current_style = cell.style;
        }

        let char_width = cell.char.width().unwrap_or(1).max(1);
        if char_width == 2 {
            cells.next();
            if used + 2 > width {
                output.push(' ');
                used += 1;
                continue;
            }
        }
        output.push(cell.char);
        used += char_width;
    }

    if current_style != CellStyle::default() {
        output.push_str("\x1b[0m");
    }
    output.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    output
}
