//! Mouse input handling: click-to-seek on the progress bar.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

/// Where the progress bar sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBarArea {
    pub row: u16,
    pub start_col: u16,
    pub width: u16,
}

/// Time (seconds) a left click on the progress bar asks for.
///
/// `None` for any other event or a click outside the bar.
pub fn seek_target(mouse: &MouseEvent, bar: &ProgressBarArea, duration: f64) -> Option<f64> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || mouse.row != bar.row {
        return None;
    }
    if bar.width == 0 || mouse.column < bar.start_col || mouse.column >= bar.start_col + bar.width
    {
        return None;
    }
    let ratio = f64::from(mouse.column - bar.start_col) / f64::from(bar.width);
    Some((ratio * duration).clamp(0.0, duration.max(0.0)))
}
