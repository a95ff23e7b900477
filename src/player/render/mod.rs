//! Rendering components for the native player.
//!
//! Row rendering for the terminal surface plus the control bar (progress
//! bar and status line).

mod ansi;
mod progress;
mod status;
mod viewport;

pub use ansi::push_style;
pub use progress::{bar_width, build_progress_bar_chars, format_duration, render_progress_bar};
pub use status::{build_status_line, render_status_line};
pub use viewport::render_line;
