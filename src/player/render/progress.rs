//! Progress bar rendering for the control bar.
//!
//! Displays playback progress with marker indicators.

use std::io::Write;

use anyhow::Result;

use crate::player::state::MarkerPosition;

/// Format seconds as MM:SS (fractions truncated, negatives as zero).
pub fn format_duration(seconds: f64) -> String {
    let total_secs = seconds as u64;
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// Build the progress bar glyphs.
///
/// Returns the glyphs and how many leading positions are filled. The
/// playhead sits right after the filled part and wins over a marker there.
pub fn build_progress_bar_chars(
    bar_width: usize,
    current_time: f64,
    total_duration: f64,
    markers: &[MarkerPosition],
) -> (Vec<char>, usize) {
    let progress = if total_duration > 0.0 {
        (current_time / total_duration).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let filled = (bar_width as f64 * progress) as usize;

    let mut bar: Vec<char> = vec!['─'; bar_width];

    if filled < bar_width {
        bar[filled] = '⏺';
    }

    for marker in markers {
        let marker_pos = if total_duration > 0.0 {
            ((marker.time / total_duration) * bar_width as f64) as usize
        } else {
            0
        };
        if marker_pos < bar_width && bar[marker_pos] != '⏺' {
            bar[marker_pos] = '◆';
        }
    }

    (bar, filled)
}

/// Columns taken by padding and the time display around the bar.
pub const BAR_CHROME_WIDTH: usize = 14;

/// Width of the bar itself on a terminal `width` columns wide.
pub fn bar_width(width: u16) -> usize {
    (width as usize).saturating_sub(BAR_CHROME_WIDTH)
}

/// Render the progress bar with markers.
///
/// Writes a full-width row at `row` (0-indexed), starting with a one-column
/// pad, then the bar, then ` current/total`.
pub fn render_progress_bar<W: Write>(
    out: &mut W,
    width: u16,
    row: u16,
    current_time: f64,
    total_duration: f64,
    markers: &[MarkerPosition],
) -> Result<()> {
    let bar_width = bar_width(width);
    let (bar, filled) = build_progress_bar_chars(bar_width, current_time, total_duration, markers);

    let time_display = format!(
        " {}/{}",
        format_duration(current_time),
        format_duration(total_duration)
    );

    let mut output = String::with_capacity(width as usize * 4);
    output.push_str(&format!("\x1b[{};1H", row + 1));
    output.push_str("\x1b[48;5;236m ");

    const GREEN: &str = "\x1b[32m";
    const YELLOW: &str = "\x1b[33m";
    const WHITE: &str = "\x1b[97m";
    const DARK_GREY: &str = "\x1b[90m";
    const GREY: &str = "\x1b[37m";

    output.push_str(GREEN);
    for (i, &c) in bar.iter().enumerate() {
        match (i.cmp(&filled), c) {
            (std::cmp::Ordering::Less, '◆') => {
                output.push_str(YELLOW);
                output.push(c);
                output.push_str(GREEN);
            }
            (std::cmp::Ordering::Less, _) => output.push('━'),
            (std::cmp::Ordering::Equal, _) => {
                output.push_str(WHITE);
                output.push(c);
            }
            (_, '◆') => {
                output.push_str(YELLOW);
                output.push(c);
            }
            _ => {
                output.push_str(DARK_GREY);
                output.push(c);
            }
        }
    }

    output.push_str(GREY);
    output.push_str(&time_display);

    let used_width = 1 + bar_width + time_display.chars().count();
    output.extend(std::iter::repeat(' ').take((width as usize).saturating_sub(used_width)));
    output.push_str("\x1b[0m");

    out.write_all(output.as_bytes())?;
    Ok(())
}
