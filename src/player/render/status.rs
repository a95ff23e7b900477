//! Status line rendering for the control bar.
//!
//! Displays the playback state, speed, scale and the key hints.

use std::io::Write;

use anyhow::Result;
use unicode_width::UnicodeWidthStr;

use crate::player::state::{PlaybackState, StatusView};

const WHITE: &str = "\x1b[97m";
const DARK_GREY: &str = "\x1b[90m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Icon shown for a state (the action space would take is implied).
fn state_icon(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "⏸",
        PlaybackState::Loading | PlaybackState::Waiting => "…",
        PlaybackState::Failed => "✗",
        PlaybackState::Initial | PlaybackState::Paused => "▶",
    }
}

/// Build the status line text (escape codes included) and its visible width.
pub fn build_status_line(view: &StatusView<'_>, scale: Option<f64>) -> (String, usize) {
    let mut output = String::with_capacity(256);
    let mut visible = String::with_capacity(128);

    let mut push = |color: &str, text: &str| {
        output.push_str(color);
        output.push_str(text);
        visible.push_str(text);
    };

    let label_color = if view.state == PlaybackState::Failed {
        RED
    } else {
        WHITE
    };
    push(WHITE, " ");
    push(WHITE, state_icon(view.state));
    push(label_color, &format!(" {:<8}", view.state.label()));

    push(DARK_GREY, "spd:");
    push(WHITE, &format!("{:.1}x ", view.speed));

    if let Some(scale) = scale {
        push(DARK_GREY, "scale:");
        push(WHITE, &format!("{:.2} ", scale));
    }

    if !view.markers.is_empty() {
        push(YELLOW, &format!("◆{} ", view.markers.len()));
    }

    let play_action = if view.state == PlaybackState::Playing {
        ":pause "
    } else {
        ":play "
    };
    push(DARK_GREY, "│ ");
    for (key, action) in [
        ("space", play_action),
        ("f", ":full "),
        ("←→", ":seek "),
        ("q", ":quit"),
    ] {
        push(CYAN, key);
        push(DARK_GREY, action);
    }

    let width = visible.width();
    (output, width)
}

/// Render the status line as a full-width row at `row` (0-indexed).
pub fn render_status_line<W: Write>(
    out: &mut W,
    width: u16,
    row: u16,
    view: &StatusView<'_>,
    scale: Option<f64>,
) -> Result<()> {
    let (line, visible_len) = build_status_line(view, scale);

    let mut output = String::with_capacity(line.len() + width as usize + 16);
    output.push_str(&format!("\x1b[{};1H", row + 1));
    output.push_str(&line);
    // Pad to full width to overwrite any leftover content
    output.extend(std::iter::repeat(' ').take((width as usize).saturating_sub(visible_len)));
    output.push_str(RESET);

    out.write_all(output.as_bytes())?;
    Ok(())
}
