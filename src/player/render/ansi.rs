//! ANSI escape code conversion utilities.
//!
//! Converts terminal cell styles to SGR sequences for rendering.

use crate::terminal::{CellStyle, Color};

/// SGR base code of a named color, before the foreground/background offset.
fn named_code(color: &Color) -> Option<u8> {
    let code = match color {
        Color::Black => 30,
        Color::Red => 31,
        Color::Green => 32,
        Color::Yellow => 33,
        Color::Blue => 34,
        Color::Magenta => 35,
        Color::Cyan => 36,
        Color::White => 37,
        Color::BrightBlack => 90,
        Color::BrightRed => 91,
        Color::BrightGreen => 92,
        Color::BrightYellow => 93,
        Color::BrightBlue => 94,
        Color::BrightMagenta => 95,
        Color::BrightCyan => 96,
        Color::BrightWhite => 97,
        Color::Default | Color::Indexed(_) | Color::Rgb(..) => return None,
    };
    Some(code)
}

/// Append `;`-prefixed SGR parameters for one color.
///
/// Returns `false` (and appends nothing) for the default color.
fn push_color_params(color: &Color, background: bool, buf: &mut String) -> bool {
    let offset = if background { 10 } else { 0 };
    let extended = if background { 48 } else { 38 };
    match color {
        Color::Default => return false,
        Color::Indexed(n) => buf.push_str(&format!(";{};5;{}", extended, n)),
        Color::Rgb(r, g, b) => buf.push_str(&format!(";{};2;{};{};{}", extended, r, g, b)),
        named => {
            if let Some(code) = named_code(named) {
                buf.push_str(&format!(";{}", code + offset));
            }
        }
    }
    true
}

/// Append one SGR sequence that resets and then applies `style`.
pub fn push_style(style: &CellStyle, buf: &mut String) {
    buf.push_str("\x1b[0");
    push_color_params(&style.fg, false, buf);
    push_color_params(&style.bg, true, buf);
    for (enabled, code) in [
        (style.bold, ";1"),
        (style.dim, ";2"),
        (style.italic, ";3"),
        (style.underline, ";4"),
        (style.reverse, ";7"),
    ] {
        if enabled {
            buf.push_str(code);
        }
    }
    buf.push('m');
}
