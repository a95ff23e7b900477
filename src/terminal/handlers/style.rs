//! SGR (Select Graphic Rendition) handler.
//!
//! Handles CSI m sequence for text styling:
//! - Reset (0)
//! - Bold, dim, italic, underline, reverse (1-7) and their resets (22-27)
//! - Standard foreground/background colors (30-47), defaults (39/49)
//! - Extended colors - 256-color mode (38;5;n, 48;5;n)
//! - Extended colors - RGB mode (38;2;r;g;b, 48;2;r;g;b)
//! - Bright foreground/background colors (90-107)
//!
//! Both the semicolon and the colon (sub-parameter) forms are accepted.

use vte::Params;

use crate::terminal::{CellStyle, Color, Screen};

/// Parse an extended color from the values following 38/48.
///
/// Returns the color and how many values were consumed.
fn parse_extended_color(values: &[u16]) -> Option<(Color, usize)> {
    match values.first()? {
        5 => values.get(1).map(|&n| (Color::Indexed(n.min(255) as u8), 2)),
        2 => {
            if values.len() >= 4 {
                let channel = |v: u16| v.min(255) as u8;
                Some((
                    Color::Rgb(channel(values[1]), channel(values[2]), channel(values[3])),
                    4,
                ))
            } else {
                None
            }
        }
        _ => None,
    }
}

impl Screen {
    pub(crate) fn apply_sgr(&mut self, params: &Params) {
        let groups: Vec<&[u16]> = params.iter().collect();
        if groups.is_empty() {
            self.current_style = CellStyle::default();
            return;
        }

        let mut i = 0;
        while i < groups.len() {
            let group = groups[i];
            let code = group.first().copied().unwrap_or(0);
            match code {
                0 => self.current_style = CellStyle::default(),
                1 => self.current_style.bold = true,
                2 => self.current_style.dim = true,
                3 => self.current_style.italic = true,
                4 => self.current_style.underline = true,
                7 => self.current_style.reverse = true,
                22 => {
                    self.current_style.bold = false;
                    self.current_style.dim = false;
                }
                23 => self.current_style.italic = false,
                24 => self.current_style.underline = false,
                27 => self.current_style.reverse = false,
                30..=37 => self.current_style.fg = Color::standard(code - 30),
                39 => self.current_style.fg = Color::Default,
                40..=47 => self.current_style.bg = Color::standard(code - 40),
                49 => self.current_style.bg = Color::Default,
                90..=97 => self.current_style.fg = Color::bright(code - 90),
                100..=107 => self.current_style.bg = Color::bright(code - 100),
                38 | 48 => {
                    // Colon form carries everything in one group
                    let parsed = if group.len() > 1 {
                        parse_extended_color(&group[1..]).map(|(color, _)| (color, 0))
                    } else {
                        let rest: Vec<u16> = groups[i + 1..]
                            .iter()
                            .map(|g| g.first().copied().unwrap_or(0))
                            .collect();
                        parse_extended_color(&rest)
                    };
                    if let Some((color, consumed)) = parsed {
                        if code == 38 {
                            self.current_style.fg = color;
                        } else {
                            self.current_style.bg = color;
                        }
                        i += consumed;
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }
}
