//! vte `Perform` implementation that routes parsed sequences to the handlers.

use tracing::trace;
use vte::{Params, Perform};

use super::Screen;

/// Bridges the vte parser to the screen state.
pub(crate) struct TerminalPerformer<'a> {
    pub(crate) screen: &'a mut Screen,
}

/// First parameter of a CSI sequence, with `default` for missing or zero values.
pub(crate) fn param_or(params: &Params, idx: usize, default: usize) -> usize {
    params
        .iter()
        .nth(idx)
        .and_then(|p| p.first().copied())
        .filter(|&v| v != 0)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Raw first parameter (0 when absent); used where 0 is meaningful.
fn first_param(params: &Params) -> u16 {
    params
        .iter()
        .next()
        .and_then(|p| p.first().copied())
        .unwrap_or(0)
}

impl Perform for TerminalPerformer<'_> {
    fn print(&mut self, c: char) {
        self.screen.print_char(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' | 0x0b | 0x0c => self.screen.line_feed(),
            b'\r' => self.screen.carriage_return(),
            0x08 => self.screen.backspace(),
            b'\t' => self.screen.tab(),
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        let screen = &mut *self.screen;

        if intermediates == [b'?'] {
            match action {
                'h' | 'l' => screen.set_private_mode(params, action == 'h'),
                _ => trace!(?action, "unhandled private CSI sequence"),
            }
            return;
        }
        if !intermediates.is_empty() {
            return;
        }

        match action {
            'A' => screen.cursor_up(param_or(params, 0, 1)),
            'B' | 'e' => screen.cursor_down(param_or(params, 0, 1)),
            'C' | 'a' => screen.cursor_forward(param_or(params, 0, 1)),
            'D' => screen.cursor_back(param_or(params, 0, 1)),
            'E' => {
                screen.cursor_down(param_or(params, 0, 1));
                screen.carriage_return();
            }
            'F' => {
                screen.cursor_up(param_or(params, 0, 1));
                screen.carriage_return();
            }
            'G' | '`' => screen.cursor_to_col(param_or(params, 0, 1) - 1),
            'd' => screen.cursor_to_row(param_or(params, 0, 1) - 1),
            'H' | 'f' => {
                screen.cursor_to(param_or(params, 0, 1) - 1, param_or(params, 1, 1) - 1)
            }
            'J' => screen.erase_in_display(first_param(params)),
            'K' => screen.erase_in_line(first_param(params)),
            'L' => screen.insert_lines(param_or(params, 0, 1)),
            'M' => screen.delete_lines(param_or(params, 0, 1)),
            'P' => screen.delete_chars(param_or(params, 0, 1)),
            '@' => screen.insert_chars(param_or(params, 0, 1)),
            'X' => screen.erase_chars(param_or(params, 0, 1)),
            'S' => screen.scroll_up(param_or(params, 0, 1)),
            'T' => screen.scroll_down(param_or(params, 0, 1)),
            'r' => {
                let bottom_default = screen.height;
                screen.set_scroll_region(
                    param_or(params, 0, 1) - 1,
                    param_or(params, 1, bottom_default) - 1,
                )
            }
            's' => screen.save_cursor(),
            'u' => screen.restore_cursor(),
            'm' => screen.apply_sgr(params),
            _ => trace!(?action, "unhandled CSI sequence"),
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        if !intermediates.is_empty() {
            return;
        }
        match byte {
            b'7' => self.screen.save_cursor(),
            b'8' => self.screen.restore_cursor(),
            b'D' => self.screen.line_feed(),
            b'E' => {
                self.screen.line_feed();
                self.screen.carriage_return();
            }
            b'M' => self.screen.reverse_index(),
            _ => trace!(byte, "unhandled ESC sequence"),
        }
    }
}
