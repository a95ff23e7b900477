//! Terminal emulator tests.
//!
//! Organized by handler category:
//! - cursor: Cursor movement and visibility
//! - scroll: Scroll region behavior
//! - editing: Erase/insert/delete operations
//! - style: SGR color/attribute parsing
//! - dirty: Changed-row tracking

use super::*;

fn buffer_with(width: usize, height: usize, data: &str) -> TerminalBuffer {
    let mut buf = TerminalBuffer::new(width, height);
    buf.process(data);
    buf
}

mod cursor {
    use super::*;

    #[test]
    fn cursor_position_is_one_based() {
        let buf = buffer_with(10, 5, "\x1b[3;4H");
        assert_eq!(buf.cursor_row(), 2);
        assert_eq!(buf.cursor_col(), 3);
    }

    #[test]
    fn cursor_position_is_clamped() {
        let buf = buffer_with(10, 5, "\x1b[99;99H");
        assert_eq!(buf.cursor_row(), 4);
        assert_eq!(buf.cursor_col(), 9);
    }

    #[test]
    fn relative_moves() {
        let buf = buffer_with(10, 5, "\x1b[3;3H\x1b[2A\x1b[4C\x1b[1B\x1b[2D");
        assert_eq!(buf.cursor_row(), 1);
        assert_eq!(buf.cursor_col(), 4);
    }

    #[test]
    fn save_and_restore() {
        let buf = buffer_with(10, 5, "\x1b[2;2H\x1b7\x1b[5;5H\x1b8");
        assert_eq!((buf.cursor_row(), buf.cursor_col()), (1, 1));
    }

    #[test]
    fn dectcem_hides_and_shows_cursor() {
        let mut buf = buffer_with(10, 5, "\x1b[?25l");
        assert!(!buf.cursor().visible);
        buf.process("\x1b[?25h");
        assert!(buf.cursor().visible);
    }

    #[test]
    fn tab_advances_to_next_stop() {
        let buf = buffer_with(20, 2, "ab\t");
        assert_eq!(buf.cursor_col(), 8);
    }
}

mod editing {
    use super::*;

    #[test]
    fn prints_and_wraps() {
        let buf = buffer_with(5, 3, "abcdefg");
        insta::assert_snapshot!(buf.to_string(), @r"
        abcde
        fg
        ");
    }

    #[test]
    fn carriage_return_overwrites() {
        let buf = buffer_with(10, 2, "hello\rJ");
        assert_eq!(buf.to_string(), "Jello");
    }

    #[test]
    fn erase_line_from_cursor() {
        let buf = buffer_with(10, 2, "hello\x1b[1;3H\x1b[K");
        assert_eq!(buf.to_string(), "he");
    }

    #[test]
    fn erase_line_to_cursor() {
        let buf = buffer_with(10, 2, "hello\x1b[1;3H\x1b[1K");
        assert_eq!(buf.to_string(), "   lo");
    }

    #[test]
    fn erase_line_to_cursor_in_last_column() {
        let buf = buffer_with(5, 2, "hello\x1b[1;5H\x1b[1K");
        assert_eq!(buf.to_string(), "");
    }

    #[test]
    fn erase_display_clears_everything() {
        let buf = buffer_with(10, 3, "one\r\ntwo\r\nthree\x1b[2J");
        assert_eq!(buf.to_string(), "");
    }

    #[test]
    fn delete_and_insert_chars() {
        let mut buf = buffer_with(10, 1, "abcdef\x1b[1;2H\x1b[2P");
        assert_eq!(buf.to_string(), "adef");
        buf.process("\x1b[1;2H\x1b[2@");
        assert_eq!(buf.to_string(), "a  def");
    }

    #[test]
    fn wide_chars_take_two_columns() {
        let buf = buffer_with(10, 1, "日本");
        assert_eq!(buf.cursor_col(), 4);
    }
}

mod scroll {
    use super::*;

    #[test]
    fn line_feed_at_bottom_scrolls() {
        let buf = buffer_with(10, 2, "one\r\ntwo\r\nthree");
        insta::assert_snapshot!(buf.to_string(), @r"
        two
        three
        ");
    }

    #[test]
    fn scroll_region_keeps_rows_outside() {
        // Region rows 2-3 of 4; header and footer must stay put
        let buf = buffer_with(
            10,
            4,
            "head\x1b[4;1Hfoot\x1b[2;3r\x1b[2;1Ha\r\nb\r\nc",
        );
        let lines: Vec<String> = buf.styled_lines().iter().map(|l| l.text()).collect();
        assert_eq!(lines, vec!["head", "b", "c", "foot"]);
    }

    #[test]
    fn reverse_index_at_top_scrolls_down() {
        let buf = buffer_with(10, 3, "one\r\ntwo\x1b[1;1H\x1bM");
        let lines: Vec<String> = buf.styled_lines().iter().map(|l| l.text()).collect();
        assert_eq!(lines, vec!["", "one", "two"]);
    }
}

mod style {
    use super::*;

    fn first_cell(data: &str) -> Cell {
        let buf = buffer_with(10, 1, data);
        buf.row(0).unwrap()[0]
    }

    #[test]
    fn basic_colors_and_attributes() {
        let cell = first_cell("\x1b[1;31;42mX");
        assert!(cell.style.bold);
        assert_eq!(cell.style.fg, Color::Red);
        assert_eq!(cell.style.bg, Color::Green);
    }

    #[test]
    fn indexed_and_rgb_colors() {
        assert_eq!(first_cell("\x1b[38;5;208mX").style.fg, Color::Indexed(208));
        assert_eq!(
            first_cell("\x1b[48;2;1;2;3mX").style.bg,
            Color::Rgb(1, 2, 3)
        );
    }

    #[test]
    fn reset_clears_style() {
        let cell = first_cell("\x1b[1;4;7m\x1b[0mX");
        assert_eq!(cell.style, CellStyle::default());
    }

    #[test]
    fn bright_colors() {
        assert_eq!(first_cell("\x1b[94mX").style.fg, Color::BrightBlue);
        assert_eq!(first_cell("\x1b[101mX").style.bg, Color::BrightRed);
    }
}

mod dirty {
    use super::*;

    #[test]
    fn new_buffer_is_fully_dirty() {
        let mut buf = TerminalBuffer::new(10, 3);
        assert_eq!(buf.take_dirty_rows(), vec![0, 1, 2]);
        assert!(!buf.has_dirty_rows());
    }

    #[test]
    fn only_written_rows_become_dirty() {
        let mut buf = TerminalBuffer::new(10, 3);
        buf.take_dirty_rows();
        buf.process("\x1b[2;1Hx");
        assert_eq!(buf.take_dirty_rows(), vec![1]);
    }

    #[test]
    fn cursor_moves_do_not_dirty_rows() {
        let mut buf = TerminalBuffer::new(10, 3);
        buf.take_dirty_rows();
        buf.process("\x1b[3;5H\x1b[A");
        assert!(buf.take_dirty_rows().is_empty());
    }

    #[test]
    fn scrolling_dirties_the_region() {
        let mut buf = buffer_with(10, 3, "a\r\nb\r\nc");
        buf.take_dirty_rows();
        buf.process("\r\n");
        assert_eq!(buf.take_dirty_rows(), vec![0, 1, 2]);
    }

    #[test]
    fn resize_dirties_all_rows() {
        let mut buf = TerminalBuffer::new(10, 3);
        buf.take_dirty_rows();
        buf.resize(5, 4);
        assert_eq!(buf.take_dirty_rows(), vec![0, 1, 2, 3]);
        assert_eq!(buf.width(), 5);
    }
}
