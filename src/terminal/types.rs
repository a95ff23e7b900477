//! Terminal data types.
//!
//! Contains the core data structures for representing terminal state:
//! - Color: ANSI color codes (16 colors, 256-color palette, RGB)
//! - CellStyle: Text attributes (bold, italic, underline, etc.)
//! - Cell: A single character with its style
//! - StyledLine: A line of styled cells for rendering
//! - CursorState: Cursor position and visibility

/// A terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    /// 256-color palette index
    Indexed(u8),
    /// True color
    Rgb(u8, u8, u8),
}

impl Color {
    /// Map a standard color index (0-7) to its named color.
    pub fn standard(idx: u16) -> Self {
        match idx {
            0 => Color::Black,
            1 => Color::Red,
            2 => Color::Green,
            3 => Color::Yellow,
            4 => Color::Blue,
            5 => Color::Magenta,
            6 => Color::Cyan,
            _ => Color::White,
        }
    }

    /// Map a bright color index (0-7) to its named color.
    pub fn bright(idx: u16) -> Self {
        match idx {
            0 => Color::BrightBlack,
            1 => Color::BrightRed,
            2 => Color::BrightGreen,
            3 => Color::BrightYellow,
            4 => Color::BrightBlue,
            5 => Color::BrightMagenta,
            6 => Color::BrightCyan,
            _ => Color::BrightWhite,
        }
    }
}

/// Text attributes applied to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub reverse: bool,
}

/// A single character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub char: char,
    pub style: CellStyle,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            char: ' ',
            style: CellStyle::default(),
        }
    }
}

impl Cell {
    /// A blank cell carrying the given style (used by erase operations).
    pub fn blank(style: CellStyle) -> Self {
        Self { char: ' ', style }
    }
}

/// One row of styled cells, with trailing default cells trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledLine {
    pub cells: Vec<Cell>,
}

impl StyledLine {
    /// Build a line from a grid row, trimming trailing blank default cells.
    pub fn from_row(row: &[Cell]) -> Self {
        let mut end = row.len();
        while end > 0 && row[end - 1] == Cell::default() {
            end -= 1;
        }
        Self {
            cells: row[..end].to_vec(),
        }
    }

    /// Plain text of the line (no styling).
    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.char).collect()
    }
}

/// Cursor position (0-indexed) and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub col: usize,
    pub row: usize,
    pub visible: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            col: 0,
            row: 0,
            visible: true,
        }
    }
}
