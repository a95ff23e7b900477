//! Terminal escape sequence handlers.
//!
//! Organized by category, each adding methods to the screen state:
//! - cursor: Cursor movement, positioning and visibility
//! - scroll: Scroll region and scrolling operations
//! - editing: Printing, erase, insert and delete operations
//! - style: SGR (Select Graphic Rendition) handling

mod cursor;
mod editing;
mod scroll;
mod style;
