//! Keyboard input handling.
//!
//! The player itself only knows two actions. The native host layers its
//! own keys (quit, seek) on top of them.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Seek step for the arrow keys, in seconds.
pub const SEEK_STEP: f64 = 5.0;

/// A user action the player understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    TogglePlay,
    ToggleFullscreen,
}

/// Key handled by the native host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    Player(PlayerAction),
    /// Seek by a number of seconds (negative is backwards)
    SeekBy(f64),
    Quit,
}

/// Map a key to a player action: space and `f`, without modifiers.
///
/// Every other key (and every modified key) is ignored.
pub fn map_key(key: &KeyEvent) -> Option<PlayerAction> {
    if key.kind == KeyEventKind::Release || !key.modifiers.is_empty() {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') => Some(PlayerAction::TogglePlay),
        KeyCode::Char('f') => Some(PlayerAction::ToggleFullscreen),
        _ => None,
    }
}

/// Map a key for the native host: quit and seek keys, then [`map_key`].
pub fn map_host_key(key: &KeyEvent) -> Option<HostCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(HostCommand::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(HostCommand::Quit),
        KeyCode::Left => Some(HostCommand::SeekBy(-SEEK_STEP)),
        KeyCode::Right => Some(HostCommand::SeekBy(SEEK_STEP)),
        _ => map_key(key).map(HostCommand::Player),
    }
}
