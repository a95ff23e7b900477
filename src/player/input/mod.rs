//! Input handling for the native player.
//!
//! Maps crossterm key and mouse events onto the player and returns control
//! flow signals for the host loop. Terminal resize events are the host's
//! business and pass through untouched.

mod keyboard;
mod mouse;

pub use keyboard::{map_host_key, map_key, HostCommand, PlayerAction, SEEK_STEP};
pub use mouse::{seek_target, ProgressBarArea};

use std::time::Duration;

use crossterm::event::Event;

use crate::player::controller::{Player, Renderer};
use crate::player::state::InputResult;

/// Handle a key or mouse event against `player`.
///
/// `bar` is where the progress bar is currently drawn, if anywhere.
pub fn handle_event<R: Renderer>(
    event: &Event,
    player: &mut Player<R>,
    now: Duration,
    bar: Option<ProgressBarArea>,
) -> InputResult {
    match event {
        Event::Key(key) => match map_host_key(key) {
            Some(HostCommand::Quit) => InputResult::Quit,
            Some(HostCommand::SeekBy(offset)) => {
                player.seek_by(now, offset);
                InputResult::Continue
            }
            Some(HostCommand::Player(action)) => {
                player.handle_action(action, now);
                InputResult::Continue
            }
            None => InputResult::Continue,
        },
        Event::Mouse(mouse) => {
            let duration = player.clock().duration();
            if let (Some(bar), Some(duration)) = (bar, duration) {
                if let Some(target) = seek_target(mouse, &bar, duration) {
                    player.seek(now, target);
                }
            }
            InputResult::Continue
        }
        _ => InputResult::Continue,
    }
}
