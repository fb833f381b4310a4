//! Key bindings.

use crate::terminal::Key;
use crate::window::Navigation;

/// Navigation bound to `key`, if any.
///
/// ←/→ scroll one sample, Home jumps to the oldest page, End back to live.
pub fn navigation_for(key: Key) -> Option<Navigation> {
    match key {
        Key::Left => Some(Navigation::ScrollBack),
        Key::Right => Some(Navigation::ScrollForward),
        Key::Home => Some(Navigation::JumpToOldest),
        Key::End => Some(Navigation::JumpToLive),
        Key::Interrupt | Key::Other => None,
    }
}
