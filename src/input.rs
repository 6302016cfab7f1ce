//! Keyboard shortcuts for the viewer window.
//!
//! - `1`-`9`: select device 1-9 from the device menu
//! - `Tab` / `Shift+Tab`: next / previous device
//! - `Escape` or `q`: quit

use winit::keyboard::{Key, NamedKey};

/// Result of handling a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Select the device at this zero-based menu index
    SelectDevice(usize),
    NextDevice,
    PreviousDevice,
    Quit,
    /// Key is not bound
    None,
}

/// Map a pressed key to an action.
pub fn handle_key(key: &Key, shift: bool) -> KeyAction {
    match key {
        Key::Named(NamedKey::Tab) if shift => KeyAction::PreviousDevice,
        Key::Named(NamedKey::Tab) => KeyAction::NextDevice,
        Key::Named(NamedKey::Escape) => KeyAction::Quit,
        Key::Character(text) => match text.as_str() {
            "q" | "Q" => KeyAction::Quit,
            digit => match digit.parse::<usize>() {
                Ok(n @ 1..=9) => KeyAction::SelectDevice(n - 1),
                _ => KeyAction::None,
            },
        },
        _ => KeyAction::None,
    }
}
