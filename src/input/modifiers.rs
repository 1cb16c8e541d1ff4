//! Keyboard modifier state and shortcut derivation.

use super::events::KeyboardEvent;

/// Keyboard modifier state.
///
/// Captures which modifier keys (Ctrl, Shift, Alt, Meta) were held at the time
/// of a key transition. Used to build [`KeyboardEvent`]s and to derive
/// compound shortcuts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    /// Ctrl key pressed
    pub ctrl: bool,
    /// Shift key pressed
    pub shift: bool,
    /// Alt key pressed
    pub alt: bool,
    /// Meta (Super/Command) key pressed
    pub meta: bool,
}

impl KeyModifiers {
    /// Creates a new instance with all modifiers released.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn from_event(event: &KeyboardEvent) -> Self {
        Self {
            ctrl: event.ctrl_key,
            shift: event.shift_key,
            alt: event.alt_key,
            meta: event.meta_key,
        }
    }
}

/// Higher-level commands derived from a key-down plus modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    SelectAll,
}

impl Shortcut {
    /// Derives a shortcut from a raw key-down.
    ///
    /// # Mapping
    /// - Ctrl+Z → Undo
    /// - Ctrl+Y → Redo
    /// - Ctrl+A → SelectAll
    pub fn from_key_down(event: &KeyboardEvent) -> Option<Self> {
        if !event.ctrl_key {
            return None;
        }

        match event.key.to_ascii_lowercase().as_str() {
            "z" => Some(Shortcut::Undo),
            "y" => Some(Shortcut::Redo),
            "a" => Some(Shortcut::SelectAll),
            _ => None,
        }
    }

    /// Name published on the application sink.
    pub fn event_name(self) -> &'static str {
        match self {
            Shortcut::Undo => "input:undo",
            Shortcut::Redo => "input:redo",
            Shortcut::SelectAll => "input:select-all",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: &str, ctrl: bool) -> KeyboardEvent {
        KeyboardEvent {
            key: key.to_string(),
            code: String::new(),
            ctrl_key: ctrl,
            shift_key: false,
            alt_key: false,
            meta_key: false,
        }
    }

    #[test]
    fn ctrl_letters_map_to_shortcuts() {
        assert_eq!(Shortcut::from_key_down(&key("z", true)), Some(Shortcut::Undo));
        assert_eq!(Shortcut::from_key_down(&key("Y", true)), Some(Shortcut::Redo));
        assert_eq!(
            Shortcut::from_key_down(&key("a", true)),
            Some(Shortcut::SelectAll)
        );
    }

    #[test]
    fn plain_letters_are_not_shortcuts() {
        assert_eq!(Shortcut::from_key_down(&key("z", false)), None);
        assert_eq!(Shortcut::from_key_down(&key("x", true)), None);
    }
}
