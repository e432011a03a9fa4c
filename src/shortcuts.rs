//! Fixed keyboard shortcuts.
//!
//! A binding fires only when its modifier set matches exactly, so Ctrl+Shift+Z never
//! triggers the Ctrl+Z binding. Each physical press fires at most once: auto-repeat and
//! key-downs for keys that are already held are ignored until the key is released.

use std::collections::HashSet;

use egui::{Key, Modifiers};

/// Something a shortcut can ask the application to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Save,
    Undo,
    Redo,
    Generate,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Self::Save => "Save drawing",
            Self::Undo => "Undo",
            Self::Redo => "Redo",
            Self::Generate => "Generate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyboardHotkey {
    /// Ctrl, or Cmd on macOS
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: Key,
}

impl KeyboardHotkey {
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == key
            && self.ctrl == modifiers.command
            && self.alt == modifiers.alt
            && self.shift == modifiers.shift
    }

    /// Human readable form, e.g. `Ctrl+Shift+Z`
    pub fn describe(&self) -> String {
        let mut text = String::new();
        if self.ctrl {
            text.push_str("Ctrl+");
        }
        if self.alt {
            text.push_str("Alt+");
        }
        if self.shift {
            text.push_str("Shift+");
        }
        text.push_str(self.key.name());
        text
    }
}

pub const KEYBOARD: &[(Action, KeyboardHotkey)] = &[
    (
        Action::Save,
        KeyboardHotkey {
            ctrl: true,
            alt: false,
            shift: false,
            key: Key::S,
        },
    ),
    (
        Action::Undo,
        KeyboardHotkey {
            ctrl: true,
            alt: false,
            shift: false,
            key: Key::Z,
        },
    ),
    (
        Action::Redo,
        KeyboardHotkey {
            ctrl: true,
            alt: false,
            shift: true,
            key: Key::Z,
        },
    ),
    (
        Action::Generate,
        KeyboardHotkey {
            ctrl: true,
            alt: false,
            shift: false,
            key: Key::G,
        },
    ),
];

/// The binding for an action
pub fn hotkey_for(action: Action) -> Option<&'static KeyboardHotkey> {
    KEYBOARD
        .iter()
        .find(|(bound, _)| *bound == action)
        .map(|(_, hotkey)| hotkey)
}

/// Maps key events to actions
#[derive(Debug, Default)]
pub struct ShortcutDispatcher {
    held: HashSet<Key>,
}

impl ShortcutDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press. `repeat` is set for auto-repeat events.
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers, repeat: bool) -> Option<Action> {
        if repeat || !self.held.insert(key) {
            return None;
        }
        let action = KEYBOARD
            .iter()
            .find(|(_, hotkey)| hotkey.matches(key, modifiers))
            .map(|(action, _)| *action)?;
        log::debug!("shortcut {:?} -> {}", key, action.label());
        Some(action)
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Forget held keys, e.g. when the window loses focus
    pub fn reset(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}
