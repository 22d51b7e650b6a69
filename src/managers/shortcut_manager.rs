//! Shortcut Manager.
//!
//! Keyboard bindings for tab navigation with conflict detection. Key events
//! only trigger an action while the host window has focus, and only when the
//! modifiers match exactly.

use std::collections::HashMap;
use std::fmt;

use crate::types::errors::ShortcutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    CloseCurrentTab,
    PreviousTab,
    NextTab,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 3] = [
        ShortcutAction::CloseCurrentTab,
        ShortcutAction::PreviousTab,
        ShortcutAction::NextTab,
    ];
}

/// A modifier combination plus one key, e.g. `Ctrl+PageUp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: String,
}

fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_ascii_uppercase()
    } else {
        key.to_string()
    }
}

impl KeyChord {
    /// Parses `Ctrl+Shift+W` style text. Modifiers are case-insensitive.
    pub fn parse(text: &str) -> Result<Self, ShortcutError> {
        let invalid = || ShortcutError::InvalidKeys(text.to_string());
        let mut parts: Vec<&str> = text.split('+').map(str::trim).collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(invalid)?;

        let mut chord = KeyChord {
            ctrl: false,
            alt: false,
            shift: false,
            key: normalize_key(key),
        };
        for modifier in parts {
            let flag = match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => &mut chord.ctrl,
                "alt" => &mut chord.alt,
                "shift" => &mut chord.shift,
                _ => return Err(invalid()),
            };
            if *flag {
                return Err(invalid());
            }
            *flag = true;
        }
        Ok(chord)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.ctrl == event.ctrl
            && self.alt == event.alt
            && self.shift == event.shift
            && self.key == normalize_key(&event.key)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// A key press reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: String,
}

impl KeyEvent {
    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            key: key.to_string(),
            ..Self::default()
        }
    }
}

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn register_shortcut(&mut self, action: ShortcutAction, keys: &str) -> Result<(), ShortcutError>;
    fn unregister_shortcut(&mut self, action: ShortcutAction) -> Result<(), ShortcutError>;
    fn get_shortcut(&self, action: ShortcutAction) -> Option<&KeyChord>;
    fn list_shortcuts(&self) -> &HashMap<ShortcutAction, KeyChord>;
    fn reset_to_defaults(&mut self);
    fn has_conflict(&self, chord: &KeyChord, exclude_action: Option<ShortcutAction>) -> Option<ShortcutAction>;
    fn get_default_shortcuts(&self) -> HashMap<ShortcutAction, KeyChord>;
    fn handle_key(&self, event: &KeyEvent, window_focused: bool) -> Option<ShortcutAction>;
}

pub struct ShortcutManager {
    shortcuts: HashMap<ShortcutAction, KeyChord>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        let mut mgr = Self {
            shortcuts: HashMap::new(),
        };
        mgr.shortcuts = mgr.get_default_shortcuts();
        mgr
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn register_shortcut(&mut self, action: ShortcutAction, keys: &str) -> Result<(), ShortcutError> {
        let chord = KeyChord::parse(keys)?;
        if let Some(conflicting) = self.has_conflict(&chord, Some(action)) {
            return Err(ShortcutError::Conflict(format!(
                "'{}' is already bound to '{:?}'",
                chord, conflicting
            )));
        }
        self.shortcuts.insert(action, chord);
        Ok(())
    }

    fn unregister_shortcut(&mut self, action: ShortcutAction) -> Result<(), ShortcutError> {
        self.shortcuts
            .remove(&action)
            .map(|_| ())
            .ok_or_else(|| ShortcutError::NotFound(format!("{:?}", action)))
    }

    fn get_shortcut(&self, action: ShortcutAction) -> Option<&KeyChord> {
        self.shortcuts.get(&action)
    }

    fn list_shortcuts(&self) -> &HashMap<ShortcutAction, KeyChord> {
        &self.shortcuts
    }

    fn reset_to_defaults(&mut self) {
        self.shortcuts = self.get_default_shortcuts();
    }

    fn has_conflict(&self, chord: &KeyChord, exclude_action: Option<ShortcutAction>) -> Option<ShortcutAction> {
        self.shortcuts
            .iter()
            .find(|(action, bound)| *bound == chord && Some(**action) != exclude_action)
            .map(|(action, _)| *action)
    }

    fn get_default_shortcuts(&self) -> HashMap<ShortcutAction, KeyChord> {
        let chord = |key: &str| KeyChord {
            ctrl: true,
            alt: false,
            shift: false,
            key: key.to_string(),
        };
        HashMap::from([
            (ShortcutAction::CloseCurrentTab, chord("W")),
            (ShortcutAction::PreviousTab, chord("PageUp")),
            (ShortcutAction::NextTab, chord("PageDown")),
        ])
    }

    fn handle_key(&self, event: &KeyEvent, window_focused: bool) -> Option<ShortcutAction> {
        if !window_focused {
            return None;
        }
        self.shortcuts
            .iter()
            .find(|(_, chord)| chord.matches(event))
            .map(|(action, _)| *action)
    }
}
