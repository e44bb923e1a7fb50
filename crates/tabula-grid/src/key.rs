//! Key binding definitions and the key map trait feeding the help surface.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key binding that maps one or more key combinations to a described action.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The set of key combinations that trigger this binding.
    pub keys: Vec<KeyCombination>,
    /// A human-readable description of the action this binding performs.
    pub description: String,
    /// Whether this binding is currently active. Disabled bindings never match.
    pub enabled: bool,
}

/// A single key press with the modifiers it requires.
///
/// Shift is treated as an *extension* modifier: a combination without Shift
/// still matches when Shift is held, so Shift+Down reaches the plain Down
/// binding and the handler decides what Shift means. Every other modifier
/// must match exactly, which keeps Home and Ctrl+Home apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombination {
    /// The base key code (e.g. a character, arrow key, or function key).
    pub code: KeyCode,
    /// Modifier keys that must be held alongside the base key.
    pub modifiers: KeyModifiers,
}

impl Binding {
    /// Create a new binding for a single key combination with the given description.
    pub fn new(key: KeyCombination, description: impl Into<String>) -> Self {
        Self {
            keys: vec![key],
            description: description.into(),
            enabled: true,
        }
    }

    /// Create a new binding for multiple key combinations with the given description.
    pub fn with_keys(keys: Vec<KeyCombination>, description: impl Into<String>) -> Self {
        Self {
            keys,
            description: description.into(),
            enabled: true,
        }
    }

    /// Return whether the given key event matches any of this binding's key combinations.
    /// Always returns `false` when the binding is disabled.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.enabled && self.keys.iter().any(|k| k.matches(event))
    }

    /// Set whether this binding is enabled. Disabled bindings never match key events.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Label for help output, e.g. `"ctrl+home/ctrl+end"`.
    pub fn keys_label(&self) -> String {
        self.keys
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl KeyCombination {
    /// Create a key combination with no modifier keys.
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Create a key combination with the Ctrl modifier.
    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// Create a key combination with the Shift modifier.
    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    /// Create a key combination with an explicit set of modifier keys.
    pub fn with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Whether `event` triggers this combination.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if !codes_equal(&self.code, &event.code) {
            return false;
        }
        let required_shift = self.modifiers.contains(KeyModifiers::SHIFT);
        if required_shift && !event.modifiers.contains(KeyModifiers::SHIFT) {
            return false;
        }
        event.modifiers.difference(KeyModifiers::SHIFT)
            == self.modifiers.difference(KeyModifiers::SHIFT)
    }
}

// Terminals report Ctrl+A as either 'a' or 'A' depending on the keyboard protocol.
fn codes_equal(a: &KeyCode, b: &KeyCode) -> bool {
    match (a, b) {
        (KeyCode::Char(x), KeyCode::Char(y)) => x.eq_ignore_ascii_case(y),
        _ => a == b,
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("shift+")?;
        }
        match self.code {
            KeyCode::Up => f.write_str("↑"),
            KeyCode::Down => f.write_str("↓"),
            KeyCode::Left => f.write_str("←"),
            KeyCode::Right => f.write_str("→"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pgup"),
            KeyCode::PageDown => f.write_str("pgdn"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::F(n) => write!(f, "f{n}"),
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_lowercase()),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Trait for types that define key bindings, enabling integration with the
/// [`ContextHelp`](crate::help::ContextHelp) surface.
pub trait KeyMap {
    /// Return a flat list of the most important bindings for the short help line.
    fn short_help(&self) -> Vec<&Binding>;
    /// Return bindings grouped by category for the full help overlay.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}
