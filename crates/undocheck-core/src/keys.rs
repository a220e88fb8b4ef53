//! Keyboard chords such as `Control+z` or `Enter`.
//!
//! Parsing follows the `Modifier+Modifier+Key` convention. The resolved
//! values line up with what the DevTools `Input.dispatchKeyEvent` command
//! expects: DOM `key`, DOM `code`, Windows virtual key code and modifier
//! bit flags.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Modifier bit flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ALT: Modifiers = Modifiers(1);
    pub const CONTROL: Modifiers = Modifiers(2);
    pub const META: Modifiers = Modifiers(4);
    pub const SHIFT: Modifiers = Modifiers(8);

    pub fn bits(self) -> i64 {
        i64::from(self.0)
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    fn parse(name: &str) -> Option<Modifiers> {
        match name.to_ascii_lowercase().as_str() {
            "alt" | "option" => Some(Modifiers::ALT),
            "control" | "ctrl" => Some(Modifiers::CONTROL),
            "meta" | "cmd" | "command" => Some(Modifiers::META),
            "shift" => Some(Modifiers::SHIFT),
            _ => None,
        }
    }

    fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for (flag, name) in [
            (Modifiers::CONTROL, "Control"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::META, "Meta"),
            (Modifiers::SHIFT, "Shift"),
        ] {
            if self.contains(flag) {
                names.push(name);
            }
        }
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Letter, digit or other single printable character
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    fn parse(name: &str) -> Option<Key> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(if c == ' ' { Key::Space } else { Key::Char(c) });
        }

        match name.to_ascii_lowercase().as_str() {
            "enter" | "return" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            "escape" | "esc" => Some(Key::Escape),
            "backspace" => Some(Key::Backspace),
            "delete" | "del" => Some(Key::Delete),
            "space" => Some(Key::Space),
            "arrowup" | "up" => Some(Key::ArrowUp),
            "arrowdown" | "down" => Some(Key::ArrowDown),
            "arrowleft" | "left" => Some(Key::ArrowLeft),
            "arrowright" | "right" => Some(Key::ArrowRight),
            _ => None,
        }
    }

    /// DOM `KeyboardEvent.code`
    pub fn code(self) -> String {
        match self {
            Key::Char(c) if c.is_ascii_alphabetic() => format!("Key{}", c.to_ascii_uppercase()),
            Key::Char(c) if c.is_ascii_digit() => format!("Digit{}", c),
            Key::Char(c) => c.to_string(),
            Key::Enter => "Enter".to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Escape => "Escape".to_string(),
            Key::Backspace => "Backspace".to_string(),
            Key::Delete => "Delete".to_string(),
            Key::Space => "Space".to_string(),
            Key::ArrowUp => "ArrowUp".to_string(),
            Key::ArrowDown => "ArrowDown".to_string(),
            Key::ArrowLeft => "ArrowLeft".to_string(),
            Key::ArrowRight => "ArrowRight".to_string(),
        }
    }

    pub fn windows_virtual_key_code(self) -> i64 {
        match self {
            Key::Char(c) if c.is_ascii_alphanumeric() => i64::from(c.to_ascii_uppercase() as u8),
            Key::Char(_) => 0,
            Key::Enter => 13,
            Key::Tab => 9,
            Key::Escape => 27,
            Key::Backspace => 8,
            Key::Delete => 46,
            Key::Space => 32,
            Key::ArrowLeft => 37,
            Key::ArrowUp => 38,
            Key::ArrowRight => 39,
            Key::ArrowDown => 40,
        }
    }
}

/// A key pressed together with zero or more modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl KeyChord {
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    pub fn key(key: Key) -> Self {
        Self::new(Modifiers::NONE, key)
    }

    /// DOM `KeyboardEvent.key` as the page will observe it
    pub fn dom_key(&self) -> String {
        match self.key {
            Key::Char(c) if self.modifiers.contains(Modifiers::SHIFT) => {
                c.to_uppercase().collect()
            }
            Key::Char(c) => c.to_string(),
            Key::Space => " ".to_string(),
            other => other.code(),
        }
    }

    /// Text inserted by the key press, if any. Chords with Control, Alt or
    /// Meta never insert text.
    pub fn text(&self) -> Option<String> {
        let command = Modifiers(Modifiers::CONTROL.0 | Modifiers::ALT.0 | Modifiers::META.0);
        if self.modifiers.0 & command.0 != 0 {
            return None;
        }
        match self.key {
            Key::Char(_) | Key::Space => Some(self.dom_key()),
            Key::Enter => Some("\r".to_string()),
            _ => None,
        }
    }
}

impl FromStr for KeyChord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidChord("empty chord".to_string()));
        }

        // A trailing "++" means the key itself is '+'
        let (prefix, key_name) = if let Some(prefix) = s.strip_suffix("++") {
            (Some(prefix), "+")
        } else {
            match s.rsplit_once('+') {
                Some((prefix, key)) => (Some(prefix), key),
                None => (None, s),
            }
        };

        let mut modifiers = Modifiers::NONE;
        if let Some(prefix) = prefix {
            for name in prefix.split('+') {
                let modifier = Modifiers::parse(name.trim()).ok_or_else(|| {
                    Error::InvalidChord(format!("unknown modifier '{}' in '{}'", name, s))
                })?;
                modifiers.insert(modifier);
            }
        }

        let key = Key::parse(key_name.trim())
            .ok_or_else(|| Error::InvalidChord(format!("unknown key '{}' in '{}'", key_name, s)))?;

        Ok(KeyChord { modifiers, key })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .modifiers
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();
        parts.push(match self.key {
            Key::Char(c) => c.to_string(),
            Key::Space => "Space".to_string(),
            other => other.code(),
        });
        write!(f, "{}", parts.join("+"))
    }
}
