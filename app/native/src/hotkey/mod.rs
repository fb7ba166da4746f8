//! Global hotkey for Window Scatter.
//!
//! A chord is written as `+`-separated modifier names followed by exactly one
//! key, e.g. `"Win+W"` or `"Ctrl+Alt+F5"`. Parsing is case-insensitive and
//! ignores whitespace around tokens.
//!
//! The chord is parsed once at startup into a [`HotkeySpec`]; the
//! [`interceptor`] module matches raw keyboard events against it.

pub mod interceptor;

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use smallvec::SmallVec;
use thiserror::Error;

pub use interceptor::{HotkeyInterceptor, KeyDisposition, KeyEvent, KeyEventKind, ModifierKeyState};

/// Chord used when the configured one cannot be parsed.
pub const DEFAULT_HOTKEY: &str = "Win+W";

/// Windows virtual key codes used by the hotkey grammar and the interceptor.
pub mod vk {
    pub const BACK: u16 = 0x08;
    pub const TAB: u16 = 0x09;
    pub const RETURN: u16 = 0x0D;
    pub const SHIFT: u16 = 0x10;
    pub const CONTROL: u16 = 0x11;
    pub const MENU: u16 = 0x12;
    pub const ESCAPE: u16 = 0x1B;
    pub const SPACE: u16 = 0x20;
    pub const PRIOR: u16 = 0x21;
    pub const NEXT: u16 = 0x22;
    pub const END: u16 = 0x23;
    pub const HOME: u16 = 0x24;
    pub const LEFT: u16 = 0x25;
    pub const UP: u16 = 0x26;
    pub const RIGHT: u16 = 0x27;
    pub const DOWN: u16 = 0x28;
    pub const INSERT: u16 = 0x2D;
    pub const DELETE: u16 = 0x2E;
    pub const KEY_0: u16 = 0x30;
    pub const KEY_A: u16 = 0x41;
    pub const KEY_W: u16 = 0x57;
    pub const LWIN: u16 = 0x5B;
    pub const RWIN: u16 = 0x5C;
    pub const F1: u16 = 0x70;
    pub const F12: u16 = 0x7B;
    pub const LSHIFT: u16 = 0xA0;
    pub const RSHIFT: u16 = 0xA1;
    pub const LCONTROL: u16 = 0xA2;
    pub const RCONTROL: u16 = 0xA3;
    pub const LMENU: u16 = 0xA4;
    pub const RMENU: u16 = 0xA5;
}

bitflags! {
    /// Modifier mask of a chord.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 0x01;
        const ALT = 0x02;
        const SHIFT = 0x04;
        const WIN = 0x08;
    }
}

impl Modifiers {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "ctrl" | "control" => Some(Self::CTRL),
            "alt" => Some(Self::ALT),
            "shift" => Some(Self::SHIFT),
            "win" | "windows" | "meta" | "super" => Some(Self::WIN),
            _ => None,
        }
    }
}

/// Errors that can occur while parsing a chord.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HotkeyError {
    /// The string is empty or only whitespace.
    #[error("Hotkey is empty")]
    Empty,
    /// A `+` separated token is empty, as in `"Ctrl++W"`.
    #[error("Hotkey '{0}' contains an empty token")]
    EmptyToken(String),
    /// The chord ends with a modifier.
    #[error("Hotkey '{0}' has no key, only modifiers")]
    MissingKey(String),
    /// A non-modifier token appears before the last position.
    #[error("Hotkey '{hotkey}' has more than one key ('{extra}')")]
    MultipleKeys { hotkey: String, extra: String },
    /// The key token is not recognized.
    #[error("Unknown key '{0}'")]
    UnknownKey(String),
}

/// A parsed chord: modifier mask plus one non-modifier virtual key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeySpec {
    modifiers: Modifiers,
    key: u16,
}

impl HotkeySpec {
    /// Creates a chord from its parts.
    #[must_use]
    pub const fn new(modifiers: Modifiers, key: u16) -> Self { Self { modifiers, key } }

    /// Parses a chord string.
    ///
    /// # Errors
    ///
    /// Returns a [`HotkeyError`] if the string is empty, has no key, has more
    /// than one key, or names an unknown key.
    pub fn parse(hotkey: &str) -> Result<Self, HotkeyError> {
        if hotkey.trim().is_empty() {
            return Err(HotkeyError::Empty);
        }

        let tokens: SmallVec<[String; 4]> =
            hotkey.split('+').map(|t| t.trim().to_ascii_lowercase()).collect();
        if tokens.iter().any(String::is_empty) {
            return Err(HotkeyError::EmptyToken(hotkey.to_string()));
        }

        let Some((last, leading)) = tokens.split_last() else {
            return Err(HotkeyError::Empty);
        };

        let mut modifiers = Modifiers::empty();
        for token in leading {
            match Modifiers::from_token(token) {
                Some(modifier) => modifiers |= modifier,
                None => {
                    return Err(HotkeyError::MultipleKeys {
                        hotkey: hotkey.to_string(),
                        extra: token.clone(),
                    });
                }
            }
        }

        if Modifiers::from_token(last).is_some() {
            return Err(HotkeyError::MissingKey(hotkey.to_string()));
        }

        let key = key_code(last).ok_or_else(|| HotkeyError::UnknownKey(last.clone()))?;
        Ok(Self { modifiers, key })
    }

    /// Parses `hotkey`, falling back to [`DEFAULT_HOTKEY`] with a warning.
    #[must_use]
    pub fn parse_or_default(hotkey: &str) -> Self {
        Self::parse(hotkey).unwrap_or_else(|err| {
            tracing::warn!(error = %err, hotkey, "scatter: invalid hotkey, using {DEFAULT_HOTKEY}");
            Self::default()
        })
    }

    /// Modifier mask.
    #[must_use]
    pub const fn modifiers(&self) -> Modifiers { self.modifiers }

    /// Virtual key code of the main key.
    #[must_use]
    pub const fn key(&self) -> u16 { self.key }

    /// Whether `key` pressed with exactly `held` modifiers is this chord.
    #[must_use]
    pub fn matches(&self, key: u16, held: Modifiers) -> bool { key == self.key && held == self.modifiers }
}

impl Default for HotkeySpec {
    fn default() -> Self { Self::new(Modifiers::WIN, vk::KEY_W) }
}

impl FromStr for HotkeySpec {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::WIN, "Win"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", key_name(self.key))
    }
}

/// Virtual key code of a lowercase key token.
fn key_code(token: &str) -> Option<u16> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return match c {
            'a'..='z' => Some(vk::KEY_A + (c as u16 - 'a' as u16)),
            '0'..='9' => Some(vk::KEY_0 + (c as u16 - '0' as u16)),
            _ => None,
        };
    }

    let named = match token {
        "tab" => vk::TAB,
        "enter" | "return" => vk::RETURN,
        "space" => vk::SPACE,
        "esc" | "escape" => vk::ESCAPE,
        "backspace" => vk::BACK,
        "delete" | "del" => vk::DELETE,
        "insert" | "ins" => vk::INSERT,
        "home" => vk::HOME,
        "end" => vk::END,
        "pageup" => vk::PRIOR,
        "pagedown" => vk::NEXT,
        "left" => vk::LEFT,
        "up" => vk::UP,
        "right" => vk::RIGHT,
        "down" => vk::DOWN,
        _ => return function_key(token),
    };
    Some(named)
}

fn function_key(token: &str) -> Option<u16> {
    let n: u16 = token.strip_prefix('f')?.parse().ok()?;
    (1..=12).contains(&n).then(|| vk::F1 + n - 1)
}

/// Display name of a virtual key code.
#[must_use]
pub fn key_name(key: u16) -> String {
    match key {
        vk::TAB => "Tab".to_string(),
        vk::RETURN => "Enter".to_string(),
        vk::SPACE => "Space".to_string(),
        vk::ESCAPE => "Esc".to_string(),
        vk::BACK => "Backspace".to_string(),
        vk::DELETE => "Delete".to_string(),
        vk::INSERT => "Insert".to_string(),
        vk::HOME => "Home".to_string(),
        vk::END => "End".to_string(),
        vk::PRIOR => "PageUp".to_string(),
        vk::NEXT => "PageDown".to_string(),
        vk::LEFT => "Left".to_string(),
        vk::UP => "Up".to_string(),
        vk::RIGHT => "Right".to_string(),
        vk::DOWN => "Down".to_string(),
        vk::F1..=vk::F12 => format!("F{}", key - vk::F1 + 1),
        0x30..=0x39 | 0x41..=0x5A => char::from_u32(u32::from(key)).map_or_else(String::new, String::from),
        other => format!("0x{other:02X}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_chord() {
        let spec = HotkeySpec::parse("Win+W").unwrap();
        assert_eq!(spec.modifiers(), Modifiers::WIN);
        assert_eq!(spec.key(), vk::KEY_W);
        assert_eq!(spec, HotkeySpec::default());
    }

    #[test]
    fn test_parse_is_case_and_space_insensitive() {
        assert_eq!(
            HotkeySpec::parse(" ctrl + ALT + f5 ").unwrap(),
            HotkeySpec::new(Modifiers::CTRL | Modifiers::ALT, 0x74)
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(
            HotkeySpec::parse("Control+Windows+Tab").unwrap(),
            HotkeySpec::new(Modifiers::CTRL | Modifiers::WIN, vk::TAB)
        );
        assert_eq!(HotkeySpec::parse("Meta+Escape").unwrap().key(), vk::ESCAPE);
        assert_eq!(HotkeySpec::parse("Super+Return").unwrap().key(), vk::RETURN);
    }

    #[test]
    fn test_parse_digits_letters_and_named_keys() {
        assert_eq!(HotkeySpec::parse("Alt+7").unwrap().key(), 0x37);
        assert_eq!(HotkeySpec::parse("Alt+z").unwrap().key(), 0x5A);
        assert_eq!(HotkeySpec::parse("Alt+PageDown").unwrap().key(), vk::NEXT);
        assert_eq!(HotkeySpec::parse("Alt+F12").unwrap().key(), vk::F12);
        assert_eq!(HotkeySpec::parse("Shift+Space").unwrap().key(), vk::SPACE);
    }

    #[test]
    fn test_parse_key_without_modifiers() {
        let spec = HotkeySpec::parse("F9").unwrap();
        assert!(spec.modifiers().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(HotkeySpec::parse(""), Err(HotkeyError::Empty));
        assert_eq!(HotkeySpec::parse("   "), Err(HotkeyError::Empty));
        assert!(matches!(HotkeySpec::parse("Ctrl++W"), Err(HotkeyError::EmptyToken(_))));
        assert!(matches!(HotkeySpec::parse("Ctrl+Alt"), Err(HotkeyError::MissingKey(_))));
        assert!(matches!(HotkeySpec::parse("Ctrl+A+B"), Err(HotkeyError::MultipleKeys { .. })));
        assert_eq!(HotkeySpec::parse("Ctrl+F13"), Err(HotkeyError::UnknownKey("f13".to_string())));
        assert!(matches!(HotkeySpec::parse("Ctrl+Hyper"), Err(HotkeyError::UnknownKey(_))));
    }

    #[test]
    fn test_parse_or_default_falls_back() {
        assert_eq!(HotkeySpec::parse_or_default("Ctrl+"), HotkeySpec::default());
        assert_eq!(HotkeySpec::parse_or_default("Alt+Q").key(), 0x51);
    }

    #[test]
    fn test_display_is_canonical() {
        let spec: HotkeySpec = "win+shift+ctrl+left".parse().unwrap();
        assert_eq!(spec.to_string(), "Ctrl+Shift+Win+Left");
        assert_eq!(HotkeySpec::default().to_string(), "Win+W");
        assert_eq!(HotkeySpec::parse("alt+f4").unwrap().to_string(), "Alt+F4");
    }

    #[test]
    fn test_display_parses_back() {
        for chord in ["Ctrl+Alt+Delete", "Win+Tab", "Shift+9", "Alt+Esc"] {
            let spec = HotkeySpec::parse(chord).unwrap();
            assert_eq!(HotkeySpec::parse(&spec.to_string()).unwrap(), spec);
        }
    }

    #[test]
    fn test_matches_requires_exact_modifiers() {
        let spec = HotkeySpec::default();
        assert!(spec.matches(vk::KEY_W, Modifiers::WIN));
        assert!(!spec.matches(vk::KEY_W, Modifiers::WIN | Modifiers::SHIFT));
        assert!(!spec.matches(vk::KEY_W, Modifiers::empty()));
        assert!(!spec.matches(vk::TAB, Modifiers::WIN));
    }
}
