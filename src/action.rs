//! Key actions and the key-injection boundary.
//!
//! A trigger may carry a [`KeySequence`]: one or more [`KeyAction`]s, each
//! written as `"modifier+...+key"`, e.g. `"control+shift+Up"` or `"mod1+F4"`,
//! and sent in order. Delivering the keystroke to a window is
//! the job of a [`KeySink`] supplied by the host application; this crate has no
//! windowing-system dependency.
//!
//! ## Modifiers
//! `shift`, `control` (alias `ctrl`), `lock`, `mod1` (alias `alt`), `mod2`,
//! `mod3`, `mod4`, `mod5`. Matched case-insensitively.
//!
//! The key itself is kept verbatim (keysym names are case-sensitive: `Up`, `F4`,
//! `d`).

use crate::error::ActionError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Keyboard modifier, in X11 mask order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Shift,
    Lock,
    Control,
    Mod1,
    Mod2,
    Mod3,
    Mod4,
    Mod5,
}

impl Modifier {
    fn parse(part: &str) -> Option<Self> {
        let m = match part.to_ascii_lowercase().as_str() {
            "shift" => Modifier::Shift,
            "lock" => Modifier::Lock,
            "control" | "ctrl" => Modifier::Control,
            "mod1" | "alt" => Modifier::Mod1,
            "mod2" => Modifier::Mod2,
            "mod3" => Modifier::Mod3,
            "mod4" => Modifier::Mod4,
            "mod5" => Modifier::Mod5,
            _ => return None,
        };
        Some(m)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Shift => "shift",
            Modifier::Lock => "lock",
            Modifier::Control => "control",
            Modifier::Mod1 => "mod1",
            Modifier::Mod2 => "mod2",
            Modifier::Mod3 => "mod3",
            Modifier::Mod4 => "mod4",
            Modifier::Mod5 => "mod5",
        }
    }

    /// Bit in an X11-style modifier state mask.
    pub fn mask(self) -> u16 {
        1 << (self as u16)
    }
}

/// A key plus the modifiers held while it is pressed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyAction {
    modifiers: Vec<Modifier>,
    key: String,
}

impl KeyAction {
    pub fn parse(action: &str) -> Result<Self, ActionError> {
        let trimmed = action.trim();
        if trimmed.is_empty() {
            return Err(ActionError::Empty);
        }

        let mut modifiers = Vec::new();
        let mut key: Option<&str> = None;

        for part in trimmed.split('+').map(str::trim) {
            if part.is_empty() {
                return Err(ActionError::EmptyPart(action.to_owned()));
            }
            if let Some(m) = Modifier::parse(part) {
                if !modifiers.contains(&m) {
                    modifiers.push(m);
                }
                continue;
            }
            if let Some(first) = key {
                return Err(ActionError::MultipleKeys {
                    action: action.to_owned(),
                    first: first.to_owned(),
                    second: part.to_owned(),
                });
            }
            key = Some(part);
        }

        let key = key.ok_or_else(|| ActionError::MissingKey(action.to_owned()))?;
        modifiers.sort();
        Ok(Self {
            modifiers,
            key: key.to_owned(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Modifiers in canonical order, without duplicates.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Combined modifier state mask.
    pub fn mask(&self) -> u16 {
        self.modifiers.iter().fold(0, |acc, m| acc | m.mask())
    }
}

impl FromStr for KeyAction {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyAction::parse(s)
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{}+", m.as_str())?;
        }
        f.write_str(&self.key)
    }
}

impl Serialize for KeyAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        KeyAction::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Ordered key actions bound to one trigger.
///
/// Deserializes from a single action string or an array of them:
/// `"mod1+F4"` or `["shift+p", "Up", "mod2+F4"]`. A one-key sequence
/// serializes back to a plain string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<KeyAction>);

impl KeySequence {
    pub fn new(keys: Vec<KeyAction>) -> Self {
        KeySequence(keys)
    }

    /// Parse each string as a [`KeyAction`], keeping order.
    pub fn parse_all<I, S>(actions: I) -> Result<Self, ActionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        actions
            .into_iter()
            .map(|a| KeyAction::parse(a.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(KeySequence)
    }

    pub fn keys(&self) -> &[KeyAction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyAction> {
        self.0.iter()
    }
}

impl From<KeyAction> for KeySequence {
    fn from(action: KeyAction) -> Self {
        KeySequence(vec![action])
    }
}

impl FromIterator<KeyAction> for KeySequence {
    fn from_iter<I: IntoIterator<Item = KeyAction>>(iter: I) -> Self {
        KeySequence(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a KeySequence {
    type Item = &'a KeyAction;
    type IntoIter = std::slice::Iter<'a, KeyAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, action) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}

impl Serialize for KeySequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => single.serialize(serializer),
            keys => keys.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for KeySequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Many(Vec<String>),
        }

        let parsed = match Repr::deserialize(deserializer)? {
            Repr::One(s) => KeySequence::parse_all([s]),
            Repr::Many(v) => KeySequence::parse_all(v),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

/// Receiver of fired triggers that have key actions attached.
///
/// Called once per key, in sequence order. Implemented by the host's key-injection client (X11, uinput, ...).
pub trait KeySink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(&mut self, trigger: &str, action: &KeyAction) -> Result<(), Self::Error>;
}

/// Sink that only remembers what it was asked to send.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub sent: Vec<(String, KeyAction)>,
}

impl KeySink for RecordingSink {
    type Error = std::convert::Infallible;

    fn send(&mut self, trigger: &str, action: &KeyAction) -> Result<(), Self::Error> {
        self.sent.push((trigger.to_owned(), action.clone()));
        Ok(())
    }
}
