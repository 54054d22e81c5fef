//! Canonical string symbols fed to the trigger engine.

use crate::event::InputKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Canonical text form of one filtered input event.
///
/// Buttons map to their (1-based) number, axes to a direction name
/// (`"up"`, `"right"`, `"down"`, `"left"`, `"center"`). Two events with the same
/// symbol are indistinguishable to the matcher.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(text: impl Into<String>) -> Self {
        Symbol(text.into())
    }

    /// Map an event kind to its symbol. Init reports have none.
    pub fn from_kind(kind: &InputKind) -> Option<Self> {
        match kind {
            InputKind::Button { number, .. } => Some(Symbol(number.to_string())),
            InputKind::Axis { direction, .. } => Some(Symbol(direction.as_str().to_owned())),
            InputKind::Init { .. } => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol(s.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol(s)
    }
}

/// Accepts strings and, for button symbols, bare integers (`sequence = [1, "up"]`).
impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Symbol(s),
            Repr::Number(n) => Symbol(n.to_string()),
        })
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
