//! Serializable trigger profiles.
//!
//! A profile names the device to read, the filter flags, and the triggers to
//! register, each with an optional key action: one key string or an array of
//! keys sent in order. Profiles are plain TOML or JSON:
//!
//! ```toml
//! name = "desktop"
//! device = "/dev/input/js0"
//!
//! [filter]
//! skip_button_release = true
//! skip_axis_center = true
//!
//! [[triggers]]
//! name = "next_workspace"
//! sequence = ["right", "right"]
//! action = "control+mod1+Right"
//!
//! [[triggers]]
//! name = "close"
//! sequence = [1, 1, "down"]
//! action = "mod1+F4"
//!
//! [[triggers]]
//! name = "paste_and_run"
//! sequence = [2, 2]
//! action = ["control+v", "Return"]
//! ```

use crate::action::KeySequence;
use crate::error::{ProfileError, TriggerError};
use crate::filter::FilterConfig;
use crate::symbol::Symbol;
use crate::trigger::TriggerEngine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One named gesture and what it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerBinding {
    pub name: String,
    pub sequence: Vec<Symbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<KeySequence>,
}

/// Serializable set of trigger bindings plus device settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Device node to open; the host picks a default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub triggers: Vec<TriggerBinding>,
}

impl TriggerProfile {
    /// Load a profile, choosing the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Self::from_toml_str(&text),
            "json" => Self::from_json_str(&text),
            _ => Err(ProfileError::UnsupportedFormat(ext)),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ProfileError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Build an engine with every trigger registered, in profile order.
    ///
    /// Fails on the first empty or duplicate trigger.
    pub fn build_engine(&self) -> Result<TriggerEngine, TriggerError> {
        let mut engine = TriggerEngine::new();
        for binding in &self.triggers {
            engine.add(binding.name.as_str(), binding.sequence.iter().cloned())?;
        }
        Ok(engine)
    }

    /// Trigger name to keys, for bindings with at least one key.
    pub fn actions(&self) -> HashMap<String, KeySequence> {
        self.triggers
            .iter()
            .filter_map(|b| match &b.action {
                Some(keys) if !keys.is_empty() => Some((b.name.clone(), keys.clone())),
                _ => None,
            })
            .collect()
    }
}
