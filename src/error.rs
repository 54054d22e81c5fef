//! Error types.
//!
//! Each stage of the pipeline has its own error enum so callers can tell a
//! missing device apart from a bad trigger definition:
//! - [`DeviceError`]: opening or reading the device handle
//! - [`DecodeError`]: a single malformed record (dropped, never fatal to the stream)
//! - [`TriggerError`]: registration-time misuse of the trigger engine
//! - [`ActionError`]: a key-action string that cannot be parsed
//! - [`ProfileError`]: loading a trigger profile from disk or text
//! - [`DispatchError`]: a pipeline step failed while dispatching actions

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to open or read an input device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device node is missing or could not be opened.
    #[error("failed to open input device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An I/O error while waiting for or reading records.
    #[error("failed to read from input device: {0}")]
    Read(#[source] io::Error),
}

/// A record that could not be turned into an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("record has {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    /// Axis motion on an axis that has no direction mapping.
    #[error("axis {0} has no direction mapping")]
    UnmappedAxis(u8),
}

/// Rejected trigger registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("trigger `{0}` has an empty sequence")]
    EmptySequence(String),

    #[error("trigger `{0}` is already registered")]
    DuplicateName(String),
}

/// Rejected key-action string (`"modifier+...+key"`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("key action is empty")]
    Empty,

    #[error("key action `{0}` contains an empty part")]
    EmptyPart(String),

    #[error("key action `{0}` has no key, only modifiers")]
    MissingKey(String),

    #[error("key action `{action}` names more than one key (`{first}` and `{second}`)")]
    MultipleKeys {
        action: String,
        first: String,
        second: String,
    },
}

/// Failure to load or apply a trigger profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML profile: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON profile: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported profile format `{0}` (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Failure while reading input or handing an action to a [`KeySink`](crate::action::KeySink).
#[derive(Debug, Error)]
pub enum DispatchError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The sink rejected a key of `trigger`.
    ///
    /// `remaining` lists the triggers that fired after `trigger` in the same
    /// batch; none of their keys were sent.
    #[error("failed to send action for trigger `{trigger}`: {source}")]
    Sink {
        trigger: String,
        remaining: Vec<String>,
        #[source]
        source: E,
    },
}
