//! Suppression of release/centering events and elapsed-time stamping.

use crate::event::{Direction, InputEvent, InputKind};
use serde::{Deserialize, Serialize};

/// Which "return to rest" events are dropped before symbol mapping.
///
/// Both flags default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Drop `Button { pressed: false }`.
    pub skip_button_release: bool,
    /// Drop `Axis { direction: Center }`.
    pub skip_axis_center: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            skip_button_release: true,
            skip_axis_center: true,
        }
    }
}

impl FilterConfig {
    /// Pass every button and axis event through.
    pub fn pass_all() -> Self {
        Self {
            skip_button_release: false,
            skip_axis_center: false,
        }
    }

    /// Whether a decoded event kind should reach the trigger engine.
    pub fn admits(&self, kind: &InputKind) -> bool {
        match kind {
            InputKind::Button { pressed, .. } => *pressed || !self.skip_button_release,
            InputKind::Axis { direction, .. } => {
                *direction != Direction::Center || !self.skip_axis_center
            }
            InputKind::Init { .. } => false,
        }
    }
}

/// Stateful filter: applies a [`FilterConfig`] and stamps `elapsed` relative
/// to the last event it let through.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    config: FilterConfig,
    last_passed: Option<u32>,
}

impl EventFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            last_passed: None,
        }
    }

    pub fn config(&self) -> FilterConfig {
        self.config
    }

    /// Returns the event to forward, or `None` if it is suppressed.
    ///
    /// Suppressed events do not move the elapsed-time reference.
    pub fn apply(&mut self, timestamp: u32, kind: InputKind) -> Option<InputEvent> {
        if !self.config.admits(&kind) {
            return None;
        }

        // Driver timestamps are a wrapping millisecond counter.
        let elapsed = self
            .last_passed
            .map_or(0, |last| timestamp.wrapping_sub(last));
        self.last_passed = Some(timestamp);

        Some(InputEvent {
            timestamp,
            elapsed,
            kind,
        })
    }
}
