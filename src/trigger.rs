//! Streaming multi-pattern trigger engine.
//!
//! A [`TriggerEngine`] holds any number of named patterns (flat, non-empty
//! symbol sequences). Every symbol fed into the engine advances each pattern's
//! matcher independently, in registration order. Completed patterns are queued
//! and handed out by [`TriggerEngine::drain`].
//!
//! ## Matching rule
//! For each pattern, per symbol `s`:
//! 1. A running matcher either advances (`sequence[i] == s`) or drops back to idle.
//! 2. An idle matcher (including one that just failed on `s`) starts over if
//!    `sequence[0] == s`.
//! 3. A matcher that reached the end of its sequence fires and goes idle.
//!
//! Step 2 means a failed continuation never swallows the symbol that broke it:
//! `["a", "b"]` fed `a a b` fires once, and a one-symbol pattern fires on every
//! matching symbol.

use crate::error::TriggerError;
use crate::symbol::Symbol;
use tracing::{debug, trace};

/// Progress of one pattern's matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MatcherState {
    #[default]
    Idle,
    /// Index of the next symbol expected.
    Running(usize),
}

/// A registered pattern and its matcher.
#[derive(Clone, Debug)]
pub struct TriggerPattern {
    name: String,
    sequence: Vec<Symbol>,
    state: MatcherState,
}

impl TriggerPattern {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &[Symbol] {
        &self.sequence
    }

    pub fn state(&self) -> MatcherState {
        self.state
    }

    /// Run one symbol through the matcher. Returns `true` if the pattern completed.
    fn step(&mut self, symbol: &str) -> bool {
        if let MatcherState::Running(next) = self.state {
            self.state = if self.sequence[next] == *symbol {
                MatcherState::Running(next + 1)
            } else {
                MatcherState::Idle
            };
        }

        if self.state == MatcherState::Idle && self.sequence[0] == *symbol {
            self.state = MatcherState::Running(1);
        }

        match self.state {
            MatcherState::Running(next) if next == self.sequence.len() => {
                self.state = MatcherState::Idle;
                true
            }
            _ => false,
        }
    }
}

/// Owns every pattern, matcher and the queue of fired trigger names.
#[derive(Clone, Debug, Default)]
pub struct TriggerEngine {
    patterns: Vec<TriggerPattern>,
    pending: Vec<String>,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern under a unique name. It starts idle.
    pub fn add<I, S>(&mut self, name: impl Into<String>, sequence: I) -> Result<(), TriggerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let name = name.into();
        let sequence: Vec<Symbol> = sequence.into_iter().map(Into::into).collect();

        if sequence.is_empty() {
            return Err(TriggerError::EmptySequence(name));
        }
        if self.contains(&name) {
            return Err(TriggerError::DuplicateName(name));
        }

        debug!(trigger = %name, len = sequence.len(), "registered trigger");
        self.patterns.push(TriggerPattern {
            name,
            sequence,
            state: MatcherState::Idle,
        });
        Ok(())
    }

    /// Drop a pattern and its matcher state. Already-queued completions stay queued.
    ///
    /// Returns `false` if no pattern had that name.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.patterns.len();
        self.patterns.retain(|p| p.name != name);
        before != self.patterns.len()
    }

    /// Drop every pattern. Already-queued completions stay queued.
    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&TriggerPattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// Registered patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &TriggerPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Advance every matcher by one symbol, queueing any that complete.
    pub fn feed(&mut self, symbol: &str) {
        for pattern in &mut self.patterns {
            if pattern.step(symbol) {
                trace!(trigger = %pattern.name, symbol, "trigger completed");
                self.pending.push(pattern.name.clone());
            }
        }
    }

    /// Feed a batch of symbols in order. Equivalent to calling [`feed`](Self::feed)
    /// for each one.
    pub fn feed_all<I, S>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for symbol in symbols {
            self.feed(symbol.as_ref());
        }
    }

    /// Number of completions waiting to be drained.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Take every completion queued since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}
