//! The read → filter → symbol → match → dispatch loop.

use crate::action::{KeySequence, KeySink};
use crate::decoder::Decoder;
use crate::device::{Device, WaitPolicy};
use crate::error::{DeviceError, DispatchError, ProfileError, TriggerError};
use crate::profile::TriggerProfile;
use crate::symbol::Symbol;
use crate::trigger::TriggerEngine;
use std::collections::HashMap;
use tracing::{debug, info};

#[cfg(all(feature = "joydev", target_os = "linux"))]
use crate::backends::joydev::{JoystickDevice, DEFAULT_DEVICE_PATH};

/// Owns a decoder, a trigger engine and the key sequence of each trigger.
///
/// Everything runs on the caller's thread; the only blocking point is the
/// decoder's wait for the device.
pub struct TriggerManager<D: Device> {
    decoder: Decoder<D>,
    engine: TriggerEngine,
    actions: HashMap<String, KeySequence>,
}

#[cfg(all(feature = "joydev", target_os = "linux"))]
impl TriggerManager<JoystickDevice> {
    /// Open the profile's device (or [`DEFAULT_DEVICE_PATH`]) and install its triggers.
    pub fn open(profile: &TriggerProfile) -> Result<Self, ProfileError> {
        let path = profile.device.as_deref().unwrap_or(DEFAULT_DEVICE_PATH);
        Self::from_profile(JoystickDevice::open(path)?, profile)
    }
}

impl<D: Device> TriggerManager<D> {
    pub fn new(decoder: Decoder<D>) -> Self {
        Self {
            decoder,
            engine: TriggerEngine::new(),
            actions: HashMap::new(),
        }
    }

    /// Wrap `device` with the profile's filter and register its triggers.
    pub fn from_profile(device: D, profile: &TriggerProfile) -> Result<Self, ProfileError> {
        let engine = profile.build_engine()?;
        let decoder = Decoder::new(device, profile.filter)?;
        debug!(
            profile = %profile.name,
            device = decoder.device().id(),
            triggers = engine.len(),
            "trigger profile installed"
        );
        Ok(Self {
            decoder,
            engine,
            actions: profile.actions(),
        })
    }

    /// Register a trigger and, optionally, the keys it sends when it fires.
    pub fn bind<I, S>(
        &mut self,
        name: &str,
        sequence: I,
        action: Option<KeySequence>,
    ) -> Result<(), TriggerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.engine.add(name, sequence)?;
        match action {
            Some(keys) if !keys.is_empty() => {
                self.actions.insert(name.to_owned(), keys);
            }
            _ => {}
        }
        Ok(())
    }

    /// Remove a trigger and its action. Returns `false` if it was not registered.
    pub fn unbind(&mut self, name: &str) -> bool {
        self.actions.remove(name);
        self.engine.remove(name)
    }

    pub fn action(&self, name: &str) -> Option<&KeySequence> {
        self.actions.get(name)
    }

    pub fn engine(&self) -> &TriggerEngine {
        &self.engine
    }

    pub fn decoder(&self) -> &Decoder<D> {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut Decoder<D> {
        &mut self.decoder
    }

    /// Read pending input, run it through the engine and return every trigger
    /// fired since the last call, in firing order.
    pub fn poll_triggers(&mut self, wait: WaitPolicy) -> Result<Vec<String>, DeviceError> {
        for event in self.decoder.read(wait)? {
            if let Some(symbol) = Symbol::from_kind(&event.kind) {
                self.engine.feed(symbol.as_str());
            }
        }
        Ok(self.engine.drain())
    }

    /// Like [`poll_triggers`](Self::poll_triggers), then send each fired
    /// trigger's keys to `sink`, one call per key in sequence order. Triggers
    /// without an action are still returned.
    ///
    /// The first sink failure stops the batch. The error names the trigger
    /// being sent and carries the fired triggers after it in `remaining`;
    /// keys not yet sent are not retried, and nothing is re-queued in the
    /// engine.
    pub fn dispatch<S: KeySink>(
        &mut self,
        wait: WaitPolicy,
        sink: &mut S,
    ) -> Result<Vec<String>, DispatchError<S::Error>> {
        let fired = self.poll_triggers(wait)?;
        for (i, name) in fired.iter().enumerate() {
            let Some(keys) = self.actions.get(name) else {
                info!(trigger = %name, "trigger fired (no action)");
                continue;
            };
            info!(trigger = %name, action = %keys, "trigger fired");
            for key in keys {
                if let Err(source) = sink.send(name, key) {
                    return Err(DispatchError::Sink {
                        trigger: name.clone(),
                        remaining: fired[i + 1..].to_vec(),
                        source,
                    });
                }
            }
        }
        Ok(fired)
    }

    /// Dispatch forever, blocking on the device between batches. Returns only on error.
    pub fn run<S: KeySink>(&mut self, sink: &mut S) -> Result<(), DispatchError<S::Error>> {
        loop {
            self.dispatch(WaitPolicy::Block, sink)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{KeyAction, RecordingSink};
    use crate::backends::virtual_input::VirtualDevice;
    use crate::filter::FilterConfig;

    fn manager() -> TriggerManager<VirtualDevice> {
        let decoder = Decoder::new(VirtualDevice::new("virtual:0", "pad"), FilterConfig::default())
            .unwrap();
        TriggerManager::new(decoder)
    }

    #[test]
    fn bind_and_poll() {
        let mut m = manager();
        m.bind("one_two", ["1", "2"], None).unwrap();

        let dev = m.decoder_mut().device_mut();
        dev.press_button(0);
        dev.release_button(0);
        dev.press_button(1);

        assert_eq!(m.poll_triggers(WaitPolicy::NonBlocking).unwrap(), ["one_two"]);
        assert!(m.poll_triggers(WaitPolicy::NonBlocking).unwrap().is_empty());
    }

    #[test]
    fn dispatch_sends_actions_only_for_bound_triggers() {
        let mut m = manager();
        let close = KeyAction::parse("mod1+F4").unwrap();
        m.bind("close", ["down", "down"], Some(close.clone().into())).unwrap();
        m.bind("silent", ["down"], None).unwrap();

        let dev = m.decoder_mut().device_mut();
        dev.tilt(0, 1);
        dev.center();
        dev.tilt(0, 1);

        let mut sink = RecordingSink::default();
        let fired = m.dispatch(WaitPolicy::Block, &mut sink).unwrap();
        assert_eq!(fired, ["silent", "close", "silent"]);
        assert_eq!(sink.sent, [("close".to_string(), close)]);
    }

    #[test]
    fn unbind_drops_action() {
        let mut m = manager();
        m.bind("t", ["up"], Some(KeyAction::parse("a").unwrap().into())).unwrap();
        assert!(m.action("t").is_some());
        assert!(m.unbind("t"));
        assert!(m.action("t").is_none());
        assert!(!m.unbind("t"));
    }

    #[test]
    fn failed_bind_leaves_existing_action() {
        let mut m = manager();
        m.bind("t", ["up"], Some(KeyAction::parse("a").unwrap().into())).unwrap();
        let err = m
            .bind("t", ["down"], Some(KeyAction::parse("b").unwrap().into()))
            .unwrap_err();
        assert_eq!(err, TriggerError::DuplicateName("t".into()));
        assert_eq!(m.action("t").unwrap().keys()[0].key(), "a");
    }

    #[test]
    fn read_errors_surface_through_dispatch() {
        let mut m = manager();
        m.decoder_mut().device_mut().fail_next_read();
        let err = m
            .dispatch(WaitPolicy::Block, &mut RecordingSink::default())
            .unwrap_err();
        assert!(matches!(err, DispatchError::Device(DeviceError::Read(_))));
    }

    #[test]
    fn multi_key_actions_are_sent_in_order() {
        let mut m = manager();
        let keys = KeySequence::parse_all(["shift+p", "Up", "mod2+F4"]).unwrap();
        m.bind("combo", ["3"], Some(keys)).unwrap();
        m.bind("after", ["3"], Some(KeyAction::parse("Return").unwrap().into()))
            .unwrap();

        m.decoder_mut().device_mut().press_button(2);
        let mut sink = RecordingSink::default();
        assert_eq!(
            m.dispatch(WaitPolicy::Block, &mut sink).unwrap(),
            ["combo", "after"]
        );

        let sent: Vec<(&str, String)> = sink
            .sent
            .iter()
            .map(|(t, k)| (t.as_str(), k.to_string()))
            .collect();
        assert_eq!(
            sent,
            [
                ("combo", "shift+p".to_string()),
                ("combo", "Up".to_string()),
                ("combo", "mod2+F4".to_string()),
                ("after", "Return".to_string()),
            ]
        );
    }

    #[test]
    fn empty_key_list_binds_no_action() {
        let mut m = manager();
        m.bind("t", ["up"], Some(KeySequence::default())).unwrap();
        assert!(m.action("t").is_none());
    }

    /// Accepts a fixed number of keys, then fails every call.
    #[derive(Debug, Default)]
    struct FlakySink {
        budget: usize,
        sent: Vec<String>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("key injection refused")]
    struct Refused;

    impl KeySink for FlakySink {
        type Error = Refused;

        fn send(&mut self, _trigger: &str, action: &KeyAction) -> Result<(), Refused> {
            if self.budget == 0 {
                return Err(Refused);
            }
            self.budget -= 1;
            self.sent.push(action.to_string());
            Ok(())
        }
    }

    #[test]
    fn sink_failure_reports_unsent_triggers() {
        let mut m = manager();
        m.bind("first", ["1"], Some(KeySequence::parse_all(["a", "b"]).unwrap()))
            .unwrap();
        m.bind("plain", ["1"], None).unwrap();
        m.bind("second", ["1"], Some(KeyAction::parse("c").unwrap().into()))
            .unwrap();
        m.bind("third", ["1"], Some(KeyAction::parse("d").unwrap().into()))
            .unwrap();

        m.decoder_mut().device_mut().press_button(0);
        let mut sink = FlakySink {
            budget: 3,
            ..FlakySink::default()
        };
        match m.dispatch(WaitPolicy::Block, &mut sink).unwrap_err() {
            DispatchError::Sink {
                trigger, remaining, ..
            } => {
                assert_eq!(trigger, "third");
                assert!(remaining.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.sent, ["a", "b", "c"]);

        m.decoder_mut().device_mut().press_button(0);
        let mut sink = FlakySink {
            budget: 1,
            ..FlakySink::default()
        };
        match m.dispatch(WaitPolicy::Block, &mut sink).unwrap_err() {
            DispatchError::Sink {
                trigger, remaining, ..
            } => {
                assert_eq!(trigger, "first");
                assert_eq!(remaining, ["plain", "second", "third"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.sent, ["a"]);
    }
}
