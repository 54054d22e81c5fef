use crate::action::{KeyAction, KeySink};
use tracing::info;

/// A sink that logs every dispatched action instead of sending keys.
///
/// Handy for dry runs and for checking a profile against a real controller.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        LogSink
    }
}

impl KeySink for LogSink {
    type Error = std::convert::Infallible;

    fn send(&mut self, trigger: &str, action: &KeyAction) -> Result<(), Self::Error> {
        info!(trigger, action = %action, mask = action.mask(), "key action");
        Ok(())
    }
}
