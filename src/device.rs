use crate::error::DeviceError;
use std::time::Duration;

/// How long a read may wait for the first record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Wait until at least one record is available.
    Block,
    /// Never wait; return nothing if the device is idle.
    NonBlocking,
    /// Wait up to the given duration for the first record.
    Timeout(Duration),
}

/// A source of raw joystick records.
///
/// Implementations never block inside [`read_chunk`](Device::read_chunk); all
/// waiting happens in [`wait_readable`](Device::wait_readable).
pub trait Device {
    /// Wait according to `policy`. Returns `true` once a record can be read
    /// without blocking, `false` if the policy expired first.
    fn wait_readable(&mut self, policy: WaitPolicy) -> Result<bool, DeviceError>;

    /// Read at most one record into `buf`.
    ///
    /// Returns `Ok(None)` when nothing is pending, otherwise the number of bytes
    /// delivered (which may differ from a full record on a misbehaving device).
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<Option<usize>, DeviceError>;

    fn name(&self) -> &str;
    fn id(&self) -> &str;
}
