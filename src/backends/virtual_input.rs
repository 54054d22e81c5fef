//! In-memory device for tests, demos and record replay.

use crate::device::{Device, WaitPolicy};
use crate::error::DeviceError;
use crate::event::{RawRecord, ABS_X, ABS_Y, JS_EVENT_AXIS, JS_EVENT_BUTTON, JS_EVENT_INIT};
use std::collections::VecDeque;
use std::io;

/// A device whose records are queued by hand.
///
/// Each queued chunk is delivered by one [`Device::read_chunk`] call, so
/// malformed (short) records can be injected with [`push_bytes`](Self::push_bytes).
/// Chunks longer than the caller's buffer are truncated.
/// Read errors can be queued in order with [`push_read_error`](Self::push_read_error).
/// Waiting never sleeps: the device is readable exactly when its queue is non-empty.
#[derive(Debug, Default)]
pub struct VirtualDevice {
    id: String,
    name: String,
    chunks: VecDeque<Chunk>,
    clock: u32,
}

#[derive(Debug)]
enum Chunk {
    Bytes(Vec<u8>),
    Fault,
}

impl VirtualDevice {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Queue a raw record.
    pub fn push_record(&mut self, record: RawRecord) {
        self.chunks.push_back(Chunk::Bytes(record.as_bytes().to_vec()));
    }

    /// Queue arbitrary bytes as one read.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.chunks.push_back(Chunk::Bytes(bytes.to_vec()));
    }

    /// Make the next read fail with an I/O error, ahead of anything queued.
    pub fn fail_next_read(&mut self) {
        self.chunks.push_front(Chunk::Fault);
    }

    /// Queue an I/O error behind the records already queued.
    pub fn push_read_error(&mut self) {
        self.chunks.push_back(Chunk::Fault);
    }

    /// Advance the virtual clock used for timestamps of convenience records.
    pub fn advance(&mut self, millis: u32) {
        self.clock = self.clock.wrapping_add(millis);
    }

    pub fn pending_records(&self) -> usize {
        self.chunks.len()
    }

    /// Queue the driver's initial-state burst for `buttons` buttons and `axes` axes.
    pub fn push_init_burst(&mut self, buttons: u8, axes: u8) {
        for number in 0..buttons {
            self.push_record(RawRecord::new(self.clock, 0, JS_EVENT_INIT | JS_EVENT_BUTTON, number));
        }
        for number in 0..axes {
            self.push_record(RawRecord::new(self.clock, 0, JS_EVENT_INIT | JS_EVENT_AXIS, number));
        }
    }

    /// Convenience: press a button (0-based device index).
    pub fn press_button(&mut self, button: u8) {
        self.push_record(RawRecord::new(self.clock, 1, JS_EVENT_BUTTON, button));
    }

    pub fn release_button(&mut self, button: u8) {
        self.push_record(RawRecord::new(self.clock, 0, JS_EVENT_BUTTON, button));
    }

    /// Convenience: set an axis value.
    pub fn move_axis(&mut self, axis: u8, value: i16) {
        self.push_record(RawRecord::new(self.clock, value, JS_EVENT_AXIS, axis));
    }

    /// Deflect the main stick fully: `dx`/`dy` in `-1..=1` (negative = left/up).
    pub fn tilt(&mut self, dx: i8, dy: i8) {
        if dx != 0 {
            self.move_axis(ABS_X, i16::from(dx.signum()) * i16::MAX);
        }
        if dy != 0 {
            self.move_axis(ABS_Y, i16::from(dy.signum()) * i16::MAX);
        }
    }

    /// Return the main stick to rest on both axes.
    pub fn center(&mut self) {
        self.move_axis(ABS_X, 0);
        self.move_axis(ABS_Y, 0);
    }
}

impl Device for VirtualDevice {
    fn wait_readable(&mut self, _policy: WaitPolicy) -> Result<bool, DeviceError> {
        Ok(!self.chunks.is_empty())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<Option<usize>, DeviceError> {
        match self.chunks.pop_front() {
            None => Ok(None),
            Some(Chunk::Fault) => Err(DeviceError::Read(io::Error::new(
                io::ErrorKind::Other,
                "virtual device read failure",
            ))),
            Some(Chunk::Bytes(chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(Some(n))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.id
    }
}
