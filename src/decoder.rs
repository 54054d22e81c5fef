//! Record decoder: device bytes in, filtered [`InputEvent`]s out.
//!
//! A [`Decoder`] owns its [`Device`] for its whole lifetime. Opening a decoder
//! swallows the driver's initial-state burst, so callers only ever see input
//! that happened after the open.
//!
//! Each [`read`](Decoder::read) waits according to its [`WaitPolicy`] for the
//! first record, then drains what is available at that instant without
//! waiting again, up to [`MAX_RECORDS_PER_READ`] records. Anything beyond the
//! cap stays queued in the device for the next call. Records come back in
//! arrival order.

use crate::device::{Device, WaitPolicy};
use crate::error::{DecodeError, DeviceError};
use crate::event::{InputEvent, InputKind, RawRecord, RECORD_LEN};
use crate::filter::{EventFilter, FilterConfig};
use tracing::{debug, trace, warn};

#[cfg(all(feature = "joydev", target_os = "linux"))]
use crate::backends::joydev::JoystickDevice;

/// Upper bound on records consumed by one drain, so a device that streams
/// continuously cannot keep [`Decoder::read`] from returning.
pub const MAX_RECORDS_PER_READ: usize = 256;

pub struct Decoder<D: Device> {
    device: D,
    filter: EventFilter,
    dropped: u64,
    // Filtered events not yet handed to the caller.
    pending: Vec<InputEvent>,
}

#[cfg(all(feature = "joydev", target_os = "linux"))]
impl Decoder<JoystickDevice> {
    /// Open a joydev node (e.g. `/dev/input/js0`) and absorb its init burst.
    pub fn open(
        path: impl AsRef<std::path::Path>,
        filter: FilterConfig,
    ) -> Result<Self, DeviceError> {
        Self::new(JoystickDevice::open(path)?, filter)
    }
}

impl<D: Device> Decoder<D> {
    /// Wrap an already-open device and absorb whatever it has pending.
    pub fn new(device: D, filter: FilterConfig) -> Result<Self, DeviceError> {
        let mut decoder = Self {
            device,
            filter: EventFilter::new(filter),
            dropped: 0,
            pending: Vec::new(),
        };

        let mut discarded = 0usize;
        if decoder.device.wait_readable(WaitPolicy::NonBlocking)? {
            let mut buf = [0u8; RECORD_LEN];
            while discarded < MAX_RECORDS_PER_READ
                && decoder.device.read_chunk(&mut buf)?.is_some()
            {
                discarded += 1;
            }
        }
        debug!(
            device = decoder.device.id(),
            discarded, "absorbed device initialisation records"
        );
        Ok(decoder)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn filter(&self) -> FilterConfig {
        self.filter.config()
    }

    /// Records dropped as malformed since the decoder was created.
    pub fn dropped_records(&self) -> u64 {
        self.dropped
    }

    /// Wait for input according to `wait`, then return the filtered events
    /// available at that moment (at most [`MAX_RECORDS_PER_READ`] records are
    /// consumed).
    ///
    /// Malformed records are logged, counted and skipped. A device I/O error
    /// aborts the call; events decoded before the error are kept and returned
    /// first by the next call, which then does not wait.
    pub fn read(&mut self, wait: WaitPolicy) -> Result<Vec<InputEvent>, DeviceError> {
        let wait = if self.pending.is_empty() {
            wait
        } else {
            WaitPolicy::NonBlocking
        };
        if !self.device.wait_readable(wait)? {
            return Ok(std::mem::take(&mut self.pending));
        }

        let mut buf = [0u8; RECORD_LEN];
        let mut consumed = 0usize;
        while let Some(n) = self.device.read_chunk(&mut buf)? {
            consumed += 1;
            match decode(&buf[..n]) {
                Ok(Some((time, kind))) => {
                    trace!(time, ?kind, "decoded record");
                    if let Some(event) = self.filter.apply(time, kind) {
                        self.pending.push(event);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    self.dropped += 1;
                    warn!(device = self.device.id(), error = %e, "dropping malformed record");
                }
            }
            if consumed >= MAX_RECORDS_PER_READ {
                debug!(device = self.device.id(), consumed, "read limit reached");
                break;
            }
        }
        Ok(std::mem::take(&mut self.pending))
    }

    pub fn into_inner(self) -> D {
        self.device
    }
}

/// Decode one record's bytes.
///
/// Returns `Ok(None)` for records that carry nothing to forward: init reports
/// and unrecognised kinds.
pub fn decode(bytes: &[u8]) -> Result<Option<(u32, InputKind)>, DecodeError> {
    let record = RawRecord::from_bytes(bytes)?;
    match record.decode()? {
        Some(InputKind::Init { .. }) | None => Ok(None),
        Some(kind) => Ok(Some((record.time, kind))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualDevice;
    use crate::event::{Direction, ABS_X, ABS_Y, JS_EVENT_AXIS, JS_EVENT_BUTTON};

    fn device() -> VirtualDevice {
        VirtualDevice::new("virtual:0", "Virtual Pad")
    }

    #[test]
    fn open_discards_init_burst() {
        let mut dev = device();
        dev.push_init_burst(4, 2);
        dev.press_button(0);

        let mut decoder = Decoder::new(dev, FilterConfig::default()).unwrap();
        assert_eq!(decoder.device().pending_records(), 0);
        assert!(decoder.read(WaitPolicy::NonBlocking).unwrap().is_empty());
    }

    #[test]
    fn read_drains_everything_pending() {
        let mut decoder = Decoder::new(device(), FilterConfig::default()).unwrap();
        let dev = decoder.device_mut();
        dev.press_button(2);
        dev.advance(40);
        dev.tilt(0, -1);
        dev.advance(10);
        dev.tilt(1, 0);

        let events = decoder.read(WaitPolicy::Block).unwrap();
        let kinds: Vec<InputKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [
                InputKind::Button {
                    number: 3,
                    pressed: true
                },
                InputKind::Axis {
                    axis: ABS_Y,
                    direction: Direction::Up
                },
                InputKind::Axis {
                    axis: ABS_X,
                    direction: Direction::Right
                },
            ]
        );
        let elapsed: Vec<u32> = events.iter().map(|e| e.elapsed).collect();
        assert_eq!(elapsed, [0, 40, 10]);
        assert!(decoder.read(WaitPolicy::NonBlocking).unwrap().is_empty());
    }

    #[test]
    fn center_events_follow_the_filter() {
        let mut skip = Decoder::new(device(), FilterConfig::default()).unwrap();
        skip.device_mut().tilt(0, 1);
        skip.device_mut().center();
        assert_eq!(skip.read(WaitPolicy::Block).unwrap().len(), 1);

        let mut keep = Decoder::new(device(), FilterConfig::pass_all()).unwrap();
        keep.device_mut().tilt(0, 1);
        keep.device_mut().center();
        let events = keep.read(WaitPolicy::Block).unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().skip(1).all(|e| matches!(
            e.kind,
            InputKind::Axis {
                direction: Direction::Center,
                ..
            }
        )));
    }

    #[test]
    fn malformed_and_unknown_records_are_skipped() {
        let mut decoder = Decoder::new(device(), FilterConfig::default()).unwrap();
        let dev = decoder.device_mut();
        dev.push_bytes(&[1, 2, 3]);
        dev.push_record(RawRecord::new(0, 1, 0x04, 0));
        dev.push_record(RawRecord::new(0, 500, JS_EVENT_AXIS, 5));
        dev.press_button(0);

        let events = decoder.read(WaitPolicy::Block).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(decoder.dropped_records(), 2);
    }

    #[test]
    fn read_error_propagates_and_decoder_recovers() {
        let mut decoder = Decoder::new(device(), FilterConfig::default()).unwrap();
        decoder.device_mut().fail_next_read();
        assert!(matches!(
            decoder.read(WaitPolicy::Block),
            Err(DeviceError::Read(_))
        ));

        decoder.device_mut().press_button(1);
        assert_eq!(decoder.read(WaitPolicy::Block).unwrap().len(), 1);
    }

    #[test]
    fn events_before_a_read_error_are_kept_for_the_next_read() {
        let mut decoder = Decoder::new(device(), FilterConfig::default()).unwrap();
        let dev = decoder.device_mut();
        dev.push_record(RawRecord::new(100, 1, JS_EVENT_BUTTON, 0));
        dev.push_read_error();
        dev.push_record(RawRecord::new(250, 1, JS_EVENT_BUTTON, 1));

        assert!(matches!(
            decoder.read(WaitPolicy::Block),
            Err(DeviceError::Read(_))
        ));

        let events = decoder.read(WaitPolicy::Block).unwrap();
        let stamps: Vec<(u32, u32)> = events.iter().map(|e| (e.timestamp, e.elapsed)).collect();
        assert_eq!(stamps, [(100, 0), (250, 150)]);
        assert_eq!(
            events[0].kind,
            InputKind::Button {
                number: 1,
                pressed: true
            }
        );
    }

    #[test]
    fn held_back_events_are_returned_without_waiting() {
        let mut decoder = Decoder::new(device(), FilterConfig::default()).unwrap();
        decoder.device_mut().press_button(3);
        decoder.device_mut().push_read_error();
        assert!(decoder.read(WaitPolicy::Block).is_err());

        // Device queue is empty; the held event still comes back.
        let events = decoder.read(WaitPolicy::Block).unwrap();
        assert_eq!(events.len(), 1);
        assert!(decoder.read(WaitPolicy::NonBlocking).unwrap().is_empty());
    }

    #[test]
    fn one_read_consumes_at_most_the_record_cap() {
        let mut decoder = Decoder::new(device(), FilterConfig::default()).unwrap();
        let extra = 10;
        for i in 0..MAX_RECORDS_PER_READ + extra {
            decoder.device_mut().advance(1);
            decoder.device_mut().press_button((i % 8) as u8);
        }

        assert_eq!(
            decoder.read(WaitPolicy::Block).unwrap().len(),
            MAX_RECORDS_PER_READ
        );
        assert_eq!(decoder.device().pending_records(), extra);

        let rest = decoder.read(WaitPolicy::NonBlocking).unwrap();
        assert_eq!(rest.len(), extra);
        assert!(rest.iter().all(|e| e.elapsed == 1));
    }

    #[test]
    fn decode_reports_length_errors() {
        assert_eq!(
            decode(&[0u8; 7]),
            Err(DecodeError::Length {
                expected: RECORD_LEN,
                actual: 7
            })
        );
    }
}
