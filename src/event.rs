//! Raw device records and the events decoded from them.
//!
//! The Linux joystick interface (`/dev/input/jsN`) reports input as a stream of
//! fixed-size 8-byte records ([`RawRecord`]). Each record is decoded into an
//! [`InputKind`]; records that survive filtering are wrapped in an [`InputEvent`]
//! carrying their timing metadata.
//!
//! ## Value conventions
//! - **Buttons:** `value != 0` means pressed. Button numbers are reported
//!   **1-based** (device button 0 becomes button `1`), matching the labels
//!   printed on most controllers.
//! - **Axes:** only the sign of `value` matters. Axis `0` is horizontal
//!   (negative = left), axis `1` is vertical (negative = up). Other axes carry
//!   no direction and fail to decode.
//! - **Init records:** the driver replays the current state of every channel
//!   with the init bit (`0x80`) set when the device is opened. These decode to
//!   [`InputKind::Init`] and are never forwarded.

use crate::error::DecodeError;
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Size in bytes of one device record.
pub const RECORD_LEN: usize = 8;

/// Button pressed/released.
pub const JS_EVENT_BUTTON: u8 = 0x01;
/// Axis moved.
pub const JS_EVENT_AXIS: u8 = 0x02;
/// Initial state of the device (OR-ed into the other kinds).
pub const JS_EVENT_INIT: u8 = 0x80;

/// Horizontal axis index.
pub const ABS_X: u8 = 0x00;
/// Vertical axis index.
pub const ABS_Y: u8 = 0x01;

/// One fixed-layout record as read from the device (`struct js_event`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct RawRecord {
    /// Driver timestamp in milliseconds.
    pub time: u32,
    pub value: i16,
    /// `JS_EVENT_*` tag.
    pub kind: u8,
    /// Button or axis index.
    pub number: u8,
}

impl RawRecord {
    pub fn new(time: u32, value: i16, kind: u8, number: u8) -> Self {
        Self {
            time,
            value,
            kind,
            number,
        }
    }

    /// Reinterpret exactly [`RECORD_LEN`] bytes (native byte order) as a record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        bytemuck::try_pod_read_unaligned(bytes).map_err(|_| DecodeError::Length {
            expected: RECORD_LEN,
            actual: bytes.len(),
        })
    }

    /// The record as it appears on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Decode the record into an event kind.
    ///
    /// Returns `Ok(None)` for kinds this crate does not recognise; those records
    /// are skipped silently.
    pub fn decode(&self) -> Result<Option<InputKind>, DecodeError> {
        if self.kind & JS_EVENT_INIT != 0 {
            return Ok(Some(InputKind::Init { kind: self.kind }));
        }

        let kind = match self.kind {
            JS_EVENT_BUTTON => InputKind::Button {
                number: u16::from(self.number) + 1,
                pressed: self.value != 0,
            },
            JS_EVENT_AXIS => InputKind::Axis {
                axis: self.number,
                direction: Direction::resolve(self.number, self.value)?,
            },
            _ => return Ok(None),
        };
        Ok(Some(kind))
    }
}

/// Symbolic direction of a stick/D-pad axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Center,
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Resolve an axis reading into a direction.
    pub fn resolve(axis: u8, value: i16) -> Result<Self, DecodeError> {
        use std::cmp::Ordering::*;

        let direction = match (axis, value.cmp(&0)) {
            (_, Equal) if axis == ABS_X || axis == ABS_Y => Direction::Center,
            (ABS_X, Less) => Direction::Left,
            (ABS_X, Greater) => Direction::Right,
            (ABS_Y, Less) => Direction::Up,
            (ABS_Y, Greater) => Direction::Down,
            _ => return Err(DecodeError::UnmappedAxis(axis)),
        };
        Ok(direction)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Center => "center",
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded content of one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// A button changed state. `number` is 1-based.
    Button { number: u16, pressed: bool },

    /// An axis moved into (or back out of) a direction.
    Axis { axis: u8, direction: Direction },

    /// Initial-state/capability report. `kind` is the raw tag (`0x80..=0x82`).
    Init { kind: u8 },
}

/// An event that passed the filter, with timing metadata.
///
/// `elapsed` is the difference to the previously emitted event's timestamp
/// (0 for the first one). It never takes part in trigger matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvent {
    /// Driver timestamp in milliseconds.
    pub timestamp: u32,
    /// Milliseconds since the previous emitted event.
    pub elapsed: u32,
    pub kind: InputKind,
}
