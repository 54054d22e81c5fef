//! Input backends for `joytrigger`.
//!
//! Implementations of [`Device`](crate::device::Device) for concrete record sources.
//!
//! # Feature flags
//! - **`joydev`** (default): the Linux joystick backend (`/dev/input/jsN`).
//!
//! The in-memory [`virtual_input::VirtualDevice`] is always available; it is
//! what the tests and dry runs use.

#[cfg(all(feature = "joydev", target_os = "linux"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "joydev", target_os = "linux"))))]
pub mod joydev;

pub mod virtual_input;
