//! joytrigger: named triggers from joystick gestures.
//!
//! Reads the Linux joystick record stream, filters and maps each event to a
//! symbol (`"up"`, `"left"`, `"3"`, ...) and matches the symbol stream against
//! registered sequences. Fired triggers can carry a key action that a
//! host-provided [`KeySink`] delivers to the focused window.
//!
//! ```no_run
//! use joytrigger::{LogSink, TriggerManager, TriggerProfile};
//!
//! let profile = TriggerProfile::load("triggers.toml")?;
//! let mut manager = TriggerManager::open(&profile)?;
//! manager.run(&mut LogSink::new())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod action;
pub mod backends;
pub mod decoder;
pub mod device;
pub mod error;
pub mod event;
pub mod filter;
pub mod logger;
pub mod manager;
pub mod profile;
pub mod symbol;
pub mod trigger;

pub use action::*;
pub use decoder::*;
pub use device::*;
pub use error::*;
pub use event::*;
pub use filter::*;
pub use logger::*;
pub use manager::*;
pub use profile::*;
pub use symbol::*;
pub use trigger::*;
