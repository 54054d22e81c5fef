#![cfg(all(feature = "joydev", target_os = "linux"))]

//! Linux joystick (`/dev/input/jsN`) backend.
//!
//! The device node is opened read-only with `O_NONBLOCK`; all waiting is done
//! with `poll(2)` so a read never stalls the pipeline past its [`WaitPolicy`].
//! The file descriptor is owned by a [`File`] and closed on drop.

use crate::device::{Device, WaitPolicy};
use crate::error::DeviceError;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

/// Conventional path of the first joystick.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/input/js0";

/// An open joydev character device.
#[derive(Debug)]
pub struct JoystickDevice {
    file: File,
    path: PathBuf,
    id: String,
    name: String,
}

impl JoystickDevice {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .map_err(|source| DeviceError::Open {
                path: path.clone(),
                source,
            })?;

        let id = path.display().to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.clone());

        debug!(device = %id, "opened joystick device");
        Ok(Self {
            file,
            path,
            id,
            name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One `poll(2)` call. `timeout_ms < 0` waits forever.
    fn poll_once(&self, timeout_ms: libc::c_int) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: `pfd` is a valid, initialised pollfd and we pass a count of 1.
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        if pfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "joystick device reported an error or hang-up",
            ));
        }
        Ok(rc > 0 && pfd.revents & libc::POLLIN != 0)
    }

    fn wait_until(&self, deadline: Option<Instant>) -> io::Result<bool> {
        loop {
            let timeout_ms = match deadline {
                None => -1,
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    millis_rounded_up(left)
                }
            };

            match self.poll_once(timeout_ms) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Ok(false) if deadline.is_none() => continue,
                other => return other,
            }
        }
    }
}

fn millis_rounded_up(d: Duration) -> libc::c_int {
    let ms = d.as_nanos().div_ceil(1_000_000);
    libc::c_int::try_from(ms).unwrap_or(libc::c_int::MAX)
}

impl Device for JoystickDevice {
    fn wait_readable(&mut self, policy: WaitPolicy) -> Result<bool, DeviceError> {
        let ready = match policy {
            WaitPolicy::NonBlocking => self.wait_until(Some(Instant::now())),
            WaitPolicy::Block => self.wait_until(None),
            WaitPolicy::Timeout(d) => self.wait_until(Some(Instant::now() + d)),
        };
        ready.map_err(DeviceError::Read)
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<Option<usize>, DeviceError> {
        loop {
            match self.file.read(buf) {
                Ok(0) => {
                    return Err(DeviceError::Read(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "joystick device closed",
                    )))
                }
                Ok(n) => return Ok(Some(n)),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DeviceError::Read(e)),
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
