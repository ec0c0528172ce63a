//! Construction and configuration errors.
//!
//! Data-plane operations on [`Device`](crate::device::Device) and
//! [`Manager`](crate::manager::Manager) never return these: they report failure
//! as `false`, `None` or an empty device list. `Error` only covers the things
//! that stop a manager from being built at all.

use crate::config::BackendKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The HID subsystem could not be reached.
    #[cfg(feature = "hid")]
    #[error("failed to initialize HID subsystem: {0}")]
    Init(#[from] hidapi::HidError),

    /// The requested backend was not compiled into this build.
    #[error("backend `{0}` is not available in this build")]
    BackendUnavailable(BackendKind),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
