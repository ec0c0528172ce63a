//! Backends for `buildorb-hid`.
//!
//! Implementations of [`Manager`](crate::manager::Manager) and
//! [`Device`](crate::device::Device):
//! - [`hid`] talks to real hardware through `hidapi`.
//! - [`mock`] serves in-memory fixtures.
//!
//! # Feature flags
//! - **`hid`** — enables the `hidapi` backend (default). The mock backend is
//!   always compiled.

use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::manager::Manager;
use tracing::debug;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;
pub mod mock;

/// Build the manager selected by `config`.
///
/// The mock backend is seeded with the config's `[[mock.devices]]`.
pub fn connect(config: &Config) -> Result<Box<dyn Manager>> {
    debug!(backend = %config.backend, "connecting device manager");
    match config.backend {
        BackendKind::Hid => connect_hid(),
        BackendKind::Mock => Ok(Box::new(mock::MockManager::from_fixtures(
            config.mock.devices.iter().cloned(),
        ))),
    }
}

#[cfg(feature = "hid")]
fn connect_hid() -> Result<Box<dyn Manager>> {
    Ok(Box::new(hid::HidManager::new()?))
}

#[cfg(not(feature = "hid"))]
fn connect_hid() -> Result<Box<dyn Manager>> {
    Err(crate::error::Error::BackendUnavailable(BackendKind::Hid))
}
