//! TOML configuration.
//!
//! ```toml
//! backend = "mock"          # "hid" (default) or "mock"
//!
//! [target]
//! vendor_id = 0x04d9
//! product_id = 0xa052
//! location_id = 123456      # optional, picks one of several identical devices
//!
//! [[mock.devices]]
//! vendor_id = 0x04d9
//! product_id = 0xa052
//! properties = { LocationID = 123456 }
//! ```
//!
//! The `[[mock.devices]]` entries are [`DeviceFixture`]s and are only used by
//! the mock backend.
//!
//! `location_id` is only worth persisting on Linux, where the HID backend
//! derives it from the USB port chain. On other platforms it is a hash of the
//! OS device path and changes when the device is replugged, so leave it unset
//! there (or refresh it each session from the `diagnose` demo).

use crate::backends::mock::DeviceFixture;
use crate::device::{Device, PropertyValue};
use crate::error::Result;
use crate::manager::{find_by_location, DeviceFilter, Manager};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Hid,
    Mock,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hid => write!(f, "hid"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// The device the host wants to talk to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub vendor_id: u16,
    pub product_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<PropertyValue>,
}

impl Target {
    pub fn filter(&self) -> DeviceFilter {
        DeviceFilter::new(self.vendor_id, self.product_id)
    }

    /// Enumerate and pick the target device.
    ///
    /// With a `location_id` only the device on that port qualifies; without one
    /// the first match is taken.
    pub fn select(&self, manager: &dyn Manager) -> Option<Box<dyn Device>> {
        let devices = manager.devices_for(self.filter());
        if devices.len() > 1 && self.location_id.is_none() {
            debug!(
                filter = %self.filter(),
                count = devices.len(),
                "several devices match and no location_id is set; using the first"
            );
        }
        match self.location_id {
            Some(location) => find_by_location(devices, location),
            None => devices.into_iter().next(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub devices: Vec<DeviceFixture>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendKind,
    pub target: Target,
    #[serde(default)]
    pub mock: MockConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), backend = %config.backend, "loaded config");
        Ok(config)
    }
}
