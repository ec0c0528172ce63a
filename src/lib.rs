//! buildorb-hid — HID device access for status-light hosts.
//!
//! A [`Manager`] enumerates devices by vendor/product ID and hands out
//! [`Device`] handles that open, close, read numeric properties and write raw
//! output reports. Two backends implement the same traits: `hidapi` for real
//! hardware and an in-memory mock for tests.

pub mod backends;
pub mod config;
pub mod device;
pub mod error;
pub mod manager;
pub mod metadata;
pub mod session;

pub use backends::connect;
#[cfg(feature = "hid")]
pub use backends::hid::{HidDeviceHandle, HidManager};
pub use backends::mock::{DeviceFixture, MockDevice, MockManager, Report, ReportLog};
pub use config::{BackendKind, Config, Target};
pub use device::*;
pub use error::{Error, Result};
pub use manager::*;
pub use metadata::DeviceMeta;
pub use session::Session;
