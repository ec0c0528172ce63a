//! Device metadata snapshot.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description of a device suitable
//! for diagnostics and logging. Backends populate what they know; unknown fields
//! remain `None`.
//!
//! The numeric fields double as the property table behind
//! [`Device::number_property`](crate::device::Device::number_property): see
//! [`DeviceMeta::number_property`] for the key mapping.
//!
//! # Conventions
//! - `bus` is a short, human-readable bus hint like `"usb"`, `"bluetooth"` or `"mock"`.
//! - `path` is an OS/topology path (opaque string) useful for diagnostics.
//! - `location_id` identifies the port, not the device model. On Linux the HID
//!   backend encodes the USB port chain from sysfs (see [`location_from_usb_port`]),
//!   which survives replugs and reboots. Elsewhere it falls back to
//!   [`location_from_path`], which is only stable for the current session.
//!
//! # Example
//! ```no_run
//! use buildorb_hid::{HidManager, Manager};
//!
//! let mgr = HidManager::new().expect("init hid");
//! for dev in mgr.devices(0x04d9, 0xa052) {
//!     println!("{}: {:?}", dev.name(), dev.metadata());
//! }
//! ```

use crate::device::{keys, PropertyValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot of metadata describing a single device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// High-level bus classification (e.g., `"usb"`, `"bluetooth"`, `"mock"`).
    pub bus: Option<String>,

    /// USB Vendor ID (VID), if known.
    pub vid: Option<u16>,

    /// USB Product ID (PID), if known.
    pub pid: Option<u16>,

    /// Device release number (bcdDevice).
    pub version: Option<u16>,

    /// HID Usage Page of the top-level collection, if known.
    pub usage_page: Option<u16>,

    /// HID Usage within the page, if known.
    pub usage: Option<u16>,

    /// HID interface index. Not set when the platform reports `-1`.
    pub interface_number: Option<i32>,

    /// Port-specific identifier used to tell apart identical devices.
    pub location_id: Option<u32>,

    pub manufacturer: Option<String>,

    /// Human-readable product name from the driver/firmware.
    pub product_string: Option<String>,

    /// Device serial number supplied by firmware/OS, if present.
    pub serial_number: Option<String>,

    /// OS/topological path to the device. Treat as opaque.
    pub path: Option<String>,
}

impl DeviceMeta {
    /// Map a property key onto the numeric fields of this snapshot.
    pub fn number_property(&self, key: &str) -> Option<PropertyValue> {
        match key {
            keys::VENDOR_ID => self.vid.map(PropertyValue::from),
            keys::PRODUCT_ID => self.pid.map(PropertyValue::from),
            keys::VERSION_NUMBER => self.version.map(PropertyValue::from),
            keys::LOCATION_ID => self.location_id.map(PropertyValue::from),
            keys::PRIMARY_USAGE_PAGE => self.usage_page.map(PropertyValue::from),
            keys::PRIMARY_USAGE => self.usage.map(PropertyValue::from),
            keys::INTERFACE_NUMBER => self.interface_number.map(PropertyValue::from),
            _ => None,
        }
    }
}

/// Encode a USB port chain such as `"1-2.4"` (bus 1, port 2, then port 4 on
/// the hub behind it) as a location ID.
///
/// The layout follows the macOS `LocationID`: bus number in the top byte, then
/// one nibble per hub level. `None` for malformed chains, ports above 15 or
/// more than six levels.
pub fn location_from_usb_port(port: &str) -> Option<u32> {
    let (bus, chain) = port.split_once('-')?;
    let bus: u8 = bus.parse().ok()?;

    let mut location = u32::from(bus) << 24;
    let mut shift = 20i32;
    for hop in chain.split('.') {
        let hop: u32 = hop.parse().ok()?;
        if !(1..=15).contains(&hop) || shift < 0 {
            return None;
        }
        location |= hop << shift;
        shift -= 4;
    }
    Some(location)
}

/// Find the USB port chain in a resolved sysfs device path.
///
/// For `/sys/devices/pci0000:00/0000:00:14.0/usb1/1-2/1-2.4/1-2.4:1.0/0003:04D9:A052.0005`
/// this is `"1-2.4"`: the deepest component that names a USB device rather than
/// an interface (`1-2.4:1.0`) or a root hub (`usb1`).
pub fn usb_port_from_sysfs(path: &Path) -> Option<&str> {
    path.components()
        .filter_map(|c| c.as_os_str().to_str())
        .filter(|name| is_usb_port(name))
        .last()
}

fn is_usb_port(name: &str) -> bool {
    match name.split_once('-') {
        Some((bus, chain)) => {
            !bus.is_empty()
                && bus.bytes().all(|b| b.is_ascii_digit())
                && !chain.is_empty()
                && chain
                    .split('.')
                    .all(|hop| !hop.is_empty() && hop.bytes().all(|b| b.is_ascii_digit()))
        }
        None => false,
    }
}

/// Session-scoped location ID: a CRC-32 of the platform device path.
///
/// Used when the port chain cannot be resolved. Paths like `/dev/hidrawN` or
/// `DevSrvsID:<id>` are reassigned on replug, so the value must not be
/// persisted.
pub fn location_from_path(path: &[u8]) -> u32 {
    crc32fast::hash(path)
}
