use crate::device::{Device, PropertyValue};
use serde::{Deserialize, Serialize};

/// Exact-match enumeration filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceFilter {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceFilter {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    /// Both identifiers must match; there is no wildcard value.
    #[inline]
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl std::fmt::Display for DeviceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Enumerates devices and hands out [`Device`] handles.
///
/// A manager owns its enumeration context and holds no per-device state, so
/// it can be asked for devices any number of times. Every call builds fresh
/// handles; nothing is cached between calls.
///
/// Dropping the manager releases its share of the enumeration context.
pub trait Manager {
    /// Devices whose vendor and product IDs both match exactly.
    ///
    /// Order follows the backend and must not be relied on. An empty `Vec`
    /// means nothing matched (or enumeration failed); it is never an error.
    fn devices(&self, vendor_id: u16, product_id: u16) -> Vec<Box<dyn Device>>;

    fn devices_for(&self, filter: DeviceFilter) -> Vec<Box<dyn Device>> {
        self.devices(filter.vendor_id, filter.product_id)
    }
}

/// Pick the handle plugged into `location_id`, dropping the others.
pub fn find_by_location(
    devices: Vec<Box<dyn Device>>,
    location_id: PropertyValue,
) -> Option<Box<dyn Device>> {
    devices
        .into_iter()
        .find(|d| d.location_id() == Some(location_id))
}
