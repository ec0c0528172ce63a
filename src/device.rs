//! Device handle contract.
//!
//! A [`Device`] wraps one discovered HID device, real or simulated. Handles are
//! produced by a [`Manager`](crate::manager::Manager) and never reference it
//! afterwards.
//!
//! # Open/closed state
//! - [`Device::open`] and [`Device::close`] are idempotent: opening an open
//!   handle or closing a closed one returns `true` and changes nothing.
//! - Property lookups are served from the enumeration snapshot and work on a
//!   closed handle.
//! - [`Device::set_report`] needs an open session and returns `false` without
//!   one.
//!
//! Every operation reports failure as a value (`false` / `None`). Nothing here
//! retries; that is left to the host.

use crate::metadata::DeviceMeta;

/// Numeric device property value.
pub type PropertyValue = i64;

/// Property keys understood by the built-in backends.
///
/// Keys are opaque strings; backends return `None` for keys they do not know.
pub mod keys {
    pub const VENDOR_ID: &str = "VendorID";
    pub const PRODUCT_ID: &str = "ProductID";
    pub const VERSION_NUMBER: &str = "VersionNumber";
    /// Distinguishes devices with identical VID/PID by the port they sit on.
    pub const LOCATION_ID: &str = "LocationID";
    pub const PRIMARY_USAGE_PAGE: &str = "PrimaryUsagePage";
    pub const PRIMARY_USAGE: &str = "PrimaryUsage";
    pub const INTERFACE_NUMBER: &str = "InterfaceNumber";
}

pub trait Device {
    /// Open the device for I/O. Returns `true` if the handle is open afterwards.
    fn open(&mut self) -> bool;

    /// Release the I/O session. Returns `true` if the handle is closed afterwards.
    fn close(&mut self) -> bool;

    /// Look up a numeric property. `None` when unset or not numeric.
    fn number_property(&self, key: &str) -> Option<PropertyValue>;

    /// Shorthand for `number_property("LocationID")`.
    fn location_id(&self) -> Option<PropertyValue> {
        self.number_property(keys::LOCATION_ID)
    }

    /// Send a raw output report. The payload is not interpreted.
    ///
    /// Transmission is all-or-nothing: `true` only if the whole report went out.
    fn set_report(&mut self, report_id: u8, payload: &[u8]) -> bool;

    /// Human-readable device name for logs and diagnostics.
    fn name(&self) -> &str;

    fn metadata(&self) -> DeviceMeta;
}
