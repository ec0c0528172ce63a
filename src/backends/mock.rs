//! In-memory backend for tests and demos.
//!
//! A [`MockManager`] is seeded with [`DeviceFixture`]s and hands out a fresh
//! [`MockDevice`] for every fixture that matches a query. Fixtures carry canned
//! results for `open`, `close` and `set_report`, so a host can be driven
//! through device-absent, open-failure and write-failure paths without
//! hardware.
//!
//! Successful writes land in the fixture's [`ReportLog`]. The log is shared by
//! every clone of the fixture, so keep a clone around to inspect what was sent:
//!
//! ```
//! use buildorb_hid::{DeviceFixture, Manager, MockManager};
//!
//! let orb = DeviceFixture::new(0x04d9, 0xa052).with_property("LocationID", 7);
//! let mgr = MockManager::new().with_device(orb.clone());
//!
//! let mut dev = mgr.devices(0x04d9, 0xa052).pop().unwrap();
//! assert!(dev.open());
//! assert!(dev.set_report(1, &[0xff]));
//! assert_eq!(orb.reports().len(), 1);
//! ```

use crate::device::{keys, Device, PropertyValue};
use crate::manager::{DeviceFilter, Manager};
use crate::metadata::DeviceMeta;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

/// An output report captured by a mock device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: u8,
    pub payload: Vec<u8>,
}

/// Shared record of reports written to one fixture.
#[derive(Clone, Debug, Default)]
pub struct ReportLog(Rc<RefCell<Vec<Report>>>);

impl ReportLog {
    /// Copy of everything written so far, oldest first.
    pub fn snapshot(&self) -> Vec<Report> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, report: Report) {
        self.0.borrow_mut().push(report);
    }
}

fn yes() -> bool {
    true
}

fn default_name() -> String {
    "Mock Device".to_string()
}

/// Description of one simulated device.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceFixture {
    pub vendor_id: u16,
    pub product_id: u16,
    #[serde(default = "default_name")]
    pub name: String,
    /// Numeric properties. `VendorID`/`ProductID` are always taken from the fields above.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default = "yes")]
    pub open_ok: bool,
    #[serde(default = "yes")]
    pub close_ok: bool,
    #[serde(default = "yes")]
    pub write_ok: bool,
    /// Reject `set_report` while the handle is closed.
    #[serde(default = "yes")]
    pub require_open: bool,
    #[serde(skip)]
    reports: ReportLog,
}

impl DeviceFixture {
    /// A fixture that opens, closes and accepts writes.
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            name: default_name(),
            properties: BTreeMap::new(),
            open_ok: true,
            close_ok: true,
            write_ok: true,
            require_open: true,
            reports: ReportLog::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_location_id(self, location_id: PropertyValue) -> Self {
        self.with_property(keys::LOCATION_ID, location_id)
    }

    /// Make `open` fail.
    pub fn failing_open(mut self) -> Self {
        self.open_ok = false;
        self
    }

    /// Make `close` fail (the handle stays open).
    pub fn failing_close(mut self) -> Self {
        self.close_ok = false;
        self
    }

    /// Make every `set_report` fail.
    pub fn failing_write(mut self) -> Self {
        self.write_ok = false;
        self
    }

    /// Accept writes on a closed handle.
    pub fn allow_closed_write(mut self) -> Self {
        self.require_open = false;
        self
    }

    /// Reports written to any handle built from this fixture.
    pub fn reports(&self) -> &ReportLog {
        &self.reports
    }

    pub fn filter(&self) -> DeviceFilter {
        DeviceFilter::new(self.vendor_id, self.product_id)
    }

    /// `VendorID`/`ProductID` always come from the fields enumeration matches
    /// on; table entries under those keys are ignored.
    fn number_property(&self, key: &str) -> Option<PropertyValue> {
        match key {
            keys::VENDOR_ID => Some(self.vendor_id.into()),
            keys::PRODUCT_ID => Some(self.product_id.into()),
            _ => self.properties.get(key).copied(),
        }
    }
}

/// Handle over a [`DeviceFixture`]. Starts closed.
pub struct MockDevice {
    fixture: DeviceFixture,
    open: bool,
}

impl MockDevice {
    pub fn new(fixture: DeviceFixture) -> Self {
        Self {
            fixture,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Device for MockDevice {
    fn open(&mut self) -> bool {
        if self.open {
            return true;
        }
        self.open = self.fixture.open_ok;
        self.open
    }

    fn close(&mut self) -> bool {
        if !self.open {
            return true;
        }
        if self.fixture.close_ok {
            self.open = false;
        }
        !self.open
    }

    fn number_property(&self, key: &str) -> Option<PropertyValue> {
        self.fixture.number_property(key)
    }

    fn set_report(&mut self, report_id: u8, payload: &[u8]) -> bool {
        if self.fixture.require_open && !self.open {
            return false;
        }
        if !self.fixture.write_ok {
            return false;
        }
        self.fixture.reports.push(Report {
            report_id,
            payload: payload.to_vec(),
        });
        true
    }

    fn name(&self) -> &str {
        &self.fixture.name
    }

    fn metadata(&self) -> DeviceMeta {
        let prop_u16 = |key: &str| {
            self.fixture
                .number_property(key)
                .and_then(|v| u16::try_from(v).ok())
        };
        let location_id = self
            .fixture
            .number_property(keys::LOCATION_ID)
            .and_then(|v| u32::try_from(v).ok());

        DeviceMeta {
            bus: Some("mock".to_string()),
            vid: prop_u16(keys::VENDOR_ID),
            pid: prop_u16(keys::PRODUCT_ID),
            version: prop_u16(keys::VERSION_NUMBER),
            usage_page: prop_u16(keys::PRIMARY_USAGE_PAGE),
            usage: prop_u16(keys::PRIMARY_USAGE),
            interface_number: self
                .fixture
                .number_property(keys::INTERFACE_NUMBER)
                .and_then(|v| i32::try_from(v).ok()),
            location_id,
            manufacturer: None,
            product_string: Some(self.fixture.name.clone()),
            serial_number: None,
            path: Some(format!(
                "mock://{:04x}:{:04x}/{}",
                self.fixture.vendor_id,
                self.fixture.product_id,
                location_id.unwrap_or_default()
            )),
        }
    }
}

/// Manager over a fixed set of [`DeviceFixture`]s.
#[derive(Clone, Debug, Default)]
pub struct MockManager {
    fixtures: Vec<DeviceFixture>,
}

impl MockManager {
    /// A manager with no devices attached.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixtures(fixtures: impl IntoIterator<Item = DeviceFixture>) -> Self {
        Self {
            fixtures: fixtures.into_iter().collect(),
        }
    }

    pub fn with_device(mut self, fixture: DeviceFixture) -> Self {
        self.add_device(fixture);
        self
    }

    pub fn add_device(&mut self, fixture: DeviceFixture) {
        self.fixtures.push(fixture);
    }

    pub fn fixtures(&self) -> &[DeviceFixture] {
        &self.fixtures
    }

    /// Release the fixtures. Equivalent to dropping the manager.
    pub fn release(self) {}
}

impl Manager for MockManager {
    fn devices(&self, vendor_id: u16, product_id: u16) -> Vec<Box<dyn Device>> {
        let filter = DeviceFilter::new(vendor_id, product_id);
        let found: Vec<Box<dyn Device>> = self
            .fixtures
            .iter()
            .filter(|f| filter.matches(f.vendor_id, f.product_id))
            .map(|f| Box::new(MockDevice::new(f.clone())) as Box<dyn Device>)
            .collect();
        debug!(%filter, count = found.len(), "enumerated mock devices");
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_failure_leaves_handle_closed() {
        let mut dev = MockDevice::new(DeviceFixture::new(1, 2).failing_open());
        assert!(!dev.open());
        assert!(!dev.is_open());
        assert!(!dev.set_report(0, &[1]));
        // Closing something that never opened is fine.
        assert!(dev.close());
    }

    #[test]
    fn close_failure_keeps_handle_open() {
        let mut dev = MockDevice::new(DeviceFixture::new(1, 2).failing_close());
        assert!(dev.open());
        assert!(!dev.close());
        assert!(dev.is_open());
        assert!(dev.set_report(0, &[1]));
    }

    #[test]
    fn write_failure_records_nothing() {
        let fixture = DeviceFixture::new(1, 2).failing_write();
        let mut dev = MockDevice::new(fixture.clone());
        assert!(dev.open());
        assert!(!dev.set_report(3, &[0xaa, 0xbb]));
        assert!(fixture.reports().is_empty());
    }

    #[test]
    fn closed_write_allowed_when_configured() {
        let fixture = DeviceFixture::new(1, 2).allow_closed_write();
        let mut dev = MockDevice::new(fixture.clone());
        assert!(dev.set_report(2, &[0x10]));
        assert_eq!(
            fixture.reports().snapshot(),
            vec![Report {
                report_id: 2,
                payload: vec![0x10]
            }]
        );
    }

    #[test]
    fn vid_pid_fall_back_to_fixture_fields() {
        let dev = MockDevice::new(DeviceFixture::new(0x04d9, 0xa052));
        assert_eq!(dev.number_property(keys::VENDOR_ID), Some(0x04d9));
        assert_eq!(dev.number_property(keys::PRODUCT_ID), Some(0xa052));
        assert_eq!(dev.location_id(), None);
    }

    #[test]
    fn vid_pid_table_entries_cannot_contradict_fields() {
        let mgr = MockManager::new().with_device(
            DeviceFixture::new(0x04d9, 0xa052)
                .with_property(keys::VENDOR_ID, 0x1234)
                .with_property(keys::PRODUCT_ID, 0x5678),
        );
        let devices = mgr.devices(0x04d9, 0xa052);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].number_property(keys::VENDOR_ID), Some(0x04d9));
        assert_eq!(devices[0].number_property(keys::PRODUCT_ID), Some(0xa052));
        assert_eq!(devices[0].metadata().vid, Some(0x04d9));
        assert!(mgr.devices(0x1234, 0x5678).is_empty());
    }

    #[test]
    fn metadata_reflects_fixture() {
        let dev = MockDevice::new(
            DeviceFixture::new(0x04d9, 0xa052)
                .with_name("Orb")
                .with_location_id(123_456),
        );
        let meta = dev.metadata();
        assert_eq!(meta.bus.as_deref(), Some("mock"));
        assert_eq!(meta.vid, Some(0x04d9));
        assert_eq!(meta.location_id, Some(123_456));
        assert_eq!(meta.product_string.as_deref(), Some("Orb"));
        assert_eq!(meta.path.as_deref(), Some("mock://04d9:a052/123456"));
    }

    #[test]
    fn handles_are_rebuilt_per_call() {
        let mgr = MockManager::new().with_device(DeviceFixture::new(1, 2));
        let mut first = mgr.devices(1, 2);
        assert!(first[0].open());
        // A second enumeration does not inherit the open state.
        let mut second = mgr.devices(1, 2);
        assert_eq!(second.len(), 1);
        assert!(second[0].close());
        assert_eq!(mgr.fixtures().len(), 1);
    }

    #[test]
    fn fixture_from_toml_uses_defaults() {
        let fixture: DeviceFixture = toml::from_str(
            r#"
            vendor_id = 0x04d9
            product_id = 0xa052
            properties = { LocationID = 42 }
            write_ok = false
            "#,
        )
        .unwrap();
        assert_eq!(fixture.name, "Mock Device");
        assert!(fixture.open_ok && fixture.close_ok && fixture.require_open);
        assert!(!fixture.write_ok);
        assert_eq!(fixture.properties.get("LocationID"), Some(&42));
    }
}
