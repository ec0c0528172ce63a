//! Scoped open/close.
//!
//! [`Session`] opens a device on creation and closes it when dropped, so early
//! returns and `?` cannot leak an open handle.
//!
//! ```
//! use buildorb_hid::{Device, DeviceFixture, Manager, MockManager, Session};
//!
//! let mgr = MockManager::new().with_device(DeviceFixture::new(0x04d9, 0xa052));
//! for mut dev in mgr.devices(0x04d9, 0xa052) {
//!     if let Some(mut session) = Session::open(dev.as_mut()) {
//!         session.set_report(1, &[0x01, 0x02]);
//!     } // closed here
//! }
//! ```

use crate::device::Device;
use std::ops::{Deref, DerefMut};
use tracing::warn;

pub struct Session<'a> {
    device: &'a mut dyn Device,
    closed: bool,
}

impl<'a> Session<'a> {
    /// Open `device`. `None` if the backend refuses.
    pub fn open(device: &'a mut dyn Device) -> Option<Self> {
        if !device.open() {
            return None;
        }
        Some(Self {
            device,
            closed: false,
        })
    }

    /// Close now and report whether the backend accepted it.
    pub fn close(mut self) -> bool {
        self.closed = true;
        self.device.close()
    }
}

impl<'a> Deref for Session<'a> {
    type Target = dyn Device + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.device
    }
}

impl<'a> DerefMut for Session<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.device
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if !self.closed && !self.device.close() {
            warn!(device = %self.device.name(), "device refused to close");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::{DeviceFixture, MockDevice};

    #[test]
    fn closes_on_drop() {
        let mut dev = MockDevice::new(DeviceFixture::new(1, 2));
        {
            let mut session = Session::open(&mut dev).unwrap();
            assert!(session.set_report(0, &[1]));
        }
        assert!(!dev.is_open());
    }

    #[test]
    fn explicit_close_reports_result() {
        let mut dev = MockDevice::new(DeviceFixture::new(1, 2).failing_close());
        let session = Session::open(&mut dev).unwrap();
        assert!(!session.close());
        assert!(dev.is_open());
    }

    #[test]
    fn open_failure_yields_no_session() {
        let mut dev = MockDevice::new(DeviceFixture::new(1, 2).failing_open());
        assert!(Session::open(&mut dev).is_none());
    }

    #[test]
    fn early_return_still_closes() {
        fn send(dev: &mut dyn Device) -> Option<()> {
            let mut session = Session::open(dev)?;
            if !session.set_report(0, &[]) {
                return None;
            }
            Some(())
        }

        let mut dev = MockDevice::new(DeviceFixture::new(1, 2).failing_write());
        assert!(send(&mut dev).is_none());
        assert!(!dev.is_open());
    }
}
