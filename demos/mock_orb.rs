//! Drive a simulated status orb through the same calls a host makes.

use buildorb_hid::{Device, DeviceFixture, Manager, MockManager};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let orb = DeviceFixture::new(0x04d9, 0xa052)
        .with_name("Demo Orb")
        .with_location_id(123_456);
    let mgr = MockManager::new().with_device(orb.clone());

    for mut dev in mgr.devices(0x04d9, 0xa052) {
        println!("found {} at location {:?}", dev.name(), dev.location_id());
        println!("open: {}", dev.open());
        println!("set_report: {}", dev.set_report(1, &[0x01, 0x02]));
        println!("close: {}", dev.close());
    }

    for report in orb.reports().snapshot() {
        println!("(Mock) report {} <- {:02x?}", report.report_id, report.payload);
    }
}
