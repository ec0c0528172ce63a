//! Host-style polling loop driven by a config file.
//!
//! Usage: `cargo run --example poll -- path/to/buildorb.toml`
//!
//! Every tick the target device is looked up again, opened, sent one output
//! report and closed. The payloads below are placeholders; the real byte layout
//! is defined by the device firmware.

use buildorb_hid::{connect, Config, Device, Session};
use std::time::Duration;
use tracing::{info, warn};

const TICK: Duration = Duration::from_secs(5);
const REPORT_ID: u8 = 1;
const PAYLOADS: [[u8; 3]; 3] = [[0xff, 0x00, 0x00], [0x00, 0xff, 0x00], [0x00, 0x00, 0xff]];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "buildorb.toml".to_string());
    let config = Config::load(&path).expect("load config");
    let manager = connect(&config).expect("connect device manager");

    for payload in PAYLOADS.iter().cycle() {
        match config.target.select(manager.as_ref()) {
            Some(mut device) => match Session::open(device.as_mut()) {
                Some(mut session) => {
                    if session.set_report(REPORT_ID, payload) {
                        info!(device = %session.name(), "sent {:02x?}", payload);
                    } else {
                        warn!(device = %session.name(), "report rejected");
                    }
                }
                None => warn!("device found but could not be opened"),
            },
            None => info!(filter = %config.target.filter(), "device not connected"),
        }
        std::thread::sleep(TICK);
    }
}
