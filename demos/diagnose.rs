//! List HID devices matching a VID/PID and dump their metadata as JSON.
//!
//! Usage: `cargo run --example diagnose -- [vid] [pid]` (hex, default `04d9 a052`).

use buildorb_hid::{Device, HidManager, Manager};

fn parse_hex(arg: Option<String>, default: u16) -> u16 {
    arg.and_then(|s| u16::from_str_radix(s.trim_start_matches("0x"), 16).ok())
        .unwrap_or(default)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let vid = parse_hex(args.next(), 0x04d9);
    let pid = parse_hex(args.next(), 0xa052);

    let mgr = HidManager::new().expect("init hidapi");
    let devices = mgr.devices(vid, pid);
    println!("{} device(s) matching {vid:04x}:{pid:04x}", devices.len());

    for dev in &devices {
        let meta = dev.metadata();
        println!(
            "{}",
            serde_json::to_string_pretty(&meta).expect("serialize metadata")
        );
    }
}
