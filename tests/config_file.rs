use buildorb_hid::{connect, BackendKind, Config, Device, Error, Manager};
use std::io::Write;

const MOCK_CONFIG: &str = r#"
backend = "mock"

[target]
vendor_id = 0x04d9
product_id = 0xa052
location_id = 123456

[[mock.devices]]
vendor_id = 0x04d9
product_id = 0xa052
name = "Desk Orb"
properties = { LocationID = 123456 }

[[mock.devices]]
vendor_id = 0x04d9
product_id = 0xa052
name = "Shelf Orb"
properties = { LocationID = 654321 }
write_ok = false
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_and_connects_mock_backend() {
    let file = write_config(MOCK_CONFIG);
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.backend, BackendKind::Mock);

    let mgr = connect(&config).unwrap();
    assert_eq!(mgr.devices_for(config.target.filter()).len(), 2);

    let mut orb = config.target.select(mgr.as_ref()).unwrap();
    assert_eq!(orb.name(), "Desk Orb");
    assert!(orb.open());
    assert!(orb.set_report(1, &[0x01, 0x02]));
    assert!(orb.close());

    // Fixtures handed to the manager share their report log with the config.
    assert_eq!(config.mock.devices[0].reports().len(), 1);
    assert!(config.mock.devices[1].reports().is_empty());
}

#[test]
fn write_failure_fixture_from_config() {
    let mut config = Config::from_toml_str(MOCK_CONFIG).unwrap();
    config.target.location_id = Some(654_321);

    let mgr = connect(&config).unwrap();
    let mut orb = config.target.select(mgr.as_ref()).unwrap();
    assert!(orb.open());
    assert!(!orb.set_report(1, &[0x01]));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn malformed_file_is_config_error() {
    let file = write_config("backend = [");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[cfg(not(feature = "hid"))]
#[test]
fn hid_backend_unavailable_without_feature() {
    let config = Config::from_toml_str("[target]\nvendor_id = 1\nproduct_id = 2\n").unwrap();
    assert!(matches!(
        connect(&config),
        Err(Error::BackendUnavailable(BackendKind::Hid))
    ));
}
