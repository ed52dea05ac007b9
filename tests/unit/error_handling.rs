//! Unit tests for error handling and recovery

use crate::common::{MockBus, MockError, MockTime, create_mock_driver};
use bmm150::{Bmm150Driver, Error, I2C_ADDRESS_MIN, I2cInterface};

#[test]
fn test_read_failure_basic() {
    let (mut driver, bus, _time) = create_mock_driver();

    // Inject a read failure
    bus.fail_next_read();

    let result = driver.read_raw_sample();
    assert_eq!(result, Err(Error::Bus(MockError::Communication)));
}

#[test]
fn test_read_failure_recovery() {
    let (mut driver, bus, _time) = create_mock_driver();

    bus.fail_next_read();
    assert!(driver.read_geomagnetic().is_err(), "First read should fail");

    // Subsequent read should succeed (error was only for one operation)
    bus.set_mag_data(16, 32, 48);
    let sample = driver.read_geomagnetic().unwrap();
    assert_eq!((sample.x, sample.y, sample.z), (1.0, 2.0, 3.0));
}

#[test]
fn test_write_failure() {
    let (mut driver, bus, _time) = create_mock_driver();

    bus.fail_next_write();
    let result = driver.set_operation_mode(bmm150::OperationMode::Sleep);

    assert_eq!(result, Err(Error::Bus(MockError::Communication)));
    assert_eq!(driver.operation_mode(), None, "Failed write is not recorded");
}

#[test]
fn test_short_read_is_protocol_error() {
    let (mut driver, bus, _time) = create_mock_driver();

    bus.short_next_read(0);

    let result = driver.read_chip_id();
    assert_eq!(
        result,
        Err(Error::Protocol {
            expected: 1,
            received: 0
        })
    );
}

#[test]
fn test_short_read_during_sample() {
    let (mut driver, bus, _time) = create_mock_driver();

    bus.short_next_read(0);
    let result = driver.read_heading(&bmm150::CalibrationOffset::ZERO);

    assert!(matches!(result, Err(Error::Protocol { .. })));
}

#[test]
fn test_absent_device() {
    let bus = MockBus::new();
    let mut time = MockTime::new();

    // Nothing answers at the lowest address
    let mut driver = Bmm150Driver::new(I2cInterface::new(bus, I2C_ADDRESS_MIN), time.clone());

    let result = driver.initialize(&mut time);
    assert_eq!(result, Err(Error::Bus(MockError::Nack)));
    assert!(!driver.is_powered());
}

#[test]
fn test_alternate_address() {
    let bus = MockBus::new();
    bus.set_device_address(0x11);
    let mut time = MockTime::new();

    let mut driver = Bmm150Driver::new(I2cInterface::new(bus, 0x11), time.clone());

    driver.initialize(&mut time).unwrap();
    assert!(driver.is_identity_verified());
}
