//! Unit tests for sample reading and unit conversion

use crate::common::{Operation, assert_float_eq, create_mock_driver};
use bmm150::{CalibrationOffset, RawSample, SENSITIVITY_LSB_PER_UT};

#[test]
fn test_read_raw_sample_register_order() {
    let (mut driver, bus, _time) = create_mock_driver();
    bus.set_mag_data(0x0102, 0x0304, 0x0506);

    let raw = driver.read_raw_sample().unwrap();
    assert_eq!((raw.x, raw.y, raw.z), (0x0102, 0x0304, 0x0506));

    // Six single-byte reads, LSB before MSB, X then Y then Z
    let addresses: Vec<u8> = bus
        .operations()
        .iter()
        .map(|op| match *op {
            Operation::ReadRegister { address, .. } | Operation::WriteRegister { address, .. } => {
                address
            }
        })
        .collect();
    assert_eq!(addresses, vec![0x42, 0x43, 0x44, 0x45, 0x46, 0x47]);
}

#[test]
fn test_read_raw_sample_signed_values() {
    let (mut driver, bus, _time) = create_mock_driver();

    bus.set_mag_data(i16::MIN, -1, i16::MAX);
    let raw = driver.read_raw_sample().unwrap();

    assert_eq!(raw.x, i16::MIN);
    assert_eq!(raw.y, -1);
    assert_eq!(raw.z, i16::MAX);
}

#[test]
fn test_raw_sample_bytes_from_registers() {
    let (mut driver, bus, _time) = create_mock_driver();

    // 0xFF10 is -240 counts
    bus.set_register(0x42, 0x10);
    bus.set_register(0x43, 0xFF);

    let raw = driver.read_raw_sample().unwrap();
    assert_eq!(raw.x, -240);
    assert_eq!((raw.y, raw.z), (0, 0));
}

#[test]
fn test_raw_sample_timestamp() {
    let (mut driver, _bus, time) = create_mock_driver();
    time.advance_ms(1234);

    let raw = driver.read_raw_sample().unwrap();
    assert_eq!(raw.timestamp_ms, 1234);
}

#[test]
fn test_to_physical_zero_offset() {
    let (driver, _bus, _time) = create_mock_driver();

    let raw = RawSample {
        x: 160,
        y: -320,
        z: 0,
        timestamp_ms: 0,
    };
    let sample = driver.to_physical(&raw, &CalibrationOffset::ZERO);

    assert_float_eq(sample.x, 10.0, 1e-6);
    assert_float_eq(sample.y, -20.0, 1e-6);
    assert_float_eq(sample.z, 0.0, 1e-6);
}

#[test]
fn test_to_physical_subtracts_offset() {
    let (driver, _bus, _time) = create_mock_driver();

    let raw = RawSample {
        x: 160,
        y: 160,
        z: 160,
        timestamp_ms: 0,
    };
    let offset = CalibrationOffset::new(1.0, 2.0, 3.0);
    let sample = driver.to_physical(&raw, &offset);

    assert_float_eq(sample.x, 9.0, 1e-6);
    assert_float_eq(sample.y, 8.0, 1e-6);
    assert_float_eq(sample.z, 7.0, 1e-6);
}

#[test]
fn test_to_physical_timestamp_not_earlier_than_raw() {
    let (driver, _bus, time) = create_mock_driver();
    time.advance_ms(50);

    let stale = RawSample {
        x: 0,
        y: 0,
        z: 0,
        timestamp_ms: 10,
    };
    assert_eq!(
        driver
            .to_physical(&stale, &CalibrationOffset::ZERO)
            .timestamp_ms,
        50
    );

    let future = RawSample {
        timestamp_ms: 90,
        ..stale
    };
    assert_eq!(
        driver
            .to_physical(&future, &CalibrationOffset::ZERO)
            .timestamp_ms,
        90
    );
}

#[test]
fn test_read_geomagnetic_scaling() {
    let (mut driver, bus, _time) = create_mock_driver();
    bus.set_mag_data(400, -800, 16);

    let sample = driver.read_geomagnetic().unwrap();

    assert_float_eq(sample.x, 400.0 / SENSITIVITY_LSB_PER_UT, 1e-6);
    assert_float_eq(sample.y, -50.0, 1e-6);
    assert_float_eq(sample.z, 1.0, 1e-6);
}

#[test]
fn test_read_calibrated_applies_offset() {
    let (mut driver, bus, _time) = create_mock_driver();
    bus.set_mag_data(320, 320, 320);

    let offset = CalibrationOffset::new(5.0, -5.0, 20.0);
    let sample = driver.read_calibrated(&offset).unwrap();

    assert_float_eq(sample.x, 15.0, 1e-6);
    assert_float_eq(sample.y, 25.0, 1e-6);
    assert_float_eq(sample.z, 0.0, 1e-6);
}

#[test]
fn test_full_scale_values_stay_finite() {
    let (mut driver, bus, _time) = create_mock_driver();
    bus.set_mag_data(i16::MAX, i16::MIN, 0);

    let sample = driver.read_geomagnetic().unwrap();

    assert!(sample.x.is_finite() && sample.y.is_finite() && sample.z.is_finite());
    assert_float_eq(sample.x, 2047.9375, 1e-3);
    assert_float_eq(sample.y, -2048.0, 1e-3);
}

#[test]
fn test_magnitude() {
    let (mut driver, bus, _time) = create_mock_driver();
    // 3-4-0 triangle in µT
    bus.set_mag_data(48, 64, 0);

    let sample = driver.read_geomagnetic().unwrap();
    assert_float_eq(sample.magnitude(), 5.0, 1e-5);
}
