//! Integration tests for basic workflow scenarios

use crate::common::{MockError, MockTime, assert_float_eq, create_mock_driver};
use bmm150::{
    Bmm150Config, Bmm150Driver, CHIP_ID_VALUE, CalibrationOffset, DataRate, Error, I2cInterface,
    OperationMode, StreamHandle, StreamReading,
};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation as I2cOperation};

#[test]
fn test_complete_session_workflow() {
    let (mut driver, bus, mut time) = create_mock_driver();

    // Initialize the device
    driver.initialize(&mut time).unwrap();

    // Configure measurement
    let config = Bmm150Config {
        data_rate: DataRate::Hz25,
        ..Default::default()
    };
    driver.configure(&config).unwrap();

    // Calibrate in a field of {20, -10, 40} µT
    bus.set_mag_data(320, -160, 640);
    let offset = driver.calibrate(0.05, &mut time).unwrap();
    assert_float_eq(offset.x, 20.0, 1e-5);
    assert_float_eq(offset.y, -10.0, 1e-5);
    assert_float_eq(offset.z, 40.0, 1e-5);

    // Turn the board: the field moves by +5 µT on Y
    bus.set_mag_data(320, -80, 640);
    let sample = driver.read_calibrated(&offset).unwrap();
    assert_float_eq(sample.x, 0.0, 1e-5);
    assert_float_eq(sample.y, 5.0, 1e-5);
    assert_float_eq(sample.z, 0.0, 1e-5);

    let heading = driver.read_heading(&offset).unwrap();
    assert_float_eq(heading, 90.0, 1e-3);

    // Stream a few readings
    let handle = StreamHandle::new();
    let mut headings = Vec::new();
    driver.stream(
        &handle,
        100,
        &offset,
        &mut time,
        |event: Result<StreamReading, Error<MockError>>| {
            headings.push(event.unwrap().heading);
            if headings.len() == 5 {
                handle.stop();
            }
        },
    );
    assert_eq!(headings.len(), 5);
    assert!(headings.iter().all(|h| (h - 90.0).abs() < 1e-3));

    // Put the device to sleep and power it down
    driver.set_operation_mode(OperationMode::Sleep).unwrap();
    driver.set_power(false).unwrap();
    assert!(!driver.is_powered());
}

#[test]
fn test_error_recovery() {
    let (mut driver, bus, mut time) = create_mock_driver();

    // Initialize
    driver.initialize(&mut time).unwrap();

    // Inject a read failure
    bus.fail_next_read();
    assert!(driver.read_geomagnetic().is_err());

    // Session is still usable
    bus.set_mag_data(16, 0, 0);
    let heading = driver.read_heading(&CalibrationOffset::ZERO).unwrap();
    assert_float_eq(heading, 0.0, 1e-3);
    assert!(driver.is_identity_verified());
}

// Minimal blocking I2C peripheral with a flat register file
struct RegisterFileI2c {
    registers: [u8; 256],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RegisterFileError;

impl embedded_hal::i2c::Error for RegisterFileError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for RegisterFileI2c {
    type Error = RegisterFileError;
}

impl I2c for RegisterFileI2c {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [I2cOperation<'_>],
    ) -> Result<(), Self::Error> {
        let mut pointer = 0usize;
        for operation in operations {
            match operation {
                I2cOperation::Write(bytes) => {
                    let Some((&reg, values)) = bytes.split_first() else {
                        return Err(RegisterFileError);
                    };
                    pointer = usize::from(reg);
                    for &value in values {
                        self.registers[pointer % 256] = value;
                        pointer += 1;
                    }
                }
                I2cOperation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = self.registers[pointer % 256];
                        pointer += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

#[test]
fn test_embedded_hal_i2c_workflow() {
    let mut registers = [0u8; 256];
    registers[0x40] = CHIP_ID_VALUE;
    // X = -32 counts, Z = +48 counts
    registers[0x42] = 0xE0;
    registers[0x43] = 0xFF;
    registers[0x46] = 0x30;

    let mut time = MockTime::new();
    let mut driver = Bmm150Driver::new(
        I2cInterface::default(RegisterFileI2c { registers }),
        time.clone(),
    );

    driver.initialize(&mut time).unwrap();
    driver.configure(&Bmm150Config::default()).unwrap();

    let sample = driver.read_geomagnetic().unwrap();
    assert_float_eq(sample.x, -2.0, 1e-6);
    assert_float_eq(sample.y, 0.0, 1e-6);
    assert_float_eq(sample.z, 3.0, 1e-6);
    assert_float_eq(sample.heading_degrees(), 180.0, 1e-3);

    let i2c = driver.release();
    assert_eq!(i2c.registers[0x4B], 0x01);
    assert_eq!(i2c.registers[0x4E], 0x00);
}
