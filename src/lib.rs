#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bus;
pub mod calibration;
pub mod clock;
pub mod config;
pub mod device;
pub mod heading;
pub mod interface;
pub mod registers;
pub mod sample;
pub mod stream;

// Re-export main types
pub use bus::Bus;
#[cfg(feature = "async")]
pub use bus::AsyncBus;
pub use calibration::{CalibrationOffset, OffsetAccumulator};
pub use clock::Clock;
pub use config::{Bmm150Config, DataRate, OperationMode, PresetMode};
pub use device::Bmm150Driver;
pub use heading::heading_degrees;
pub use interface::I2cInterface;
pub use sample::{PhysicalSample, RawSample, combine_axis, split_axis};
pub use stream::{StreamHandle, StreamReading, StreamSink};

/// Lowest strap-selectable BMM150 I2C address (CSB low, SDO low)
pub const I2C_ADDRESS_MIN: u8 = 0x10;

/// Highest strap-selectable BMM150 I2C address (CSB high, SDO high)
///
/// This is also the default used by [`I2cInterface::default()`].
pub const I2C_ADDRESS_MAX: u8 = 0x13;

/// Default BMM150 I2C address (0x13)
pub const I2C_ADDRESS_DEFAULT: u8 = I2C_ADDRESS_MAX;

/// Expected value of the chip identity register
pub const CHIP_ID_VALUE: u8 = 0x32;

/// Value written to the power-control register to power the device on
pub const POWER_ON: u8 = 0x01;

/// Value written to the power-control register to power the device off
pub const POWER_OFF: u8 = 0x00;

/// Time the device needs after power-on before its registers are valid
pub const SETTLE_DELAY_MS: u32 = 100;

/// Raw counts per microtesla
pub const SENSITIVITY_LSB_PER_UT: f32 = 16.0;

/// Interval between samples taken by [`Bmm150Driver::calibrate`]
pub const CALIBRATION_SAMPLE_INTERVAL_MS: u32 = 1000;

/// Suggested tick interval for [`Bmm150Driver::stream`] (10 Hz)
pub const DEFAULT_STREAM_INTERVAL_MS: u32 = 100;

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device (absent device, NACK, bus fault)
    Bus(E),
    /// The bus delivered a different number of bytes than requested
    Protocol {
        /// Number of bytes requested
        expected: usize,
        /// Number of bytes actually delivered
        received: usize,
    },
    /// Chip identity register did not read [`CHIP_ID_VALUE`] (contains the value read)
    UnexpectedIdentity(u8),
    /// Calibration window was too short (or not positive) to take a single sample
    NoSamplesCollected,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
