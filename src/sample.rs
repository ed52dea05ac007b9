//! Magnetometer sample types and raw-to-physical conversion
//!
//! The BMM150 reports each axis as a signed 16-bit count split across an LSB
//! and an MSB register. [`RawSample`] holds the assembled counts; converting it
//! with a [`CalibrationOffset`] yields a [`PhysicalSample`] in microteslas.

use crate::SENSITIVITY_LSB_PER_UT;
use crate::calibration::CalibrationOffset;

/// Combine an axis' low and high data bytes into a signed count
///
/// The high byte forms the most significant 8 bits; the result is read as
/// two's complement.
#[must_use]
pub const fn combine_axis(lsb: u8, msb: u8) -> i16 {
    i16::from_le_bytes([lsb, msb])
}

/// Split a signed axis count back into its `(lsb, msb)` data bytes
#[must_use]
pub const fn split_axis(value: i16) -> (u8, u8) {
    let [lsb, msb] = value.to_le_bytes();
    (lsb, msb)
}

/// Raw magnetometer counts with capture time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// X-axis count
    pub x: i16,
    /// Y-axis count
    pub y: i16,
    /// Z-axis count
    pub z: i16,
    /// Capture time in milliseconds
    pub timestamp_ms: u64,
}

impl RawSample {
    /// Assemble a sample from the six data bytes in register order
    /// (X LSB, X MSB, Y LSB, Y MSB, Z LSB, Z MSB)
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 6], timestamp_ms: u64) -> Self {
        Self {
            x: combine_axis(bytes[0], bytes[1]),
            y: combine_axis(bytes[2], bytes[3]),
            z: combine_axis(bytes[4], bytes[5]),
            timestamp_ms,
        }
    }

    /// Convert to microteslas and subtract `offset`
    ///
    /// Each axis is `count / 16 - offset` using floating-point division, so
    /// fractional microteslas are kept. `timestamp_ms` is clamped so the result
    /// is never stamped earlier than this sample.
    #[must_use]
    pub fn to_physical(&self, offset: &CalibrationOffset, timestamp_ms: u64) -> PhysicalSample {
        PhysicalSample {
            x: f32::from(self.x) / SENSITIVITY_LSB_PER_UT - offset.x,
            y: f32::from(self.y) / SENSITIVITY_LSB_PER_UT - offset.y,
            z: f32::from(self.z) / SENSITIVITY_LSB_PER_UT - offset.z,
            timestamp_ms: timestamp_ms.max(self.timestamp_ms),
        }
    }
}

/// Magnetic field in microteslas (µT) with capture time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalSample {
    /// X-axis magnetic field in µT
    pub x: f32,
    /// Y-axis magnetic field in µT
    pub y: f32,
    /// Z-axis magnetic field in µT
    pub z: f32,
    /// Conversion time in milliseconds
    pub timestamp_ms: u64,
}

impl PhysicalSample {
    /// Compass heading of this sample in degrees, see [`crate::heading_degrees`]
    #[must_use]
    pub fn heading_degrees(&self) -> f32 {
        crate::heading::heading_degrees(self.x, self.y)
    }

    /// Magnitude of the field vector in µT
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}
