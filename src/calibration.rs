//! Hard-iron calibration offset
//!
//! A calibration run averages uncalibrated readings into a
//! [`CalibrationOffset`]; the offset is then subtracted from every later
//! reading at conversion time. Nothing is stored on the device or persisted:
//! the caller owns the offset and passes it back in.

use crate::sample::PhysicalSample;

/// Per-axis bias in µT, subtracted from converted readings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationOffset {
    /// X-axis offset in µT
    pub x: f32,
    /// Y-axis offset in µT
    pub y: f32,
    /// Z-axis offset in µT
    pub z: f32,
}

impl CalibrationOffset {
    /// No correction
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create an offset from per-axis values in µT
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Running per-axis mean of [`PhysicalSample`]s
///
/// Keeps sums and a count rather than the samples themselves, so a calibration
/// run of any length needs constant memory.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OffsetAccumulator {
    sum_x: f32,
    sum_y: f32,
    sum_z: f32,
    count: u32,
}

impl OffsetAccumulator {
    /// Create an empty accumulator
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sum_x: 0.0,
            sum_y: 0.0,
            sum_z: 0.0,
            count: 0,
        }
    }

    /// Add one sample
    pub fn push(&mut self, sample: &PhysicalSample) {
        self.sum_x += sample.x;
        self.sum_y += sample.y;
        self.sum_z += sample.z;
        self.count += 1;
    }

    /// Number of samples added so far
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Arithmetic mean of the samples, or `None` if there are none
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<CalibrationOffset> {
        if self.count == 0 {
            return None;
        }
        let count = self.count as f32;
        Some(CalibrationOffset {
            x: self.sum_x / count,
            y: self.sum_y / count,
            z: self.sum_z / count,
        })
    }
}

/// Convert a calibration window in minutes to milliseconds
///
/// Returns `None` for non-positive, NaN or sub-millisecond windows, which
/// cannot produce a sample.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn window_ms(duration_minutes: f32) -> Option<u64> {
    if duration_minutes.is_nan() || duration_minutes <= 0.0 {
        return None;
    }
    let ms = (f64::from(duration_minutes) * 60_000.0) as u64;
    (ms > 0).then_some(ms)
}
