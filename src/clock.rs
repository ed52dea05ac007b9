//! Monotonic time source
//!
//! Samples carry a capture timestamp and calibration runs against a wall-clock
//! deadline, so the driver needs to know the current time. Any monotonic
//! millisecond counter works; closures returning `u64` are accepted directly:
//!
//! ```ignore
//! let mut mag = Bmm150Driver::new(interface, || embassy_time::Instant::now().as_millis());
//! ```

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed epoch
    ///
    /// Must never go backwards.
    fn now_ms(&self) -> u64;
}

impl<F> Clock for F
where
    F: Fn() -> u64,
{
    fn now_ms(&self) -> u64 {
        self()
    }
}
