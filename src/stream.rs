//! Periodic streaming of readings
//!
//! [`Bmm150Driver::stream`](crate::Bmm150Driver::stream) runs a cooperative
//! loop that emits one [`StreamReading`] per tick to a [`StreamSink`] until its
//! [`StreamHandle`] is stopped. A failed read does not end the loop: the error
//! goes to the sink as `Err` and the next tick proceeds as normal.
//!
//! ```ignore
//! let handle = StreamHandle::new();
//! let mut ticks = 0;
//! mag.stream(&handle, DEFAULT_STREAM_INTERVAL_MS, &offset, &mut delay, |event| {
//!     match event {
//!         Ok(reading) => info!("heading {}", reading.heading),
//!         Err(_) => warn!("dropped tick"),
//!     }
//!     ticks += 1;
//!     if ticks == 100 {
//!         handle.stop();
//!     }
//! });
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use crate::Error;
use crate::sample::PhysicalSample;

/// One tick's output: a calibrated sample and its heading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamReading {
    /// Calibrated field in µT
    pub sample: PhysicalSample,
    /// Heading of `sample` in degrees, in `[0, 360)`
    pub heading: f32,
}

impl StreamReading {
    /// Build a reading from a sample, computing its heading
    #[must_use]
    pub fn new(sample: PhysicalSample) -> Self {
        Self {
            heading: sample.heading_degrees(),
            sample,
        }
    }
}

/// Receiver for stream ticks
///
/// Implemented for every `FnMut(Result<StreamReading, Error<E>>)`.
pub trait StreamSink<E> {
    /// Called once per tick with the reading, or with the error that tick hit
    fn emit(&mut self, event: Result<StreamReading, Error<E>>);
}

impl<E, F> StreamSink<E> for F
where
    F: FnMut(Result<StreamReading, Error<E>>),
{
    fn emit(&mut self, event: Result<StreamReading, Error<E>>) {
        self(event);
    }
}

/// Cancellation token for a running stream
///
/// Shared by reference between the streaming loop and whoever stops it (the
/// sink itself, or another task). Stopping takes effect at the next tick
/// boundary.
#[derive(Debug, Default)]
pub struct StreamHandle {
    running: AtomicBool,
}

impl StreamHandle {
    /// Create an idle handle
    #[must_use]
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Stop the stream this handle drives
    ///
    /// Idempotent: stopping an idle or already stopped handle does nothing.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Whether a stream is currently running on this handle
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn start(&self) {
        self.running.store(true, Ordering::Release);
    }
}
