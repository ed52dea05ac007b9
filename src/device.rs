//! High-level driver API for the BMM150
//!
//! [`Bmm150Driver`] is the device session. It owns the register interface and
//! the clock, tracks power, operation mode and identity state, and exposes the
//! reading, calibration and streaming operations on top of them.
//!
//! The session is a plain owned value: every operation takes `&mut self`, so
//! the six-register sample read can never interleave with another task's
//! writes. Share it across tasks by putting it behind a single owner (a mutex
//! or a dedicated task), never by cloning the bus.
//!
//! With the `async` feature every bus operation and delay is awaited instead of
//! blocking; the API is otherwise identical.

use crate::calibration::{CalibrationOffset, OffsetAccumulator, window_ms};
use crate::clock::Clock;
use crate::config::{Bmm150Config, DataRate, OperationMode, PresetMode};
use crate::interface::I2cInterface;
use crate::registers::Bmm150 as RegisterDevice;
use crate::sample::{PhysicalSample, RawSample};
use crate::stream::{StreamHandle, StreamReading, StreamSink};
use crate::{
    CALIBRATION_SAMPLE_INTERVAL_MS, CHIP_ID_VALUE, Error, POWER_OFF, POWER_ON, SETTLE_DELAY_MS,
};

// Only import Bus when not using async feature
#[cfg(not(feature = "async"))]
use crate::bus::Bus;

/// Axis-enable register value with X, Y and Z all enabled
const AXES_ENABLE_XYZ: u8 = 0x00;

/// Main driver for the BMM150
pub struct Bmm150Driver<B, C> {
    device: RegisterDevice<I2cInterface<B>>,
    clock: C,
    // Session state
    powered: bool,
    operation_mode: Option<OperationMode>,
    identity_verified: bool,
}

impl<B, C> Bmm150Driver<B, C> {
    /// Create a new BMM150 driver instance
    ///
    /// No bus traffic happens here. Call [`initialize`](Self::initialize) to
    /// power the device up and verify its identity.
    ///
    /// # Arguments
    ///
    /// * `interface` - Register interface for the device
    /// * `clock` - Monotonic millisecond clock used to timestamp samples
    pub fn new(interface: I2cInterface<B>, clock: C) -> Self {
        Self {
            device: RegisterDevice::new(interface),
            clock,
            powered: false,
            operation_mode: None,
            identity_verified: false,
        }
    }

    /// Whether the last power-control write switched the device on
    #[must_use]
    pub const fn is_powered(&self) -> bool {
        self.powered
    }

    /// Operation mode last written, `None` before the first write
    #[must_use]
    pub const fn operation_mode(&self) -> Option<OperationMode> {
        self.operation_mode
    }

    /// Whether [`initialize`](Self::initialize) has read the expected chip identity
    #[must_use]
    pub const fn is_identity_verified(&self) -> bool {
        self.identity_verified
    }

    /// Consume the driver and return the bus
    pub fn release(self) -> B {
        self.device.interface.release()
    }
}

impl<B, C> Bmm150Driver<B, C>
where
    C: Clock,
{
    /// Convert a raw sample to microteslas, subtracting `offset`
    ///
    /// The result is stamped with the current time, never earlier than the raw
    /// sample's own timestamp.
    #[must_use]
    pub fn to_physical(&self, raw: &RawSample, offset: &CalibrationOffset) -> PhysicalSample {
        raw.to_physical(offset, self.clock.now_ms())
    }
}

#[cfg(not(feature = "async"))]
impl<B, C> Bmm150Driver<B, C>
where
    B: Bus,
    C: Clock,
{
    /// Initialize the device
    ///
    /// Powers the device on, waits [`SETTLE_DELAY_MS`] for it to settle, then
    /// checks the chip identity. On a match the operation mode is set to
    /// [`OperationMode::Normal`].
    ///
    /// The order is mandatory: the identity register holds garbage until the
    /// device is powered and settled.
    ///
    /// # Arguments
    ///
    /// * `delay` - Delay provider implementing `embedded_hal::delay::DelayNs`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Communication with the device fails
    /// - The identity register does not read [`CHIP_ID_VALUE`]. The device is
    ///   then left powered but unconfigured and no further writes are issued;
    ///   calling `initialize` again starts over.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use embassy_time::Delay;
    /// let mut delay = Delay;
    /// mag.initialize(&mut delay)?;
    /// ```
    pub fn initialize<D>(&mut self, delay: &mut D) -> Result<(), Error<B::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        self.identity_verified = false;

        self.set_power(true)?;
        delay.delay_ms(SETTLE_DELAY_MS);

        let chip_id = self.read_chip_id()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("BMM150 chip id: {=u8:#x}", chip_id);

        if chip_id != CHIP_ID_VALUE {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "BMM150 identity mismatch: expected {=u8:#x}, got {=u8:#x}",
                CHIP_ID_VALUE,
                chip_id
            );
            return Err(Error::UnexpectedIdentity(chip_id));
        }
        self.identity_verified = true;

        self.set_operation_mode(OperationMode::Normal)
    }

    /// Read the chip identity register
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_chip_id(&mut self) -> Result<u8, Error<B::Error>> {
        Ok(self.device.chip_id().read()?.chip_id())
    }

    /// Switch the device on or off
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_power(&mut self, enabled: bool) -> Result<(), Error<B::Error>> {
        let value = if enabled { POWER_ON } else { POWER_OFF };
        self.device.power_ctrl().write(|w| w.set_power_ctrl(value))?;
        self.powered = enabled;
        Ok(())
    }

    /// Set the operation mode
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_operation_mode(&mut self, mode: OperationMode) -> Result<(), Error<B::Error>> {
        self.device.op_mode().write(|w| w.set_op_mode(mode.bits()))?;
        self.operation_mode = Some(mode);
        Ok(())
    }

    /// Set the preset mode
    ///
    /// Shares its register with the axis enable, see [`crate::registers`].
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_preset_mode(&mut self, mode: PresetMode) -> Result<(), Error<B::Error>> {
        self.device
            .preset_mode()
            .write(|w| w.set_preset_mode(mode.bits()))?;
        Ok(())
    }

    /// Set the output data rate
    ///
    /// Shares its register with the operation mode, see [`crate::registers`].
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_rate(&mut self, rate: DataRate) -> Result<(), Error<B::Error>> {
        self.device
            .mode_rate()
            .write(|w| w.set_mode_rate(rate.bits()))?;
        Ok(())
    }

    /// Enable measurement on the X, Y and Z axes
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn enable_axes(&mut self) -> Result<(), Error<B::Error>> {
        self.device
            .axes_enable()
            .write(|w| w.set_axes_enable(AXES_ENABLE_XYZ))?;
        Ok(())
    }

    /// Apply a measurement configuration
    ///
    /// Writes operation mode, preset, data rate and (if requested) axis enable,
    /// in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails. Writes issued
    /// before the failure stay in effect.
    pub fn configure(&mut self, config: &Bmm150Config) -> Result<(), Error<B::Error>> {
        self.set_operation_mode(config.operation_mode)?;
        self.set_preset_mode(config.preset_mode)?;
        self.set_rate(config.data_rate)?;
        if config.enable_axes {
            self.enable_axes()?;
        }
        Ok(())
    }

    /// Read raw magnetometer counts
    ///
    /// Issues six single-byte reads (LSB then MSB for X, Y and Z) and stamps
    /// the result with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_raw_sample(&mut self) -> Result<RawSample, Error<B::Error>> {
        let bytes = [
            self.device.data_x_lsb().read()?.data_x_lsb(),
            self.device.data_x_msb().read()?.data_x_msb(),
            self.device.data_y_lsb().read()?.data_y_lsb(),
            self.device.data_y_msb().read()?.data_y_msb(),
            self.device.data_z_lsb().read()?.data_z_lsb(),
            self.device.data_z_msb().read()?.data_z_msb(),
        ];

        Ok(RawSample::from_bytes(bytes, self.clock.now_ms()))
    }

    /// Read one sample in µT with `offset` subtracted
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_calibrated(
        &mut self,
        offset: &CalibrationOffset,
    ) -> Result<PhysicalSample, Error<B::Error>> {
        let raw = self.read_raw_sample()?;
        Ok(self.to_physical(&raw, offset))
    }

    /// Read one uncalibrated sample in µT
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_geomagnetic(&mut self) -> Result<PhysicalSample, Error<B::Error>> {
        self.read_calibrated(&CalibrationOffset::ZERO)
    }

    /// Read the compass heading in degrees (0-360)
    ///
    /// Assumes the sensor is level, see [`crate::heading_degrees`].
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_heading(&mut self, offset: &CalibrationOffset) -> Result<f32, Error<B::Error>> {
        Ok(self.read_calibrated(offset)?.heading_degrees())
    }

    /// Average readings over a time window to find the calibration offset
    ///
    /// Samples every [`CALIBRATION_SAMPLE_INTERVAL_MS`]; see
    /// [`calibrate_with_interval`](Self::calibrate_with_interval).
    ///
    /// # Errors
    ///
    /// Returns an error if communication fails or the window is too short.
    pub fn calibrate<D>(
        &mut self,
        duration_minutes: f32,
        delay: &mut D,
    ) -> Result<CalibrationOffset, Error<B::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        self.calibrate_with_interval(duration_minutes, CALIBRATION_SAMPLE_INTERVAL_MS, delay)
    }

    /// Average readings over a time window to find the calibration offset
    ///
    /// Takes an uncalibrated reading, waits `interval_ms`, and repeats while
    /// less than `duration_minutes` has elapsed on the clock. The per-axis mean
    /// of the readings is returned; the driver does not keep it, so pass it to
    /// [`read_calibrated`](Self::read_calibrated) afterwards.
    ///
    /// Operation mode is left alone. Call after [`initialize`](Self::initialize).
    ///
    /// # Arguments
    ///
    /// * `duration_minutes` - Length of the sampling window
    /// * `interval_ms` - Wait between samples
    /// * `delay` - Delay provider for timing between samples
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Communication with the device fails (the run is abandoned)
    /// - `duration_minutes` is not positive or shorter than `interval_ms`
    ///   ([`Error::NoSamplesCollected`])
    pub fn calibrate_with_interval<D>(
        &mut self,
        duration_minutes: f32,
        interval_ms: u32,
        delay: &mut D,
    ) -> Result<CalibrationOffset, Error<B::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        let window = window_ms(duration_minutes)
            .filter(|&window| window >= u64::from(interval_ms))
            .ok_or(Error::NoSamplesCollected)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Starting calibration for {=u64} ms", window);

        let start = self.clock.now_ms();
        let mut accumulator = OffsetAccumulator::new();

        while self.clock.now_ms().saturating_sub(start) < window {
            let sample = self.read_geomagnetic()?;
            accumulator.push(&sample);
            delay.delay_ms(interval_ms);
        }

        let offset = accumulator.mean().ok_or(Error::NoSamplesCollected)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Calibration completed over {=u32} samples: {}",
            accumulator.count(),
            offset
        );

        Ok(offset)
    }

    /// Stream calibrated readings until `handle` is stopped
    ///
    /// Every `interval_ms` one sample is read, its heading computed, and the
    /// pair emitted to `sink`. A tick whose read fails emits the error instead
    /// and the stream carries on. Stopping the handle (from the sink or another
    /// context) ends the loop at the next tick boundary; a read in progress is
    /// never interrupted.
    ///
    /// # Arguments
    ///
    /// * `handle` - Cancellation token, armed when the stream starts
    /// * `interval_ms` - Time between ticks
    /// * `offset` - Calibration offset applied to every reading
    /// * `delay` - Delay provider for tick timing
    /// * `sink` - Receives each tick's result
    pub fn stream<D, S>(
        &mut self,
        handle: &StreamHandle,
        interval_ms: u32,
        offset: &CalibrationOffset,
        delay: &mut D,
        mut sink: S,
    ) where
        D: embedded_hal::delay::DelayNs,
        S: StreamSink<B::Error>,
    {
        handle.start();

        #[cfg(feature = "defmt")]
        defmt::info!("Starting stream every {=u32} ms", interval_ms);

        while handle.is_running() {
            delay.delay_ms(interval_ms);
            if !handle.is_running() {
                break;
            }

            let event = self.read_calibrated(offset).map(StreamReading::new);

            #[cfg(feature = "defmt")]
            {
                if event.is_err() {
                    defmt::warn!("Stream tick failed, continuing");
                }
            }

            sink.emit(event);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Stream stopped");
    }
}

#[cfg(feature = "async")]
impl<B, C> Bmm150Driver<B, C>
where
    B: crate::bus::AsyncBus,
    C: Clock,
{
    /// Initialize the device
    ///
    /// Powers the device on, waits [`SETTLE_DELAY_MS`] for it to settle, then
    /// checks the chip identity. On a match the operation mode is set to
    /// [`OperationMode::Normal`]. The settle delay yields to the executor.
    ///
    /// # Arguments
    ///
    /// * `delay` - Delay provider implementing `embedded_hal_async::delay::DelayNs`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Communication with the device fails
    /// - The identity register does not read [`CHIP_ID_VALUE`]. The device is
    ///   then left powered but unconfigured and no further writes are issued.
    pub async fn initialize<D>(&mut self, delay: &mut D) -> Result<(), Error<B::Error>>
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        self.identity_verified = false;

        self.set_power(true).await?;
        delay.delay_ms(SETTLE_DELAY_MS).await;

        let chip_id = self.read_chip_id().await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("BMM150 chip id: {=u8:#x}", chip_id);

        if chip_id != CHIP_ID_VALUE {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "BMM150 identity mismatch: expected {=u8:#x}, got {=u8:#x}",
                CHIP_ID_VALUE,
                chip_id
            );
            return Err(Error::UnexpectedIdentity(chip_id));
        }
        self.identity_verified = true;

        self.set_operation_mode(OperationMode::Normal).await
    }

    /// Read the chip identity register
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn read_chip_id(&mut self) -> Result<u8, Error<B::Error>> {
        Ok(self.device.chip_id().read_async().await?.chip_id())
    }

    /// Switch the device on or off
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn set_power(&mut self, enabled: bool) -> Result<(), Error<B::Error>> {
        let value = if enabled { POWER_ON } else { POWER_OFF };
        self.device
            .power_ctrl()
            .write_async(|w| w.set_power_ctrl(value))
            .await?;
        self.powered = enabled;
        Ok(())
    }

    /// Set the operation mode
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn set_operation_mode(&mut self, mode: OperationMode) -> Result<(), Error<B::Error>> {
        self.device
            .op_mode()
            .write_async(|w| w.set_op_mode(mode.bits()))
            .await?;
        self.operation_mode = Some(mode);
        Ok(())
    }

    /// Set the preset mode
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn set_preset_mode(&mut self, mode: PresetMode) -> Result<(), Error<B::Error>> {
        self.device
            .preset_mode()
            .write_async(|w| w.set_preset_mode(mode.bits()))
            .await?;
        Ok(())
    }

    /// Set the output data rate
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn set_rate(&mut self, rate: DataRate) -> Result<(), Error<B::Error>> {
        self.device
            .mode_rate()
            .write_async(|w| w.set_mode_rate(rate.bits()))
            .await?;
        Ok(())
    }

    /// Enable measurement on the X, Y and Z axes
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn enable_axes(&mut self) -> Result<(), Error<B::Error>> {
        self.device
            .axes_enable()
            .write_async(|w| w.set_axes_enable(AXES_ENABLE_XYZ))
            .await?;
        Ok(())
    }

    /// Apply a measurement configuration
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn configure(&mut self, config: &Bmm150Config) -> Result<(), Error<B::Error>> {
        self.set_operation_mode(config.operation_mode).await?;
        self.set_preset_mode(config.preset_mode).await?;
        self.set_rate(config.data_rate).await?;
        if config.enable_axes {
            self.enable_axes().await?;
        }
        Ok(())
    }

    /// Read raw magnetometer counts
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn read_raw_sample(&mut self) -> Result<RawSample, Error<B::Error>> {
        let bytes = [
            self.device.data_x_lsb().read_async().await?.data_x_lsb(),
            self.device.data_x_msb().read_async().await?.data_x_msb(),
            self.device.data_y_lsb().read_async().await?.data_y_lsb(),
            self.device.data_y_msb().read_async().await?.data_y_msb(),
            self.device.data_z_lsb().read_async().await?.data_z_lsb(),
            self.device.data_z_msb().read_async().await?.data_z_msb(),
        ];

        Ok(RawSample::from_bytes(bytes, self.clock.now_ms()))
    }

    /// Read one sample in µT with `offset` subtracted
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn read_calibrated(
        &mut self,
        offset: &CalibrationOffset,
    ) -> Result<PhysicalSample, Error<B::Error>> {
        let raw = self.read_raw_sample().await?;
        Ok(self.to_physical(&raw, offset))
    }

    /// Read one uncalibrated sample in µT
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn read_geomagnetic(&mut self) -> Result<PhysicalSample, Error<B::Error>> {
        self.read_calibrated(&CalibrationOffset::ZERO).await
    }

    /// Read the compass heading in degrees (0-360)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub async fn read_heading(
        &mut self,
        offset: &CalibrationOffset,
    ) -> Result<f32, Error<B::Error>> {
        Ok(self.read_calibrated(offset).await?.heading_degrees())
    }

    /// Average readings over a time window to find the calibration offset
    ///
    /// # Errors
    ///
    /// Returns an error if communication fails or the window is too short.
    pub async fn calibrate<D>(
        &mut self,
        duration_minutes: f32,
        delay: &mut D,
    ) -> Result<CalibrationOffset, Error<B::Error>>
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        self.calibrate_with_interval(duration_minutes, CALIBRATION_SAMPLE_INTERVAL_MS, delay)
            .await
    }

    /// Average readings over a time window to find the calibration offset
    ///
    /// The wait between samples yields to the executor.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Communication with the device fails (the run is abandoned)
    /// - `duration_minutes` is not positive or shorter than `interval_ms`
    ///   ([`Error::NoSamplesCollected`])
    pub async fn calibrate_with_interval<D>(
        &mut self,
        duration_minutes: f32,
        interval_ms: u32,
        delay: &mut D,
    ) -> Result<CalibrationOffset, Error<B::Error>>
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        let window = window_ms(duration_minutes)
            .filter(|&window| window >= u64::from(interval_ms))
            .ok_or(Error::NoSamplesCollected)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Starting calibration for {=u64} ms", window);

        let start = self.clock.now_ms();
        let mut accumulator = OffsetAccumulator::new();

        while self.clock.now_ms().saturating_sub(start) < window {
            let sample = self.read_geomagnetic().await?;
            accumulator.push(&sample);
            delay.delay_ms(interval_ms).await;
        }

        let offset = accumulator.mean().ok_or(Error::NoSamplesCollected)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Calibration completed over {=u32} samples: {}",
            accumulator.count(),
            offset
        );

        Ok(offset)
    }

    /// Stream calibrated readings until `handle` is stopped
    ///
    /// Each tick waits `interval_ms` (yielding to the executor), reads one
    /// sample and emits it with its heading to `sink`; failed reads are emitted
    /// as errors and the stream carries on. Another task can end the stream by
    /// calling [`StreamHandle::stop`]; it takes effect at the next tick boundary.
    pub async fn stream<D, S>(
        &mut self,
        handle: &StreamHandle,
        interval_ms: u32,
        offset: &CalibrationOffset,
        delay: &mut D,
        mut sink: S,
    ) where
        D: embedded_hal_async::delay::DelayNs,
        S: StreamSink<B::Error>,
    {
        handle.start();

        #[cfg(feature = "defmt")]
        defmt::info!("Starting stream every {=u32} ms", interval_ms);

        while handle.is_running() {
            delay.delay_ms(interval_ms).await;
            if !handle.is_running() {
                break;
            }

            let event = self.read_calibrated(offset).await.map(StreamReading::new);

            #[cfg(feature = "defmt")]
            {
                if event.is_err() {
                    defmt::warn!("Stream tick failed, continuing");
                }
            }

            sink.emit(event);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Stream stopped");
    }
}
