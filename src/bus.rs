//! Byte-level bus transport consumed by the driver
//!
//! The driver never talks to a peripheral directly. It goes through [`Bus`]
//! (or [`AsyncBus`] with the `async` feature), which performs register-addressed
//! block reads and single-byte writes against one device address.
//!
//! Every `embedded-hal` I2C implementation is a [`Bus`] already, so in most
//! applications this module is invisible:
//!
//! ```ignore
//! let interface = I2cInterface::default(i2c); // any embedded_hal::i2c::I2c
//! ```
//!
//! Implement the trait by hand for transports that can return fewer bytes than
//! requested (for example Linux `i2c-dev` block reads); the register interface
//! turns such short reads into [`Error::Protocol`](crate::Error::Protocol).

/// Blocking register-addressed byte transport
///
/// # Safety Invariants
///
/// - Only one owner per bus instance
/// - No concurrent access to the same bus from multiple contexts
/// - Address must be 7-bit (valid range: 0x00..=0x7F)
pub trait Bus {
    /// Transport error type
    type Error;

    /// Read up to `buffer.len()` bytes starting at `register`
    ///
    /// Returns the number of bytes actually delivered into `buffer`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the device does not acknowledge or the
    /// bus faults.
    fn read_bytes(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error>;

    /// Write one byte to `register`
    ///
    /// # Errors
    ///
    /// Returns the transport error if the device does not acknowledge or the
    /// bus faults.
    fn write_byte(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error>;
}

impl<I2C> Bus for I2C
where
    I2C: embedded_hal::i2c::I2c,
{
    type Error = I2C::Error;

    fn read_bytes(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error> {
        // An I2C write_read either fills the whole buffer or fails
        self.write_read(address, &[register], buffer)?;
        Ok(buffer.len())
    }

    fn write_byte(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write(address, &[register, value])
    }
}

/// Async register-addressed byte transport
///
/// Same contract as [`Bus`], for `embedded-hal-async` peripherals.
#[cfg(feature = "async")]
#[allow(async_fn_in_trait)]
pub trait AsyncBus {
    /// Transport error type
    type Error;

    /// Read up to `buffer.len()` bytes starting at `register`
    ///
    /// Returns the number of bytes actually delivered into `buffer`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the device does not acknowledge or the
    /// bus faults.
    async fn read_bytes(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error>;

    /// Write one byte to `register`
    ///
    /// # Errors
    ///
    /// Returns the transport error if the device does not acknowledge or the
    /// bus faults.
    async fn write_byte(&mut self, address: u8, register: u8, value: u8)
    -> Result<(), Self::Error>;
}

#[cfg(feature = "async")]
impl<I2C> AsyncBus for I2C
where
    I2C: embedded_hal_async::i2c::I2c,
{
    type Error = I2C::Error;

    async fn read_bytes(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error> {
        self.write_read(address, &[register], buffer).await?;
        Ok(buffer.len())
    }

    async fn write_byte(
        &mut self,
        address: u8,
        register: u8,
        value: u8,
    ) -> Result<(), Self::Error> {
        self.write(address, &[register, value]).await
    }
}
