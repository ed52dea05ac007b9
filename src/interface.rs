//! Register interface for the BMM150
//!
//! This module implements the `device-driver` register traits on top of a
//! [`Bus`](crate::bus::Bus). It is the only place that turns logical register
//! accesses into bus operations, and the place where short reads are caught.

use crate::Error;
use crate::I2C_ADDRESS_DEFAULT;
use crate::bus::Bus;
use device_driver::RegisterInterface;

/// I2C register interface for the BMM150
pub struct I2cInterface<B> {
    bus: B,
    address: u8,
}

impl<B> I2cInterface<B> {
    /// Create a new I2C interface with the default address (0x13)
    ///
    /// # Example
    /// ```ignore
    /// let interface = I2cInterface::default(i2c);
    /// let mut mag = Bmm150Driver::new(interface, clock);
    /// ```
    pub const fn default(bus: B) -> Self {
        Self {
            bus,
            address: I2C_ADDRESS_DEFAULT,
        }
    }

    /// Create a new I2C interface with a custom device address
    ///
    /// The BMM150 answers on 0x10..=0x13 depending on the CSB and SDO straps.
    ///
    /// # Arguments
    /// * `bus` - The bus the device sits on
    /// * `address` - The 7-bit device address
    pub const fn new(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Device address this interface talks to
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Consume the interface and return the bus
    pub fn release(self) -> B {
        self.bus
    }
}

/// Check that a read delivered exactly what was asked for
fn check_length<E>(expected: usize, received: usize) -> Result<(), Error<E>> {
    if expected == received {
        Ok(())
    } else {
        Err(Error::Protocol { expected, received })
    }
}

impl<B> RegisterInterface for I2cInterface<B>
where
    B: Bus,
{
    type Error = Error<B::Error>;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len()
        let received = self
            .bus
            .read_bytes(self.address, address, read_data)
            .map_err(Error::Bus)?;
        check_length(read_data.len(), received)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in write_data.len()
        for (offset, &value) in write_data.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let register = address.wrapping_add(offset as u8);
            self.bus
                .write_byte(self.address, register, value)
                .map_err(Error::Bus)?;
        }
        Ok(())
    }
}

#[cfg(feature = "async")]
impl<B> device_driver::AsyncRegisterInterface for I2cInterface<B>
where
    B: crate::bus::AsyncBus,
{
    type Error = Error<B::Error>;
    type AddressType = u8;

    async fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len()
        let received = crate::bus::AsyncBus::read_bytes(
            &mut self.bus,
            self.address,
            address,
            read_data,
        )
        .await
        .map_err(Error::Bus)?;
        check_length(read_data.len(), received)
    }

    async fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in write_data.len()
        for (offset, &value) in write_data.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let register = address.wrapping_add(offset as u8);
            crate::bus::AsyncBus::write_byte(&mut self.bus, self.address, register, value)
                .await
                .map_err(Error::Bus)?;
        }
        Ok(())
    }
}
