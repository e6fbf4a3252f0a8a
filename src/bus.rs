//! Register Access Protocol transports.
//!
//! The Pinnacle speaks the same framing over I2C and SPI: a command byte of
//! read/write marker OR-ed with the register address, then data. Reads
//! auto-increment on the device side, so one command covers a contiguous
//! window. [`RegisterBus`] captures exactly that contract; everything above
//! it (ERA, sampling, configuration) is bus-agnostic.

use embedded_hal::i2c::{I2c, SevenBitAddress};
use embedded_hal::spi::{Operation, SpiDevice};

use crate::regs::{Reg, DEFAULT_I2C_ADDR, RAP_READ_MASK, RAP_WRITE_MASK, SPI_FILLER};

/// One RAP read and one RAP write — the whole transport contract.
///
/// Implementations own timing and framing; they never retry. A failed bus
/// transaction surfaces as [`RegisterBus::BusError`] and the caller decides
/// what to do with it.
pub trait RegisterBus {
  type BusError;

  /// Read `buf.len()` registers starting at `reg`, address-ascending.
  fn rap_read(&mut self, reg: Reg, buf: &mut [u8]) -> Result<(), Self::BusError>;

  /// Write a single byte to `reg`.
  fn rap_write(&mut self, reg: Reg, value: u8) -> Result<(), Self::BusError>;
}

/// RAP over I2C. The Pinnacle listens on 0x2A unless strapped otherwise.
pub struct I2cBus<I> {
  i2c: I,
  address: SevenBitAddress,
}

impl<I, E> I2cBus<I>
where
  I: I2c<SevenBitAddress, Error = E>,
{
  pub fn new(i2c: I) -> Self {
    Self::with_address(i2c, DEFAULT_I2C_ADDR)
  }

  pub fn with_address(i2c: I, address: SevenBitAddress) -> Self {
    Self { i2c, address }
  }

  /// Release the underlying peripheral.
  pub fn free(self) -> I {
    self.i2c
  }
}

impl<I, E> RegisterBus for I2cBus<I>
where
  I: I2c<SevenBitAddress, Error = E>,
{
  type BusError = E;

  fn rap_read(&mut self, reg: Reg, buf: &mut [u8]) -> Result<(), E> {
    // Signal a RAP read, stop, then clock the bytes out of the device.
    self.i2c.write(self.address, &[RAP_READ_MASK | reg as u8])?;
    self.i2c.read(self.address, buf)
  }

  fn rap_write(&mut self, reg: Reg, value: u8) -> Result<(), E> {
    self.i2c.write(self.address, &[RAP_WRITE_MASK | reg as u8, value])
  }
}

/// RAP over SPI.
///
/// The Pinnacle requires SPI mode 1, MSB first; configure that on the
/// [`SpiDevice`] handed in here. Reads insert two filler bytes between the
/// command and the first data byte while the device turns the line around.
pub struct SpiBus<S> {
  spi: S,
}

impl<S, E> SpiBus<S>
where
  S: SpiDevice<u8, Error = E>,
{
  pub fn new(spi: S) -> Self {
    Self { spi }
  }

  pub fn free(self) -> S {
    self.spi
  }
}

impl<S, E> RegisterBus for SpiBus<S>
where
  S: SpiDevice<u8, Error = E>,
{
  type BusError = E;

  fn rap_read(&mut self, reg: Reg, buf: &mut [u8]) -> Result<(), E> {
    let cmd = [RAP_READ_MASK | reg as u8, SPI_FILLER, SPI_FILLER];
    buf.fill(SPI_FILLER);
    self
      .spi
      .transaction(&mut [Operation::Write(&cmd), Operation::TransferInPlace(buf)])
  }

  fn rap_write(&mut self, reg: Reg, value: u8) -> Result<(), E> {
    self.spi.write(&[RAP_WRITE_MASK | reg as u8, value])
  }
}

/// Opaque per-device bus identity stored in an interrupt slot.
///
/// For I2C this is the slave address; for SPI the select-line id. The speed
/// rides along for transports that rebuild their clock per transaction.
/// This pair is the *only* device state an interrupt-context callback may
/// rely on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusHandle {
  pub address: u8,
  pub speed_hz: u32,
}

/// A bus transaction failed inside an interrupt context.
///
/// There is no caller to propagate to, so the fault carries no detail; the
/// slot signals it by leaving its ready flag clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusFault;

/// RAP read callable from an interrupt vector. Supplied by the platform
/// layer; must reach the bus through the [`BusHandle`] alone.
pub type IsrReadFn = fn(BusHandle, Reg, &mut [u8]) -> Result<(), BusFault>;

/// RAP write callable from an interrupt vector.
pub type IsrWriteFn = fn(BusHandle, Reg, u8) -> Result<(), BusFault>;

/// Stand-in for builds that poll the status register instead of wiring the
/// data-ready line to a GPIO. Always reads low.
pub struct NoReadyPin;

impl embedded_hal::digital::ErrorType for NoReadyPin {
  type Error = core::convert::Infallible;
}

impl embedded_hal::digital::InputPin for NoReadyPin {
  fn is_high(&mut self) -> Result<bool, Self::Error> {
    Ok(false)
  }

  fn is_low(&mut self) -> Result<bool, Self::Error> {
    Ok(true)
  }
}
