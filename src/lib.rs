#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `no_std` driver for the Cirque Pinnacle ASIC found in GlidePoint
//! capacitive touch sensors.
//!
//! The Pinnacle exposes a 32-register window over either I2C or SPI through
//! its Register Access Protocol (RAP), a larger indirect 16-bit register
//! space through an Extended Register Access (ERA) handshake, and streams
//! absolute or relative motion packets once its feed is enabled. This crate
//! provides:
//!
//! - RAP framing over both buses via `embedded-hal` 1.0 traits
//!   ([`I2cBus`], [`SpiBus`]), behind one [`RegisterBus`] transport contract
//! - The ERA read/write handshake with a bounded completion poll
//! - Typed decoding of absolute/relative trackpad packets, with clipping
//!   and scaling of absolute coordinates to a caller resolution
//! - Polled sampling off the data-ready GPIO or status register
//! - Interrupt-driven sampling for up to [`SLOT_COUNT`] sensors through a
//!   static slot table, so context-free interrupt vectors can each service
//!   the right device
//!
//! ```no_run
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use glidepoint::{Config, I2cBus, Pinnacle};
//!
//! fn example<I, D, E>(i2c: I, delay: D) -> Result<(), glidepoint::Error<E>>
//! where
//!   I: I2c<Error = E>,
//!   D: DelayNs,
//! {
//!   let config = Config::default().with_invert_y(true);
//!   let mut touchpad = Pinnacle::new(I2cBus::new(i2c), delay, config);
//!   touchpad.initialize()?;
//!
//!   let sample = touchpad.read_sample()?;
//!   Ok(())
//! }
//! ```
//!
//! Bus access is not serialized against interrupts: while a device is
//! registered for interrupt-driven sampling, foreground calls that share its
//! bus must be bracketed by the caller (typically by masking the interrupt
//! line for the duration of the transaction).

#[cfg(test)]
extern crate std;

mod bus;
mod config;
mod era;
mod init;
mod irq;
mod read;
mod regs;
mod sample;
#[cfg(test)]
mod sim;
mod slots;

pub use bus::{BusFault, BusHandle, I2cBus, IsrReadFn, IsrWriteFn, NoReadyPin, RegisterBus, SpiBus};
pub use config::{Config, FeedConfig};
pub use init::DeviceId;
pub use regs::*;
pub use sample::{decode, AbsoluteSample, DataMode, RelativeSample, Sample, TimestampedSample};
pub use slots::{clear_sample_ready, sample_ready, vector, InterruptLine, IrqError, IsrBinding, SlotId, SLOT_COUNT};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

/// Errors that can occur while interacting with the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// Bus transaction failed with the underlying driver error.
  Bus(E),
  /// The device reported an unexpected ASIC id during bring-up.
  InvalidChipId(u8),
  /// Interrupt registration exceeded the slot table capacity.
  OutOfSlots,
  /// The requested GPIO cannot serve as an interrupt source.
  NotAnInterruptPin,
  /// An ERA completion poll exhausted its budget without the device
  /// clearing its busy flag.
  UnresponsiveDevice,
}

impl<E> From<IrqError> for Error<E> {
  fn from(e: IrqError) -> Self {
    match e {
      IrqError::NotAnInterruptPin => Error::NotAnInterruptPin,
    }
  }
}

/// Driver for one Pinnacle sensor instance.
///
/// Owns the transport, an optional data-ready pin, and a delay provider.
/// Create it with [`Pinnacle::new`] or [`Pinnacle::with_ready_pin`], adjust
/// the [`Config`], then call [`Pinnacle::initialize`] to program the device.
pub struct Pinnacle<B, DR, D> {
  bus: B,
  ready_pin: Option<DR>,
  delay: D,
  config: Config,
  slot: Option<SlotId>,
}

impl<B, E, D> Pinnacle<B, NoReadyPin, D>
where
  B: RegisterBus<BusError = E>,
  D: DelayNs,
{
  /// Driver without a data-ready GPIO; readiness is polled from the status
  /// register instead.
  pub fn new(bus: B, delay: D, config: Config) -> Self {
    Self { bus, ready_pin: None, delay, config, slot: None }
  }
}

impl<B, E, DR, D> Pinnacle<B, DR, D>
where
  B: RegisterBus<BusError = E>,
  DR: InputPin,
  D: DelayNs,
{
  /// Driver with the sensor's data-ready line wired to `ready_pin`
  /// (active high).
  pub fn with_ready_pin(bus: B, ready_pin: DR, delay: D, config: Config) -> Self {
    Self { bus, ready_pin: Some(ready_pin), delay, config, slot: None }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Release the owned peripherals. Detach any registered interrupt first.
  pub fn free(self) -> (B, Option<DR>, D) {
    (self.bus, self.ready_pin, self.delay)
  }

  /// Whether a new sample is waiting: the data-ready line when wired,
  /// otherwise the status-register flag.
  pub fn data_ready(&mut self) -> Result<bool, Error<E>> {
    if let Some(pin) = self.ready_pin.as_mut() {
      if let Ok(level) = pin.is_high() {
        return Ok(level);
      }
    }
    Ok(self.read_reg(Reg::Status)? & STATUS_DATA_READY != 0)
  }

  /// Clear the command-complete and data-ready status flags. The device
  /// needs a short settle before the next transaction.
  pub fn clear_flags(&mut self) -> Result<(), Error<E>> {
    self.write_reg(Reg::Status, STATUS_CLEAR)?;
    self.delay.delay_us(50);
    Ok(())
  }

  // RAP helpers

  pub(crate) fn read_reg(&mut self, reg: Reg) -> Result<u8, Error<E>> {
    let mut buf = [0u8; 1];
    self.bus.rap_read(reg, &mut buf).map_err(Error::Bus)?;
    Ok(buf[0])
  }

  pub(crate) fn read_bytes(&mut self, reg: Reg, buf: &mut [u8]) -> Result<(), Error<E>> {
    self.bus.rap_read(reg, buf).map_err(Error::Bus)
  }

  pub(crate) fn write_reg(&mut self, reg: Reg, value: u8) -> Result<(), Error<E>> {
    debug_assert!(!reg.read_only());
    self.bus.rap_write(reg, value).map_err(Error::Bus)
  }
}
