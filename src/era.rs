//! Extended Register Access (ERA).
//!
//! ERA reaches a 16-bit-addressed register space outside the basic
//! 32-register window. Unlike RAP it is a stateful handshake: stage an
//! address, issue a control code, poll the control register until the device
//! clears it, then move the value byte. The device auto-increments the
//! target address, so multi-byte transfers repeat only the
//! control/poll/value step.
//!
//! ERA is undefined while the feed streams, so every operation disables the
//! feed first and leaves it disabled; re-enable it when done.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::regs::*;
use crate::{Error, Pinnacle, RegisterBus};

/// Completion-poll budget per handshake step.
///
/// The hardware contract is an unbounded wait; the cap turns a wedged
/// device into [`Error::UnresponsiveDevice`] instead of a hang. A healthy
/// device clears busy within a few polls.
pub const ERA_POLL_LIMIT: usize = 10_000;

impl<B, E, DR, D> Pinnacle<B, DR, D>
where
  B: RegisterBus<BusError = E>,
  DR: InputPin,
  D: DelayNs,
{
  /// Read one extended register.
  pub fn era_read_byte(&mut self, address: u16) -> Result<u8, Error<E>> {
    let mut buf = [0u8; 1];
    self.era_read_bytes(address, &mut buf)?;
    Ok(buf[0])
  }

  /// Read `buf.len()` extended registers starting at `address`.
  ///
  /// The address is staged once; the device increments it after each value
  /// read.
  pub fn era_read_bytes(&mut self, address: u16, buf: &mut [u8]) -> Result<(), Error<E>> {
    self.enable_feed(false)?;
    self.write_reg(Reg::EraAddrHigh, (address >> 8) as u8)?;
    self.write_reg(Reg::EraAddrLow, address as u8)?;
    for byte in buf.iter_mut() {
      self.write_reg(Reg::EraControl, ERA_CFG_READ_AUTO_INCR)?;
      self.wait_era_idle()?;
      *byte = self.read_reg(Reg::EraValue)?;
      self.clear_flags()?;
    }
    Ok(())
  }

  /// Write one extended register.
  pub fn era_write_byte(&mut self, address: u16, value: u8) -> Result<(), Error<E>> {
    self.enable_feed(false)?;
    // Value first; the control code latches it into the staged address.
    self.write_reg(Reg::EraValue, value)?;
    self.write_reg(Reg::EraAddrHigh, (address >> 8) as u8)?;
    self.write_reg(Reg::EraAddrLow, address as u8)?;
    self.write_reg(Reg::EraControl, ERA_WRITE)?;
    self.wait_era_idle()?;
    self.clear_flags()
  }

  /// Poll the control register until the device reports the handshake
  /// complete (reads back zero).
  fn wait_era_idle(&mut self) -> Result<(), Error<E>> {
    for _ in 0..ERA_POLL_LIMIT {
      if self.read_reg(Reg::EraControl)? == 0 {
        return Ok(());
      }
    }
    Err(Error::UnresponsiveDevice)
  }
}

#[cfg(test)]
mod tests {
  use embedded_hal_mock::eh1::delay::NoopDelay;

  use crate::sim::SimBus;
  use crate::{Config, NoReadyPin, Pinnacle};

  use super::*;

  fn driver(bus: SimBus) -> Pinnacle<SimBus, NoReadyPin, NoopDelay> {
    Pinnacle::new(bus, NoopDelay::new(), Config::default())
  }

  #[test]
  fn write_then_read_round_trips() {
    let mut pad = driver(SimBus::new());
    pad.era_write_byte(0x0187, 0xAB).unwrap();
    assert_eq!(pad.era_read_byte(0x0187).unwrap(), 0xAB);
  }

  #[test]
  fn multi_byte_read_relies_on_device_auto_increment() {
    let mut bus = SimBus::new();
    bus.ext.insert(0x0100, 0x11);
    bus.ext.insert(0x0101, 0x22);
    bus.ext.insert(0x0102, 0x33);
    let mut pad = driver(bus);

    let mut buf = [0u8; 3];
    pad.era_read_bytes(0x0100, &mut buf).unwrap();
    assert_eq!(buf, [0x11, 0x22, 0x33]);

    // The address registers were staged exactly once.
    let (bus, _, _) = pad.free();
    let stagings = bus.writes.iter().filter(|w| w.0 == Reg::EraAddrLow as u8).count();
    assert_eq!(stagings, 1);
  }

  #[test]
  fn era_disables_the_feed_first() {
    let mut pad = driver(SimBus::new());
    pad.initialize().unwrap();
    pad.era_write_byte(0x0020, 0x01).unwrap();

    let (bus, _, _) = pad.free();
    assert_eq!(bus.regs[Reg::FeedConfig1 as usize] & crate::FEED1_FEED_ENABLE, 0);
  }

  #[test]
  fn wedged_device_surfaces_as_unresponsive() {
    let mut bus = SimBus::new();
    bus.unresponsive = true;
    let mut pad = driver(bus);
    assert_eq!(pad.era_write_byte(0x0187, 0xAB), Err(Error::UnresponsiveDevice));
  }
}
