//! Sample acquisition, polled and interrupt-driven.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::regs::*;
use crate::sample::{decode, TimestampedSample};
use crate::{slots, Error, Pinnacle, RegisterBus};

impl<B, E, DR, D> Pinnacle<B, DR, D>
where
  B: RegisterBus<BusError = E>,
  DR: InputPin,
  D: DelayNs,
{
  /// Return the pending sample, or `None` if nothing is ready yet.
  ///
  /// Readiness is taken from the first available signal: the interrupt
  /// slot's ready flag when registered, else the data-ready line, else
  /// the status register. Slot samples were already captured and decoded
  /// in interrupt context; the polled path captures here.
  pub fn try_read_sample(&mut self) -> Result<Option<TimestampedSample>, Error<E>> {
    if let Some(id) = self.slot {
      if !slots::sample_ready(id) {
        return Ok(None);
      }
      let sample = slots::latest(id);
      slots::clear_sample_ready(id);
      return Ok(sample);
    }

    if !self.data_ready()? {
      return Ok(None);
    }
    self.capture().map(Some)
  }

  /// Block until a sample arrives.
  ///
  /// Busy-waits on the data-ready signal; with no finger on the pad and
  /// z-idle exhausted this spins until the next contact.
  pub fn read_sample(&mut self) -> Result<TimestampedSample, Error<E>> {
    loop {
      if let Some(sample) = self.try_read_sample()? {
        return Ok(sample);
      }
    }
  }

  /// One polled capture: RAP-read the packet window, stamp, clear the
  /// status flags (deasserting the data-ready line), decode.
  fn capture(&mut self) -> Result<TimestampedSample, Error<E>> {
    let mode = self.config.data_mode;
    let mut raw = [0u8; ABSOLUTE_PACKET_LEN];
    self.read_bytes(Reg::PacketByte0, &mut raw[..mode.packet_len()])?;
    let ticks = (self.config.time_source)();
    self.clear_flags()?;
    Ok(TimestampedSample { sample: decode(&raw[..mode.packet_len()], mode), ticks })
  }
}

#[cfg(test)]
mod tests {
  use embedded_hal_mock::eh1::delay::NoopDelay;

  use crate::sample::{DataMode, Sample};
  use crate::sim::SimBus;
  use crate::{Config, NoReadyPin, Pinnacle};

  use super::*;

  fn ticks() -> u32 {
    77
  }

  #[test]
  fn polled_absolute_read_decodes_and_clears_flags() {
    let mut bus = SimBus::new();
    bus.load_packet(&[0x01, 0x00, 0x7F, 0x05, 0x30, 0x12]);
    let config = Config::default().with_time_source(ticks);
    let mut pad = Pinnacle::new(bus, NoopDelay::new(), config);

    let got = pad.read_sample().unwrap();
    assert_eq!(got.ticks, 77);
    let Sample::Absolute(s) = got.sample else { panic!("wrong mode") };
    assert_eq!((s.x, s.y, s.z, s.buttons, s.touching), (127, 773, 0x12, 0x01, true));

    // Flags cleared by the capture; nothing further is pending.
    assert!(!pad.data_ready().unwrap());
    assert!(pad.try_read_sample().unwrap().is_none());
  }

  #[test]
  fn polled_relative_read_uses_the_short_packet() {
    let mut bus = SimBus::new();
    bus.load_packet(&[0x01, 0x05, 0xFB, 0x00]);
    let config = Config::default().with_data_mode(DataMode::Relative);
    let mut pad = Pinnacle::new(bus, NoopDelay::new(), config);

    let Sample::Relative(s) = pad.read_sample().unwrap().sample else {
      panic!("wrong mode");
    };
    assert_eq!((s.buttons, s.dx, s.dy, s.scroll), (0x01, 5, -5, 0));
    assert!(s.primary());
  }

  #[test]
  fn nothing_ready_is_not_an_error() {
    let mut pad: Pinnacle<SimBus, NoReadyPin, NoopDelay> =
      Pinnacle::new(SimBus::new(), NoopDelay::new(), Config::default());
    assert!(pad.try_read_sample().unwrap().is_none());
  }
}
