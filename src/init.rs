//! Device bring-up and feed configuration.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::config::set_flag;
use crate::regs::*;
use crate::{Error, Pinnacle, RegisterBus};

/// Identity registers read during bring-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId {
  pub asic_id: u8,
  pub firmware_version: u8,
  pub product_id: u8,
}

impl<B, E, DR, D> Pinnacle<B, DR, D>
where
  B: RegisterBus<BusError = E>,
  DR: InputPin,
  D: DelayNs,
{
  /// Program the staged [`Config`](crate::Config) into the device.
  ///
  /// Verifies the ASIC id first, then clears the status flags and writes
  /// the configuration registers. FeedConfig1 goes last: it carries the
  /// feed-enable bit, and the feed must not start streaming against a
  /// partially written setup.
  pub fn initialize(&mut self) -> Result<(), Error<E>> {
    let id = self.identify()?;
    if id.asic_id != ASIC_ID {
      return Err(Error::InvalidChipId(id.asic_id));
    }

    let feed = self.config.feed_bytes();
    if self.config.feed_override.is_some() {
      // The device may already be streaming from an earlier session; quiet
      // it before reprogramming, and trust the override's mode bit.
      self.enable_feed(false)?;
      self.config.data_mode = feed.data_mode();
    }

    self.clear_flags()?;
    self.write_reg(Reg::ZIdle, self.config.z_idle_count)?;
    self.write_reg(Reg::SampleRate, self.config.sample_rate.into())?;
    self.write_reg(Reg::FeedConfig2, feed.feed2)?;
    self.write_reg(Reg::FeedConfig1, feed.feed1)
  }

  /// Read the ASIC id, firmware version and product id.
  pub fn identify(&mut self) -> Result<DeviceId, Error<E>> {
    Ok(DeviceId {
      asic_id: self.read_reg(Reg::AsicId)?,
      firmware_version: self.read_reg(Reg::FirmwareVersion)?,
      product_id: self.read_reg(Reg::ProductId)?,
    })
  }

  /// Start or stop the sample feed, preserving the rest of FeedConfig1.
  pub fn enable_feed(&mut self, on: bool) -> Result<(), Error<E>> {
    let mut feed1 = self.read_reg(Reg::FeedConfig1)?;
    set_flag(&mut feed1, FEED1_FEED_ENABLE, on);
    self.write_reg(Reg::FeedConfig1, feed1)
  }

  /// Invert absolute Y values from here on.
  pub fn invert_y(&mut self, on: bool) -> Result<(), Error<E>> {
    let mut feed1 = self.read_reg(Reg::FeedConfig1)?;
    set_flag(&mut feed1, FEED1_Y_DATA_INVERT, on);
    self.config.invert_y = on;
    self.write_reg(Reg::FeedConfig1, feed1)
  }

  /// Change the feed sample rate.
  pub fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), Error<E>> {
    self.config.sample_rate = rate;
    self.write_reg(Reg::SampleRate, rate.into())
  }

  /// Change the z-idle packet count streamed after lift-off.
  pub fn set_z_idle(&mut self, count: u8) -> Result<(), Error<E>> {
    self.config.z_idle_count = count;
    self.write_reg(Reg::ZIdle, count)
  }
}
