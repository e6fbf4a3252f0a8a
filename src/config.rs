//! Staged driver configuration.
//!
//! Nothing here touches the device; values are pushed by
//! [`initialize`](crate::Pinnacle::initialize). Either describe the feed
//! through the typed knobs (data mode, y inversion, z-idle, sample rate) or
//! hand over raw feed-config bytes with [`Config::with_feed_override`] for
//! setups that need the auxiliary behaviours tuned individually.

use crate::regs::*;
use crate::sample::DataMode;

/// Set or clear `flag` in a register image.
#[inline]
pub(crate) fn set_flag(value: &mut u8, flag: u8, on: bool) {
  if on {
    *value |= flag;
  } else {
    *value &= !flag;
  }
}

/// Raw feed-config register images, for callers that want full control over
/// both bitfields instead of the derived defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeedConfig {
  pub feed1: u8,
  pub feed2: u8,
}

impl FeedConfig {
  /// Absolute mode, feed enabled, auxiliary behaviours off.
  pub const fn absolute() -> Self {
    Self { feed1: FEED1_CFG_ABSOLUTE, feed2: FEED2_CFG_ABSOLUTE }
  }

  /// Relative mode, feed enabled, taps and scroll on.
  pub const fn relative() -> Self {
    Self { feed1: FEED1_CFG_RELATIVE, feed2: FEED2_CFG_RELATIVE }
  }

  /// Data mode encoded in the feed1 image. Overrides win over the typed
  /// `Config` mode, so the decoder always matches what the device streams.
  pub const fn data_mode(&self) -> DataMode {
    if self.feed1 & FEED1_DATA_MODE != 0 {
      DataMode::Absolute
    } else {
      DataMode::Relative
    }
  }

  pub fn feed1_flag(mut self, flag: u8, on: bool) -> Self {
    set_flag(&mut self.feed1, flag, on);
    self
  }

  pub fn feed2_flag(mut self, flag: u8, on: bool) -> Self {
    set_flag(&mut self.feed2, flag, on);
    self
  }

  pub fn invert_y(self, on: bool) -> Self {
    self.feed1_flag(FEED1_Y_DATA_INVERT, on)
  }

  pub fn swap_xy(self, on: bool) -> Self {
    self.feed2_flag(FEED2_SWAP_XY, on)
  }
}

fn no_ticks() -> u32 {
  0
}

/// Constructor-time defaults for one driver instance.
#[derive(Clone, Copy, Debug)]
pub struct Config {
  pub data_mode: DataMode,
  /// Empty packets streamed after lift-off before the feed goes quiet.
  pub z_idle_count: u8,
  pub invert_y: bool,
  pub sample_rate: SampleRate,
  /// Raw feed bytes, taking precedence over the typed fields above.
  pub feed_override: Option<FeedConfig>,
  /// Platform tick source used to stamp captures. Defaults to a constant
  /// zero for hosts that do not care about capture times.
  pub time_source: fn() -> u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      data_mode: DataMode::Absolute,
      z_idle_count: DEFAULT_Z_IDLE_COUNT,
      invert_y: false,
      sample_rate: SampleRate::default(),
      feed_override: None,
      time_source: no_ticks,
    }
  }
}

impl Config {
  pub fn with_data_mode(mut self, mode: DataMode) -> Self {
    self.data_mode = mode;
    self
  }

  pub fn with_z_idle_count(mut self, count: u8) -> Self {
    self.z_idle_count = count;
    self
  }

  pub fn with_invert_y(mut self, on: bool) -> Self {
    self.invert_y = on;
    self
  }

  pub fn with_sample_rate(mut self, rate: SampleRate) -> Self {
    self.sample_rate = rate;
    self
  }

  pub fn with_feed_override(mut self, feed: FeedConfig) -> Self {
    self.feed_override = Some(feed);
    self
  }

  pub fn with_time_source(mut self, now: fn() -> u32) -> Self {
    self.time_source = now;
    self
  }

  /// The feed1/feed2 images `initialize` will program, with the typed
  /// fields folded in when no raw override is staged.
  pub(crate) fn feed_bytes(&self) -> FeedConfig {
    match self.feed_override {
      Some(feed) => feed,
      None => {
        let base = match self.data_mode {
          DataMode::Absolute => FeedConfig::absolute(),
          DataMode::Relative => FeedConfig::relative(),
        };
        base.invert_y(self.invert_y)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn typed_defaults_derive_the_documented_images() {
    let cfg = Config::default();
    assert_eq!(cfg.feed_bytes(), FeedConfig { feed1: 0x03, feed2: 0x1F });

    let rel = Config::default().with_data_mode(DataMode::Relative).with_invert_y(true);
    assert_eq!(rel.feed_bytes(), FeedConfig { feed1: 0x81, feed2: 0x01 });
  }

  #[test]
  fn override_wins_and_fixes_the_data_mode() {
    let feed = FeedConfig::relative().swap_xy(true);
    let cfg = Config::default().with_feed_override(feed);
    assert_eq!(cfg.feed_bytes(), feed);
    assert_eq!(feed.data_mode(), DataMode::Relative);
    assert_eq!(FeedConfig::absolute().data_mode(), DataMode::Absolute);
  }

  #[test]
  fn flag_helpers_set_and_clear() {
    let mut v = 0u8;
    set_flag(&mut v, FEED1_Y_DATA_INVERT, true);
    assert_eq!(v, 0x80);
    set_flag(&mut v, FEED1_Y_DATA_INVERT, false);
    assert_eq!(v, 0x00);

    let feed = FeedConfig::absolute().invert_y(true);
    assert_eq!(feed.feed1, 0x83);
  }
}
