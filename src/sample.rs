//! Trackpad packet decoding and coordinate scaling.
//!
//! Decoding is pure: it reinterprets a packet buffer captured elsewhere and
//! never touches the device. The layouts are fixed per data mode — six bytes
//! for absolute, four for relative.

use crate::regs::*;

/// Which packet layout the feed streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataMode {
  Relative,
  #[default]
  Absolute,
}

impl DataMode {
  /// Trackpad packet length for this mode.
  pub const fn packet_len(self) -> usize {
    match self {
      DataMode::Relative => RELATIVE_PACKET_LEN,
      DataMode::Absolute => ABSOLUTE_PACKET_LEN,
    }
  }
}

/// One absolute-mode measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AbsoluteSample {
  pub x: u16,
  pub y: u16,
  /// 6-bit touch strength.
  pub z: u8,
  /// 6-bit switch states.
  pub buttons: u8,
  /// Derived from `x != 0`; the device reports no separate contact bit.
  pub touching: bool,
}

impl AbsoluteSample {
  /// Whether switch `n` (0..=5) is pressed.
  pub const fn switch(&self, n: u8) -> bool {
    n < 6 && self.buttons & (1 << n) != 0
  }

  /// Clamp coordinates to the physically reachable window.
  ///
  /// Values outside it can only appear as a result of noise.
  pub fn clip(&mut self) {
    self.x = self.x.clamp(X_LOWER, X_UPPER);
    self.y = self.y.clamp(Y_LOWER, Y_UPPER);
  }

  /// Clip, then affinely map the reachable window onto
  /// `0..=x_res` / `0..=y_res`.
  pub fn clip_and_scale(&mut self, x_res: u16, y_res: u16) {
    self.clip();
    let x = u32::from(self.x - X_LOWER);
    let y = u32::from(self.y - Y_LOWER);
    self.x = (x * u32::from(x_res) / u32::from(X_RANGE)) as u16;
    self.y = (y * u32::from(y_res) / u32::from(Y_RANGE)) as u16;
  }
}

/// One relative-mode measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelativeSample {
  /// 3-bit button states.
  pub buttons: u8,
  pub dx: i8,
  pub dy: i8,
  pub scroll: i8,
}

impl RelativeSample {
  pub const fn primary(&self) -> bool {
    self.buttons & REL_BUTTON_PRIMARY != 0
  }

  pub const fn secondary(&self) -> bool {
    self.buttons & REL_BUTTON_SECONDARY != 0
  }

  pub const fn auxiliary(&self) -> bool {
    self.buttons & REL_BUTTON_AUXILIARY != 0
  }
}

/// A decoded measurement in whichever mode the feed was configured for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sample {
  Absolute(AbsoluteSample),
  Relative(RelativeSample),
}

/// A [`Sample`] plus the tick count at capture.
///
/// The tick value comes from the time source configured on the driver or
/// slot; it is informational only — synchronize on the ready flag, not the
/// timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimestampedSample {
  pub sample: Sample,
  pub ticks: u32,
}

/// Decode a raw trackpad packet.
///
/// `raw` must hold at least [`DataMode::packet_len`] bytes; extra bytes are
/// ignored. Absolute x/y share a high-nibble byte: x takes the low nibble of
/// byte 4, y the high nibble.
pub fn decode(raw: &[u8], mode: DataMode) -> Sample {
  match mode {
    DataMode::Absolute => {
      let x = u16::from(raw[2]) | (u16::from(raw[4] & 0x0F) << 8);
      let y = u16::from(raw[3]) | (u16::from(raw[4] & 0xF0) << 4);
      Sample::Absolute(AbsoluteSample {
        x,
        y,
        z: raw[5] & 0x3F,
        buttons: raw[0] & 0x3F,
        touching: x != 0,
      })
    }
    DataMode::Relative => Sample::Relative(RelativeSample {
      buttons: raw[0] & 0x07,
      dx: raw[1] as i8,
      dy: raw[2] as i8,
      scroll: raw[3] as i8,
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn absolute_packet_decodes() {
    let Sample::Absolute(s) = decode(&[0x01, 0x00, 0x7F, 0x05, 0x30, 0x12], DataMode::Absolute) else {
      panic!("wrong mode");
    };
    // x = low byte | low nibble of the shared byte, y = next byte | high nibble
    assert_eq!(s.x, 127);
    assert_eq!(s.y, 0x05 | 0x300);
    assert_eq!(s.z, 0x12);
    assert_eq!(s.buttons, 0x01);
    assert!(s.touching);
    assert!(s.switch(0));
    assert!(!s.switch(1));
  }

  #[test]
  fn absolute_x_zero_means_no_touch() {
    let Sample::Absolute(s) = decode(&[0x00, 0x00, 0x00, 0x40, 0x00, 0x00], DataMode::Absolute) else {
      panic!("wrong mode");
    };
    assert_eq!(s.x, 0);
    assert!(!s.touching);
  }

  #[test]
  fn relative_packet_decodes() {
    let Sample::Relative(s) = decode(&[0x00, 0x05, 0xFB, 0x00], DataMode::Relative) else {
      panic!("wrong mode");
    };
    assert_eq!(s.dx, 5);
    assert_eq!(s.dy, -5);
    assert_eq!(s.scroll, 0);
    assert_eq!(s.buttons, 0);
    assert!(!s.primary());
  }

  #[test]
  fn relative_buttons_mask_to_three_bits() {
    let Sample::Relative(s) = decode(&[0xFF, 0x00, 0x00, 0x01], DataMode::Relative) else {
      panic!("wrong mode");
    };
    assert_eq!(s.buttons, 0x07);
    assert!(s.primary() && s.secondary() && s.auxiliary());
  }

  #[test]
  fn scale_maps_window_endpoints_exactly() {
    let mut lo = AbsoluteSample { x: X_LOWER, y: Y_LOWER, ..Default::default() };
    lo.clip_and_scale(1000, 1000);
    assert_eq!((lo.x, lo.y), (0, 0));

    let mut hi = AbsoluteSample { x: X_UPPER, y: Y_UPPER, ..Default::default() };
    hi.clip_and_scale(1000, 1000);
    assert_eq!((hi.x, hi.y), (1000, 1000));
  }

  #[test]
  fn scale_clips_noise_outside_the_window() {
    let mut s = AbsoluteSample { x: 0, y: Y_MAX, ..Default::default() };
    s.clip_and_scale(800, 600);
    assert_eq!((s.x, s.y), (0, 600));

    let mut s = AbsoluteSample { x: X_MAX, y: 0, ..Default::default() };
    s.clip_and_scale(800, 600);
    assert_eq!((s.x, s.y), (800, 0));
  }

  #[test]
  fn scale_is_monotonic() {
    let mut prev = 0;
    for x in (X_LOWER..=X_UPPER).step_by(7) {
      let mut s = AbsoluteSample { x, y: Y_LOWER, ..Default::default() };
      s.clip_and_scale(480, 272);
      assert!(s.x >= prev);
      prev = s.x;
    }
  }
}
