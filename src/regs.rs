/******************************************************************************
 * Refer to the Cirque Pinnacle (GlidePoint) datasheet for more information:  *
 * - https://www.cirque.com/gen2gen3-asic-details                             *
 * ========================================================================== *
 *                      Pinnacle ASIC - Registers & Memory Map                *
*******************************************************************************/

/// Cirque's 7-bit I2C slave address.
pub const DEFAULT_I2C_ADDR: u8 = 0x2A;

// Command-byte markers for the Register Access Protocol (RAP).
pub(crate) const RAP_WRITE_MASK: u8 = 0x80;
pub(crate) const RAP_READ_MASK: u8 = 0xA0;

// Filler byte clocked out during SPI reads while the device drives MISO.
pub(crate) const SPI_FILLER: u8 = 0xFC;

/// The basic 32-register window reachable through RAP.
#[allow(dead_code)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg {
  /// Firmware ASIC id, reads 0x07.
  AsicId = 0x00,
  /// Firmware version, reads 0x3A.
  FirmwareVersion = 0x01,
  /// Command-complete and data-ready flags; write 0x00 to clear.
  Status = 0x02,
  SysConfig = 0x03,
  FeedConfig1 = 0x04,
  FeedConfig2 = 0x05,
  Reserved06 = 0x06,
  CalConfig1 = 0x07,
  Ps2AuxControl = 0x08,
  SampleRate = 0x09,
  ZIdle = 0x0A,
  ZScaler = 0x0B,
  /// Time asleep until checking for a finger.
  SleepInterval = 0x0C,
  /// Time after idle mode until sleep starts.
  SleepTimer = 0x0D,
  DynamicEmiAdjustThreshold = 0x0E,
  Reserved0F = 0x0F,
  Reserved10 = 0x10,
  Reserved11 = 0x11,

  // Trackpad packet window (0x12..0x17); reads auto-increment through it.
  PacketByte0 = 0x12,
  PacketByte1 = 0x13,
  PacketByte2 = 0x14,
  PacketByte3 = 0x15,
  PacketByte4 = 0x16,
  PacketByte5 = 0x17,

  PortAGpioControl = 0x18,
  PortAGpioData = 0x19,
  /// Port B control & data share one register.
  PortBGpioControlData = 0x1A,

  // Extended Register Access window (0x1B..0x1E)
  EraValue = 0x1B,
  EraAddrHigh = 0x1C,
  EraAddrLow = 0x1D,
  EraControl = 0x1E,

  /// Product id, read-only.
  ProductId = 0x1F,
}

impl Reg {
  /// Whether the register rejects RAP writes.
  pub const fn read_only(self) -> bool {
    matches!(
      self,
      Reg::AsicId
        | Reg::FirmwareVersion
        | Reg::Reserved0F
        | Reg::Reserved10
        | Reg::Reserved11
        | Reg::PacketByte0
        | Reg::PacketByte1
        | Reg::PacketByte2
        | Reg::PacketByte3
        | Reg::PacketByte4
        | Reg::PacketByte5
        | Reg::ProductId
    )
  }

  /// Documented power-on value, where the datasheet fixes one.
  pub const fn reset_value(self) -> Option<u8> {
    match self {
      Reg::AsicId => Some(ASIC_ID),
      Reg::FirmwareVersion => Some(FIRMWARE_VERSION),
      Reg::ZIdle => Some(0x1E),
      Reg::SampleRate => Some(SampleRate::Hz100 as u8),
      _ => None,
    }
  }
}

impl From<Reg> for u8 {
  #[inline]
  fn from(r: Reg) -> Self {
    r as u8
  }
}

pub(crate) const ASIC_ID: u8 = 0x07;
pub(crate) const FIRMWARE_VERSION: u8 = 0x3A;

// Status register flags
pub const STATUS_COMMAND_COMPLETE: u8 = 0b0000_1000;
pub const STATUS_DATA_READY: u8 = 0b0000_0100;
pub const STATUS_CLEAR: u8 = 0x00;

// FeedConfig1 flags
pub const FEED1_Y_DATA_INVERT: u8 = 0b1000_0000;
pub const FEED1_X_DATA_INVERT: u8 = 0b0100_0000;
pub const FEED1_Y_DISABLE: u8 = 0b0001_0000;
pub const FEED1_X_DISABLE: u8 = 0b0000_1000;
pub const FEED1_FILTER_DISABLE: u8 = 0b0000_0100;
/// 1 selects absolute data mode.
pub const FEED1_DATA_MODE: u8 = 0b0000_0010;
pub const FEED1_FEED_ENABLE: u8 = 0b0000_0001;
/// Absolute data mode, feed enabled.
pub const FEED1_CFG_ABSOLUTE: u8 = FEED1_DATA_MODE | FEED1_FEED_ENABLE;
/// Relative data mode, feed enabled.
pub const FEED1_CFG_RELATIVE: u8 = FEED1_FEED_ENABLE;

// FeedConfig2 flags
pub const FEED2_SWAP_XY: u8 = 0b1000_0000;
pub const FEED2_GLIDE_EXTEND_DISABLE: u8 = 0b0001_0000;
pub const FEED2_SCROLL_DISABLE: u8 = 0b0000_1000;
pub const FEED2_SECONDARY_TAP_DISABLE: u8 = 0b0000_0100;
pub const FEED2_ALL_TAPS_DISABLE: u8 = 0b0000_0010;
pub const FEED2_INTELLIMOUSE_ENABLE: u8 = 0b0000_0001;
/// Absolute mode: auxiliary feed behaviours off, intellimouse on.
pub const FEED2_CFG_ABSOLUTE: u8 = FEED2_GLIDE_EXTEND_DISABLE
  | FEED2_SCROLL_DISABLE
  | FEED2_SECONDARY_TAP_DISABLE
  | FEED2_ALL_TAPS_DISABLE
  | FEED2_INTELLIMOUSE_ENABLE;
/// Relative mode: all auxiliary behaviours on, no axis swap.
pub const FEED2_CFG_RELATIVE: u8 = FEED2_INTELLIMOUSE_ENABLE;

// EraControl codes
pub const ERA_WRITE_AUTO_INCR: u8 = 0b0000_1000;
pub const ERA_READ_AUTO_INCR: u8 = 0b0000_0100;
pub const ERA_WRITE: u8 = 0b0000_0010;
pub const ERA_READ: u8 = 0b0000_0001;
/// Read with auto-increment, the code used for sequential ERA reads.
pub const ERA_CFG_READ_AUTO_INCR: u8 = ERA_READ_AUTO_INCR | ERA_READ;

// Relative-packet button flags
pub const REL_BUTTON_PRIMARY: u8 = 0b0000_0001;
pub const REL_BUTTON_SECONDARY: u8 = 0b0000_0010;
pub const REL_BUTTON_AUXILIARY: u8 = 0b0000_0100;

/// Trackpad packet lengths per data mode.
pub const ABSOLUTE_PACKET_LEN: usize = 6;
pub const RELATIVE_PACKET_LEN: usize = 4;

/// Default z-idle packet count programmed at initialization.
pub const DEFAULT_Z_IDLE_COUNT: u8 = 5;

/// Feed sample rates accepted by the `SampleRate` register.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleRate {
  #[default]
  Hz100 = 0x64,
  Hz80 = 0x50,
  Hz60 = 0x3C,
  Hz40 = 0x28,
  Hz20 = 0x14,
  Hz10 = 0x0A,
}

impl From<SampleRate> for u8 {
  #[inline]
  fn from(r: SampleRate) -> Self {
    r as u8
  }
}

// Coordinate window. The ASIC reports 0..=2047 x 0..=1535, but a finger can
// only physically reach the inner window below; anything outside is noise.
pub const X_MAX: u16 = 2047;
pub const Y_MAX: u16 = 1535;
pub const X_LOWER: u16 = 127;
pub const X_UPPER: u16 = 1919;
pub const Y_LOWER: u16 = 63;
pub const Y_UPPER: u16 = 1471;
pub const X_RANGE: u16 = X_UPPER - X_LOWER;
pub const Y_RANGE: u16 = Y_UPPER - Y_LOWER;
