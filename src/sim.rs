//! Simulated Pinnacle used by the host test-suite: a RAP register file with
//! just enough ERA behaviour to exercise the handshake. The busy flag clears
//! after exactly one completion poll.

use std::collections::HashMap;
use std::vec::Vec;

use crate::bus::RegisterBus;
use crate::regs::*;

pub(crate) struct SimBus {
  pub regs: [u8; 32],
  /// Extended (16-bit addressed) register space.
  pub ext: HashMap<u16, u8>,
  /// Every RAP write, in order, as (register, value).
  pub writes: Vec<(u8, u8)>,
  /// When set, the ERA busy flag never clears.
  pub unresponsive: bool,
  era_addr: u16,
  busy_polls: u8,
}

impl SimBus {
  pub fn new() -> Self {
    let mut regs = [0u8; 32];
    regs[Reg::AsicId as usize] = 0x07;
    regs[Reg::FirmwareVersion as usize] = 0x3A;
    regs[Reg::ProductId as usize] = 0x4D;
    Self { regs, ext: HashMap::new(), writes: Vec::new(), unresponsive: false, era_addr: 0, busy_polls: 0 }
  }

  /// Stage a trackpad packet and raise the data-ready flag.
  pub fn load_packet(&mut self, packet: &[u8]) {
    self.regs[Reg::PacketByte0 as usize..Reg::PacketByte0 as usize + packet.len()].copy_from_slice(packet);
    self.regs[Reg::Status as usize] |= STATUS_DATA_READY;
  }

  fn read_one(&mut self, addr: u8) -> u8 {
    if addr == Reg::EraControl as u8 {
      if self.unresponsive {
        return 0xFF;
      }
      if self.busy_polls > 0 {
        self.busy_polls -= 1;
        return self.regs[addr as usize];
      }
      self.regs[addr as usize] = 0;
      return 0;
    }
    self.regs[addr as usize & 0x1F]
  }
}

impl RegisterBus for SimBus {
  type BusError = core::convert::Infallible;

  fn rap_read(&mut self, reg: Reg, buf: &mut [u8]) -> Result<(), Self::BusError> {
    // Device-side auto-increment through the window.
    for (i, byte) in buf.iter_mut().enumerate() {
      *byte = self.read_one(reg as u8 + i as u8);
    }
    Ok(())
  }

  fn rap_write(&mut self, reg: Reg, value: u8) -> Result<(), Self::BusError> {
    self.writes.push((reg as u8, value));
    match reg {
      Reg::EraAddrHigh => self.era_addr = (self.era_addr & 0x00FF) | (u16::from(value) << 8),
      Reg::EraAddrLow => self.era_addr = (self.era_addr & 0xFF00) | u16::from(value),
      Reg::EraControl => {
        self.regs[reg as usize] = value;
        self.busy_polls = 1;
        if value & ERA_READ != 0 {
          self.regs[Reg::EraValue as usize] = self.ext.get(&self.era_addr).copied().unwrap_or(0);
          if value & ERA_READ_AUTO_INCR != 0 {
            self.era_addr = self.era_addr.wrapping_add(1);
          }
        } else if value & ERA_WRITE != 0 {
          self.ext.insert(self.era_addr, self.regs[Reg::EraValue as usize]);
          if value & ERA_WRITE_AUTO_INCR != 0 {
            self.era_addr = self.era_addr.wrapping_add(1);
          }
        }
        return Ok(());
      }
      _ => {}
    }
    self.regs[reg as usize] = value;
    Ok(())
  }
}
