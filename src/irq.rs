//! Interrupt registration for one driver instance.
//!
//! Registration wires this instance into the static slot table and attaches
//! the slot's trampoline to the platform's rising-edge interrupt machinery.
//! From then on the vector captures samples on its own; the foreground
//! consumes them through the ready-flag rendezvous.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::sample::TimestampedSample;
use crate::slots::{self, InterruptLine, IsrBinding, SlotId};
use crate::{Error, Pinnacle, RegisterBus};

impl<B, E, DR, D> Pinnacle<B, DR, D>
where
  B: RegisterBus<BusError = E>,
  DR: InputPin,
  D: DelayNs,
{
  /// Register this instance for interrupt-driven sampling.
  ///
  /// Claims a slot, binds the interrupt-context callbacks, and attaches the
  /// slot's vector to `line`. The feed is quiet for the whole sequence and
  /// re-enabled as the very last step, so no edge can fire against a
  /// half-initialized slot. Fails with [`Error::OutOfSlots`] when all slots
  /// are claimed and [`Error::NotAnInterruptPin`] when the line cannot
  /// source interrupts.
  pub fn attach_interrupt<L: InterruptLine>(&mut self, line: &mut L, binding: IsrBinding) -> Result<SlotId, Error<E>> {
    self.enable_feed(false)?;
    self.clear_flags()?;

    let id = slots::claim(binding, self.config.data_mode).ok_or(Error::OutOfSlots)?;
    if let Err(e) = line.attach(slots::vector(id)) {
      slots::release(id);
      return Err(e.into());
    }
    self.slot = Some(id);

    if let Err(e) = self.enable_feed(true) {
      line.detach();
      slots::release(id);
      self.slot = None;
      return Err(e);
    }
    Ok(id)
  }

  /// Stop interrupt-driven sampling and release the slot.
  ///
  /// Effective for future edges immediately; an in-flight vector body runs
  /// to completion. Harmless when nothing is attached.
  pub fn detach_interrupt<L: InterruptLine>(&mut self, line: &mut L) {
    if let Some(id) = self.slot.take() {
      line.detach();
      slots::release(id);
    }
  }

  /// The slot claimed by [`Pinnacle::attach_interrupt`], if any.
  pub fn slot(&self) -> Option<SlotId> {
    self.slot
  }

  /// Whether the slot holds an unconsumed sample. Does not clear the flag.
  pub fn sample_ready(&self) -> bool {
    self.slot.map(slots::sample_ready).unwrap_or(false)
  }

  /// Mark the slot's sample consumed.
  pub fn clear_sample_ready(&self) {
    if let Some(id) = self.slot {
      slots::clear_sample_ready(id);
    }
  }

  /// Copy out the most recent interrupt-captured sample without touching
  /// the ready flag.
  pub fn latest_sample(&self) -> Option<TimestampedSample> {
    self.slot.and_then(slots::latest)
  }
}
