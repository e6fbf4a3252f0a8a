//! Device slot table and interrupt dispatch.
//!
//! Hardware interrupt vectors are zero-argument functions with no captured
//! context, so a vector cannot know which driver instance it belongs to. The
//! classic fix is an arena of slots: a fixed static table keyed by a small
//! id, each entry self-contained (its own bus identity, callbacks and
//! buffer), plus one trampoline function per slot that closes over nothing
//! but its compile-time index.
//!
//! A vector body touches only its own slot. It never reaches the owning
//! driver instance, which is what makes it safe to run under true
//! asynchronous preemption while the instance is mid-configuration.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;

use crate::bus::{BusHandle, IsrReadFn, IsrWriteFn};
use crate::regs::{Reg, ABSOLUTE_PACKET_LEN, STATUS_CLEAR};
use crate::sample::{decode, DataMode, TimestampedSample};

/// Number of concurrently registrable devices. Registration past this is a
/// hard failure; the table has no eviction.
pub const SLOT_COUNT: usize = 4;

/// Handle to one claimed entry in the slot table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotId(u8);

impl SlotId {
  #[inline]
  fn index(self) -> usize {
    self.0 as usize
  }
}

/// Transport callbacks and identity bound into a slot at registration.
///
/// `rap_read` / `rap_write` come from the platform layer and must operate on
/// the [`BusHandle`] alone — the slot is the only context the interrupt
/// vector has. `now` stamps captures, in whatever tick unit the platform
/// keeps.
#[derive(Clone, Copy)]
pub struct IsrBinding {
  pub handle: BusHandle,
  pub rap_read: IsrReadFn,
  pub rap_write: IsrWriteFn,
  pub now: fn() -> u32,
}

struct Slot {
  handle: BusHandle,
  rap_read: IsrReadFn,
  rap_write: IsrWriteFn,
  now: fn() -> u32,
  mode: DataMode,
  raw: [u8; ABSOLUTE_PACKET_LEN],
  latest: Option<TimestampedSample>,
}

const FREE: Mutex<RefCell<Option<Slot>>> = Mutex::new(RefCell::new(None));
static SLOTS: [Mutex<RefCell<Option<Slot>>>; SLOT_COUNT] = [FREE; SLOT_COUNT];

// Ready flags live outside the slot so the owner can poll them without
// taking a critical section.
const CLEAR: AtomicBool = AtomicBool::new(false);
static READY: [AtomicBool; SLOT_COUNT] = [CLEAR; SLOT_COUNT];

/// Claim the next free slot. `None` means the table is full.
pub(crate) fn claim(binding: IsrBinding, mode: DataMode) -> Option<SlotId> {
  critical_section::with(|cs| {
    for (i, entry) in SLOTS.iter().enumerate() {
      let mut entry = entry.borrow_ref_mut(cs);
      if entry.is_none() {
        *entry = Some(Slot {
          handle: binding.handle,
          rap_read: binding.rap_read,
          rap_write: binding.rap_write,
          now: binding.now,
          mode,
          raw: [0; ABSOLUTE_PACKET_LEN],
          latest: None,
        });
        READY[i].store(false, Ordering::Release);
        return Some(SlotId(i as u8));
      }
    }
    None
  })
}

/// Release a claimed slot. Idempotent; detach the interrupt line *before*
/// calling this, or a late edge will find an empty slot (harmless) or a
/// freshly reclaimed one (not yours).
pub(crate) fn release(id: SlotId) {
  critical_section::with(|cs| {
    *SLOTS[id.index()].borrow_ref_mut(cs) = None;
  });
  READY[id.index()].store(false, Ordering::Release);
}

/// Whether the slot holds a sample not yet consumed. Does not clear.
pub fn sample_ready(id: SlotId) -> bool {
  READY[id.index()].load(Ordering::Acquire)
}

/// Mark the slot's sample consumed. Call after copying the sample out; this
/// is the produce/consume rendezvous with the interrupt vector.
pub fn clear_sample_ready(id: SlotId) {
  READY[id.index()].store(false, Ordering::Release);
}

/// Copy out the most recent decoded sample, if any capture has completed.
pub(crate) fn latest(id: SlotId) -> Option<TimestampedSample> {
  critical_section::with(|cs| SLOTS[id.index()].borrow_ref(cs).as_ref().and_then(|slot| slot.latest))
}

/// The trampoline bound to this slot's interrupt line.
pub fn vector(id: SlotId) -> fn() {
  VECTORS[id.index()]
}

static VECTORS: [fn(); SLOT_COUNT] = [vector0, vector1, vector2, vector3];

fn vector0() {
  service(0)
}

fn vector1() {
  service(1)
}

fn vector2() {
  service(2)
}

fn vector3() {
  service(3)
}

/// Interrupt-vector body for slot `i`: capture, stamp, clear device flags,
/// decode, publish. Touches slot-local data only.
fn service(i: usize) {
  let captured = critical_section::with(|cs| {
    let mut entry = SLOTS[i].borrow_ref_mut(cs);
    let Some(slot) = entry.as_mut() else {
      // Released (or never claimed); a stale edge is dropped on the floor.
      return false;
    };

    let len = slot.mode.packet_len();
    let (handle, rap_read, rap_write) = (slot.handle, slot.rap_read, slot.rap_write);
    if rap_read(handle, Reg::PacketByte0, &mut slot.raw[..len]).is_err() {
      return false;
    }
    let ticks = (slot.now)();
    // Also deasserts the hardware data-ready line. The sample is already
    // captured, so a failed clear does not invalidate it.
    let _ = rap_write(handle, Reg::Status, STATUS_CLEAR);
    slot.latest = Some(TimestampedSample { sample: decode(&slot.raw[..len], slot.mode), ticks });
    true
  });

  if captured {
    READY[i].store(true, Ordering::Release);
  }
}

/// Host-platform boundary for one rising-edge interrupt line.
///
/// `embedded-hal` has no attach-a-callback trait, so the platform crate
/// implements this for whatever its EXTI/PCINT machinery looks like.
pub trait InterruptLine {
  /// Run `vector` on each rising edge of the line.
  fn attach(&mut self, vector: fn()) -> Result<(), IrqError>;

  /// Stop routing edges. Takes effect for future edges; an in-flight vector
  /// body is not interrupted. Must not fail if nothing is attached.
  fn detach(&mut self);
}

/// Interrupt-line attachment failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqError {
  /// The requested GPIO cannot serve as an interrupt source.
  NotAnInterruptPin,
}

/// The slot table is process-wide, so tests that touch it must not overlap.
#[cfg(test)]
pub(crate) fn table_guard() -> std::sync::MutexGuard<'static, ()> {
  static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
  LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
