//! Latest-value channel with capacity one.
//!
//! The producer never waits: a buffer nobody took yet is overwritten and
//! counted as dropped. Counters are plain loads and stores under the lock,
//! Cortex-M0+ has no atomic read-modify-write.

use core::cell::RefCell;

use critical_section::Mutex;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotStats {
    pub published: u32,
    pub taken: u32,
    pub dropped: u32,
}

struct Slot<const N: usize> {
    samples: [u16; N],
    generation: u32,
    consumed: u32,
    stats: SlotStats,
}

pub struct LatestSlot<const N: usize> {
    inner: Mutex<RefCell<Slot<N>>>,
}

impl<const N: usize> LatestSlot<N> {
    pub const fn new() -> Self {
        LatestSlot {
            inner: Mutex::new(RefCell::new(Slot {
                samples: [0; N],
                generation: 0,
                consumed: 0,
                stats: SlotStats {
                    published: 0,
                    taken: 0,
                    dropped: 0,
                },
            })),
        }
    }

    /// Returns `true` when a pending buffer was overwritten.
    pub fn publish(&self, samples: &[u16; N]) -> bool {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).borrow_mut();
            let overwritten = slot.generation != slot.consumed;
            slot.samples = *samples;
            slot.generation = slot.generation.wrapping_add(1);
            slot.stats.published = slot.stats.published.wrapping_add(1);
            if overwritten {
                slot.stats.dropped = slot.stats.dropped.wrapping_add(1);
            }
            overwritten
        })
    }

    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| {
            let slot = self.inner.borrow(cs).borrow();
            slot.generation != slot.consumed
        })
    }

    /// Copies the pending buffer into `out`, `false` when nothing new was
    /// published since the last take.
    pub fn try_take(&self, out: &mut [u16; N]) -> bool {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).borrow_mut();
            if slot.generation == slot.consumed {
                return false;
            }
            *out = slot.samples;
            slot.consumed = slot.generation;
            slot.stats.taken = slot.stats.taken.wrapping_add(1);
            true
        })
    }

    /// Spins until a buffer is published. Never call from interrupt context.
    pub fn take(&self, out: &mut [u16; N]) {
        while !self.try_take(out) {
            core::hint::spin_loop();
        }
    }

    pub fn stats(&self) -> SlotStats {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().stats)
    }
}

impl<const N: usize> Default for LatestSlot<N> {
    fn default() -> Self {
        LatestSlot::new()
    }
}
