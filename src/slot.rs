//! Ring buffer slots and their stamp encoding.
//!
//! A stamp packs a position and a state bit:
//!
//! ```text
//!   vacant(pos)   = pos << 1        ready for the producer at `pos`
//!   occupied(pos) = pos << 1 | 1    ready for the consumer at `pos`
//! ```
//!
//! so that `vacant(p) < occupied(p) < vacant(p + 1)` holds for every position,
//! including when a single slot serves consecutive positions.

use core::mem::MaybeUninit;

use crate::sync::{AtomicUsize, UnsafeCell};

/// Stamp of a slot waiting for the producer at `pos`.
#[inline(always)]
pub(crate) const fn vacant(pos: usize) -> usize { pos << 1 }

/// Stamp of a slot holding the value pushed at `pos`.
#[inline(always)]
pub(crate) const fn occupied(pos: usize) -> usize { (pos << 1) | 1 }

/// Signed distance from `expected` to `stamp`, tolerant of wrap-around.
#[inline(always)]
pub(crate) const fn distance(stamp: usize, expected: usize) -> isize {
    stamp.wrapping_sub(expected) as isize
}

/// One cache line per slot, so neighbouring positions do not false-share.
#[repr(C, align(64))]
pub(crate) struct Slot<T> {
    pub(crate) stamp: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    pub(crate) fn new(index: usize) -> Self {
        Slot {
            stamp: AtomicUsize::new(vacant(index)),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// # Safety
    ///
    /// The caller must have claimed this slot's position as a producer, and
    /// the slot must not hold a value.
    #[inline]
    pub(crate) unsafe fn write(&self, value: T) {
        self.value.with_mut(|ptr| unsafe {
            (*ptr).write(value);
        });
    }

    /// # Safety
    ///
    /// The caller must have claimed this slot's position as a consumer, and
    /// the slot must hold a value. The slot is logically empty afterwards.
    #[inline]
    pub(crate) unsafe fn take(&self) -> T {
        self.value.with(|ptr| unsafe { (*ptr).assume_init_read() })
    }

    /// # Safety
    ///
    /// The slot must hold a value and no other thread may access it.
    pub(crate) unsafe fn drop_value(&self) {
        self.value.with_mut(|ptr| unsafe { (*ptr).assume_init_drop() });
    }
}
