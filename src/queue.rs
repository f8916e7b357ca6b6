//! The bounded multi-producer multi-consumer queue.

use core::{fmt, mem};

use crossbeam_utils::{Backoff, CachePadded};
use tracing::{debug, warn};

use crate::error::{CapacityError, PushError, MAX_CAPACITY};
use crate::slot::{distance, occupied, vacant, Slot};
use crate::sync::{AtomicUsize, Ordering};

/// Bounded lock-free MPMC queue.
///
/// Producers claim a position by CAS on `tail` once the slot at that position
/// is stamped vacant for it; consumers do the same on `head` once the slot is
/// stamped occupied. The release store of the stamp that follows every write
/// (resp. read) is what hands the slot over to the other side.
///
/// Share it between threads by wrapping it in an `Arc`.
pub struct Queue<T> {
    /// Next position to pop (`dequeue_pos`).
    head: CachePadded<AtomicUsize>,
    /// Next position to push (`enqueue_pos`).
    tail: CachePadded<AtomicUsize>,
    buffer: Box<[Slot<T>]>,
    capacity: usize,
}

unsafe impl<T: Send> Send for Queue<T> {}
unsafe impl<T: Send> Sync for Queue<T> {}

impl<T> Queue<T> {
    /// Creates a queue holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or too large, see [`try_new`](Self::try_new).
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(queue) => queue,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a queue holding at most `capacity` elements, reporting an
    /// invalid capacity instead of panicking.
    ///
    /// The capacity must be at most [`MAX_CAPACITY`], and the slot array for it
    /// must fit in `isize::MAX` bytes. A capacity within those limits that the
    /// allocator still cannot satisfy aborts like any other failed allocation.
    ///
    /// All slots are allocated here; the queue never allocates afterwards.
    pub fn try_new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            warn!("rejected zero-capacity queue");
            return Err(CapacityError::Zero);
        }
        let max = Self::max_capacity();
        if capacity > max {
            warn!(capacity, max, "rejected oversized queue");
            return Err(CapacityError::TooLarge { requested: capacity, max });
        }

        let buffer: Box<[Slot<T>]> = (0..capacity).map(Slot::new).collect();
        debug!(capacity, "allocated queue");

        Ok(Queue {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            buffer,
            capacity,
        })
    }

    /// Largest capacity whose slot array fits in one allocation.
    fn max_capacity() -> usize {
        // slots are cache-line aligned, so never zero-sized
        MAX_CAPACITY.min(isize::MAX as usize / mem::size_of::<Slot<T>>())
    }

    #[inline(always)]
    fn slot(&self, pos: usize) -> &Slot<T> { &self.buffer[pos % self.capacity] }

    /// Attempts to push `value`, never blocking.
    ///
    /// Returns `Err(PushError(value))` if every slot is still held by an
    /// element that has not been popped yet.
    pub fn push(&self, value: T) -> Result<(), PushError<T>> {
        let backoff = Backoff::new();
        let mut tail = self.tail.load(Ordering::Relaxed);

        loop {
            let slot = self.slot(tail);
            let stamp = slot.stamp.load(Ordering::Acquire);
            let diff = distance(stamp, vacant(tail));

            if diff == 0 {
                match self.tail.compare_exchange_weak(
                    tail,
                    tail.wrapping_add(1),
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: winning the CAS on a vacant slot grants
                        // exclusive access until the stamp below is published.
                        unsafe { slot.write(value) };
                        slot.stamp.store(occupied(tail), Ordering::Release);
                        return Ok(());
                    }
                    Err(current) => {
                        tail = current;
                        backoff.spin();
                    }
                }
            } else if diff < 0 {
                // Still holds the element from the previous lap.
                return Err(PushError(value));
            } else {
                backoff.spin();
                tail = self.tail.load(Ordering::Relaxed);
            }
        }
    }

    /// Attempts to pop the oldest element, never blocking.
    ///
    /// Returns `None` if no element is ready at the head position.
    pub fn pop(&self) -> Option<T> {
        let backoff = Backoff::new();
        let mut head = self.head.load(Ordering::Relaxed);

        loop {
            let slot = self.slot(head);
            let stamp = slot.stamp.load(Ordering::Acquire);
            let diff = distance(stamp, occupied(head));

            if diff == 0 {
                match self.head.compare_exchange_weak(
                    head,
                    head.wrapping_add(1),
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: winning the CAS on an occupied slot grants
                        // exclusive access until the stamp below is published.
                        let value = unsafe { slot.take() };
                        slot.stamp.store(vacant(head.wrapping_add(self.capacity)), Ordering::Release);
                        return Some(value);
                    }
                    Err(current) => {
                        head = current;
                        backoff.spin();
                    }
                }
            } else if diff < 0 {
                return None;
            } else {
                backoff.spin();
                head = self.head.load(Ordering::Relaxed);
            }
        }
    }

    /// Maximum number of elements the queue holds.
    pub fn capacity(&self) -> usize { self.capacity }

    /// Number of elements currently in the queue.
    ///
    /// Only a snapshot: concurrent pushes and pops may change it immediately.
    pub fn len(&self) -> usize {
        let backoff = Backoff::new();
        loop {
            let tail = self.tail.load(Ordering::SeqCst);
            let head = self.head.load(Ordering::SeqCst);

            // Retry until head was read while tail stood still.
            if self.tail.load(Ordering::SeqCst) == tail {
                return tail.wrapping_sub(head).min(self.capacity);
            }
            backoff.spin();
        }
    }

    /// Returns `true` if the queue holds no element.
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Returns `true` if the queue holds `capacity` elements.
    pub fn is_full(&self) -> bool { self.len() == self.capacity }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        let remaining = tail.wrapping_sub(head);
        if remaining > 0 {
            debug!(remaining, "dropping undelivered elements");
        }

        let mut pos = head;
        while pos != tail {
            // SAFETY: `&mut self` rules out in-flight operations, so every
            // position in `head..tail` holds a published value.
            unsafe { self.slot(pos).drop_value() };
            pos = pos.wrapping_add(1);
        }
    }
}
