//! Error types returned by the queue.

use core::fmt;

use thiserror::Error;

/// Largest capacity a [`Queue`](crate::Queue) accepts.
///
/// Stamps store positions shifted left by one bit and are compared through a
/// signed distance, so a lap of the ring must stay well inside `isize`.
pub const MAX_CAPACITY: usize = usize::MAX >> 2;

/// A queue could not be built with the requested capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// The capacity was zero.
    #[error("queue capacity must be greater than zero")]
    Zero,
    /// The capacity exceeds [`MAX_CAPACITY`], or its slot array would not
    /// fit in `isize::MAX` bytes.
    #[error("queue capacity {requested} exceeds the maximum of {max}")]
    TooLarge {
        /// Capacity that was asked for.
        requested: usize,
        /// Largest accepted capacity for this element type.
        max: usize,
    },
}

/// The queue was full; the rejected value is handed back.
#[derive(Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is full")]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
    /// Recovers the value that could not be pushed.
    pub fn into_inner(self) -> T { self.0 }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("PushError(..)") }
}
