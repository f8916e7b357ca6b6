//! lfqueue - Bounded lock-free MPMC queue with per-slot sequence stamps
//!
//! Any number of threads may push and pop concurrently. Both operations are
//! non-blocking: a full queue hands the value back, an empty queue yields
//! `None`. All storage is allocated up front.
//!
//! ```
//! use lfqueue::Queue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(Queue::new(64));
//! let producer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || {
//!         for i in 0..100u32 {
//!             while queue.push(i).is_err() {
//!                 std::hint::spin_loop();
//!             }
//!         }
//!     })
//! };
//!
//! let mut received = 0;
//! while received < 100 {
//!     if queue.pop().is_some() {
//!         received += 1;
//!     }
//! }
//! producer.join().unwrap();
//! ```
#![warn(missing_docs)]

mod error;
mod queue;
mod slot;
mod sync;

pub use error::{CapacityError, PushError, MAX_CAPACITY};
pub use queue::Queue;
