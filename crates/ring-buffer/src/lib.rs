//! Naive bounded blocking ring buffer.
//!
//! One mutex guards the whole ring (storage, head, tail and item count) and
//! two condition variables park producers while the ring is full and
//! consumers while it is empty. This is the lock-based baseline: every
//! operation is serialized, nothing spins.
//!
//! ```
//! use ring_buffer::BoundedBlockingQueue;
//!
//! let queue = BoundedBlockingQueue::new(4).unwrap();
//! queue.push(1);
//! queue.push(2);
//! assert_eq!(queue.pop(), 1);
//! assert_eq!(queue.size(), 1);
//! ```

pub mod error;
pub mod queue;

pub use error::{CapacityError, RecvError, SendError, TryRecvError, TrySendError};
pub use queue::BoundedBlockingQueue;
