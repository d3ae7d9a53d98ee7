use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{CapacityError, RecvError, SendError, TryRecvError, TrySendError};

/// Ring state. `head`, `tail` and `count` only ever change together, under the lock.
struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    // `head == tail` is both empty and full, `count` tells them apart
    count: usize,
    closed: bool,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Self {
        Ring {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            tail: 0,
            count: 0,
            closed: false,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    fn next(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }

    /// Caller checks the ring is not full.
    fn enqueue(&mut self, item: T) {
        debug_assert!(!self.is_full(), "enqueue on a full ring");
        debug_assert!(self.slots[self.tail].is_none(), "tail slot still holds a live item");

        self.slots[self.tail] = Some(item);
        self.tail = self.next(self.tail);
        self.count += 1;
    }

    fn dequeue(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = self.slots[self.head].take();
        debug_assert!(item.is_some(), "head slot of a non-empty ring is vacant");

        self.head = self.next(self.head);
        self.count -= 1;
        item
    }
}

/// Fixed-capacity FIFO queue guarded by a single mutex.
///
/// `push` waits for a free slot and `pop` waits for an item, both sleeping on
/// a condition variable instead of spinning. Every operation, queries
/// included, is serialized on the same lock.
///
/// There is no shutdown in the baseline `push`/`pop` contract: if one side
/// stops for good while the other waits, the waiting side never wakes up.
/// Callers that need to end a session use [`close`](Self::close) together
/// with [`send`](Self::send) and [`recv`](Self::recv).
pub struct BoundedBlockingQueue<T> {
    ring: Mutex<Ring<T>>,
    capacity: usize,
    /// Signaled when a slot frees up.
    not_full: Condvar,
    /// Signaled when an item is stored.
    not_empty: Condvar,
}

impl<T> BoundedBlockingQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    /// Fails when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError);
        }

        debug!(capacity, "creating bounded blocking queue");

        Ok(Self {
            ring: Mutex::new(Ring::with_capacity(capacity)),
            capacity,
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    // Ring updates never leave the state half-written, so a panic on
    // another thread does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes an item, waiting for a free slot if the queue is full.
    ///
    /// # Panics
    ///
    /// Panics if the queue has been closed.
    pub fn push(&self, item: T) {
        if self.send(item).is_err() {
            panic!("push on a closed queue");
        }
    }

    /// Pops the oldest item, waiting for one if the queue is empty.
    ///
    /// # Panics
    ///
    /// Panics if the queue has been closed and is empty.
    pub fn pop(&self) -> T {
        match self.recv() {
            Ok(item) => item,
            Err(RecvError) => panic!("pop on a closed and empty queue"),
        }
    }

    /// Like [`push`](Self::push), but gives the item back once the queue is closed,
    /// including while waiting for a free slot.
    pub fn send(&self, item: T) -> Result<(), SendError<T>> {
        let mut ring = self
            .not_full
            .wait_while(self.lock(), |ring| ring.is_full() && !ring.closed)
            .unwrap_or_else(PoisonError::into_inner);

        if ring.closed {
            return Err(SendError(item));
        }

        ring.enqueue(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Like [`pop`](Self::pop), but fails once the queue is closed and drained.
    /// Items stored before `close` are still delivered.
    pub fn recv(&self) -> Result<T, RecvError> {
        let mut ring = self
            .not_empty
            .wait_while(self.lock(), |ring| ring.is_empty() && !ring.closed)
            .unwrap_or_else(PoisonError::into_inner);

        // Still empty here means closed.
        let item = ring.dequeue().ok_or(RecvError)?;
        self.not_full.notify_one();
        Ok(item)
    }

    /// Pushes without waiting.
    pub fn try_push(&self, item: T) -> Result<(), TrySendError<T>> {
        let mut ring = self.lock();

        if ring.closed {
            return Err(TrySendError::Closed(item));
        }
        if ring.is_full() {
            return Err(TrySendError::Full(item));
        }

        ring.enqueue(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Pops without waiting.
    pub fn try_pop(&self) -> Result<T, TryRecvError> {
        let mut ring = self.lock();

        match ring.dequeue() {
            Some(item) => {
                self.not_full.notify_one();
                Ok(item)
            }
            None if ring.closed => Err(TryRecvError::Closed),
            None => Err(TryRecvError::Empty),
        }
    }

    /// Closes the queue and wakes every waiting thread.
    ///
    /// Pending `send`s get their item back, `recv` keeps draining what is
    /// stored and then fails. Closing twice is a no-op.
    pub fn close(&self) {
        let mut ring = self.lock();
        if ring.closed {
            return;
        }
        ring.closed = true;
        debug!(remaining = ring.count, "closing bounded blocking queue");
        drop(ring);

        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Checks if the queue is empty. The answer may be stale as soon as it is returned.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Checks if the queue is full. The answer may be stale as soon as it is returned.
    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }

    /// Returns the current number of items. The answer may be stale as soon as it is returned.
    pub fn size(&self) -> usize {
        self.lock().count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for BoundedBlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.lock();
        f.debug_struct("BoundedBlockingQueue")
            .field("capacity", &self.capacity)
            .field("head", &ring.head)
            .field("tail", &ring.tail)
            .field("count", &ring.count)
            .field("closed", &ring.closed)
            .finish()
    }
}
