use std::error::Error;
use std::fmt;

/// Returned by [`BoundedBlockingQueue::new`](crate::BoundedBlockingQueue::new)
/// when asked for a queue without any slot.
///
/// A zero-capacity queue could never satisfy either wait condition, every
/// `push` and every `pop` would block forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError;

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ring buffer capacity must be greater than zero")
    }
}

impl Error for CapacityError {}

/// The queue was closed, the rejected item is handed back.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    /// Gets back the item that could not be sent.
    pub fn into_inner(self) -> T {
        self.0
    }
}

// No `T: Debug` bound so the error stays usable with any payload.
impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SendError { .. }")
    }
}

impl<T> fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sending on a closed queue")
    }
}

impl<T> Error for SendError<T> {}

/// The queue was closed and every stored item has already been received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecvError;

impl fmt::Display for RecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "receiving on a closed and empty queue")
    }
}

impl Error for RecvError {}

/// Why [`try_push`](crate::BoundedBlockingQueue::try_push) gave the item back.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TrySendError<T> {
    /// Every slot is occupied.
    Full(T),
    /// The queue was closed.
    Closed(T),
}

impl<T> TrySendError<T> {
    /// Gets back the item that could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(item) | TrySendError::Closed(item) => item,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, TrySendError::Full(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, TrySendError::Closed(_))
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("Full(..)"),
            TrySendError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => write!(f, "sending on a full queue"),
            TrySendError::Closed(_) => write!(f, "sending on a closed queue"),
        }
    }
}

impl<T> Error for TrySendError<T> {}

/// Why [`try_pop`](crate::BoundedBlockingQueue::try_pop) returned nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// No item is stored right now.
    Empty,
    /// The queue was closed and fully drained.
    Closed,
}

impl fmt::Display for TryRecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryRecvError::Empty => write!(f, "receiving on an empty queue"),
            TryRecvError::Closed => write!(f, "receiving on a closed and empty queue"),
        }
    }
}

impl Error for TryRecvError {}
