//! Bounded multi-producer, multi-consumer channel with explicit close
//!
//! Built on `tokio::sync::mpsc`. Every [`Channel`] clone shares one buffer;
//! receivers take turns on the single underlying receiver. Closing is
//! explicit and non-destructive: once [`Channel::close`] returns, sends fail,
//! while values already buffered stay receivable until drained.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};

/// Returned by [`Channel::send`] when the channel is closed. Carries the value back.
#[derive(Error, PartialEq, Eq)]
#[error("channel closed")]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SendError(..)")
    }
}

/// Returned by [`Channel::try_send`]
#[derive(Error, PartialEq, Eq)]
pub enum TrySendError<T> {
    #[error("channel full")]
    Full(T),

    #[error("channel closed")]
    Closed(T),
}

impl<T> TrySendError<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Closed(value) => value,
        }
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

/// Returned by [`Channel::try_recv`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// Nothing buffered right now, or another receiver holds the queue
    #[error("channel empty")]
    Empty,

    /// Closed and fully drained
    #[error("channel closed")]
    Closed,
}

struct Inner<T> {
    tx: mpsc::Sender<T>,
    rx: Mutex<mpsc::Receiver<T>>,
    /// Sends hold a read borrow while committing, close takes the write side
    closed: watch::Sender<bool>,
    capacity: usize,
}

/// Cloneable handle to a bounded channel
pub struct Channel<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Channel<T> {
    /// Create a channel buffering at most `capacity` values
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "channel capacity must be greater than 0");
        let (tx, rx) = mpsc::channel(capacity);
        let (closed, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                tx,
                rx: Mutex::new(rx),
                closed,
                capacity,
            }),
        }
    }

    /// Send a value, waiting while the buffer is full
    ///
    /// Fails with the value if the channel is or becomes closed before a slot frees up.
    pub async fn send(&self, value: T) -> Result<(), SendError<T>> {
        let permit = tokio::select! {
            biased;
            () = self.closed() => return Err(SendError(value)),
            permit = self.inner.tx.reserve() => match permit {
                Ok(permit) => permit,
                Err(_) => return Err(SendError(value)),
            },
        };

        let closed = self.inner.closed.borrow();
        if *closed {
            return Err(SendError(value));
        }
        permit.send(value);
        Ok(())
    }

    /// Send without waiting
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let closed = self.inner.closed.borrow();
        if *closed {
            return Err(TrySendError::Closed(value));
        }
        self.inner.tx.try_send(value).map_err(|e| match e {
            mpsc::error::TrySendError::Full(value) => TrySendError::Full(value),
            mpsc::error::TrySendError::Closed(value) => TrySendError::Closed(value),
        })
    }

    /// Receive the next value, waiting while the buffer is empty
    ///
    /// Returns `None` once the channel is closed and drained.
    pub async fn recv(&self) -> Option<T> {
        let mut rx = self.inner.rx.lock().await;
        tokio::select! {
            biased;
            value = rx.recv() => value,
            () = self.closed() => rx.try_recv().ok(),
        }
    }

    /// Receive without waiting
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let Ok(mut rx) = self.inner.rx.try_lock() else {
            return Err(TryRecvError::Empty);
        };
        match rx.try_recv() {
            Ok(value) => Ok(value),
            Err(_) if self.is_closed() => Err(TryRecvError::Closed),
            Err(_) => Err(TryRecvError::Empty),
        }
    }

    /// Close the channel. Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        self.inner.closed.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        })
    }

    pub fn is_closed(&self) -> bool {
        *self.inner.closed.borrow()
    }

    /// Resolves once the channel is closed
    pub async fn closed(&self) {
        let mut rx = self.inner.closed.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Number of buffered values, including slots reserved by in-flight sends
    pub fn len(&self) -> usize {
        self.inner.capacity - self.inner.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of buffered values
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Whether two handles refer to the same underlying channel
    pub fn same_channel(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish()
    }
}
