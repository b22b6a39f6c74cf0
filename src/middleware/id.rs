//! Identity allocation for pooled entities

use std::sync::atomic::{AtomicU32, Ordering};

/// Source of numeric entity identities
pub trait IdGenerator: Send + Sync {
    /// Issue the next identity
    fn next_id(&self) -> u32;
}

/// Lock-free sequential allocator.
///
/// Issues `0, 1, 2, ...`. After `u32::MAX` the sequence wraps back to `0`,
/// so identities are only unique within one non-wrapped epoch. Pools hold
/// a small, bounded number of entities and never get near the boundary.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU32,
}

impl SequentialIdGenerator {
    /// First identity issued by a fresh generator
    pub const ORIGIN: u32 = 0;

    pub fn new() -> Self {
        Self::starting_at(Self::ORIGIN)
    }

    /// Start the sequence at an arbitrary value
    pub fn starting_at(start: u32) -> Self {
        Self {
            next: AtomicU32::new(start),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> u32 {
        // fetch_add wraps on overflow
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
