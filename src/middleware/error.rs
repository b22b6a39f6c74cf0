//! Error types for the middleware module

use thiserror::Error;

use super::manager::ChannelManagerStatus;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors raised by [`super::Pool`]
#[derive(Error, Debug)]
pub enum PoolError {
    /// Every entity is checked out
    #[error("Pool is busy: all {total} entities are in use")]
    Busy { total: u32 },

    /// The returned entity was never issued by this pool
    #[error("Entity {id} does not belong to this pool")]
    InvalidEntity { id: u32 },

    /// The returned entity is already idle in the pool
    #[error("Entity {id} has already been returned")]
    AlreadyReturned { id: u32 },

    /// A pool must hold at least one entity
    #[error("Pool capacity must be greater than 0")]
    InvalidCapacity,

    /// The factory handed out the same identity twice
    #[error("Factory produced duplicate entity id {id}")]
    DuplicateEntity { id: u32 },

    /// The factory failed to build an entity
    #[error("Failed to create entity: {0}")]
    Factory(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PoolError {
    /// Busy is transient: retrying after a return can succeed
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// Errors raised by [`super::ChannelManager`] accessors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Channels are only handed out while the manager is initialized
    #[error("Channel manager is not initialized (status: {status})")]
    NotInitialized { status: ChannelManagerStatus },
}
