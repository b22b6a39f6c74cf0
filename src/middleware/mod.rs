//! Concurrency coordination shared by every pipeline stage
//!
//! - [`id`] - identity allocation for pooled entities
//! - [`pool`] - fixed-capacity, non-blocking entity pool
//! - [`channel`] - bounded channel with non-destructive close
//! - [`manager`] - lifecycle owner of the request/response/item/error channels
//! - [`stop`] - cooperative stop signal with acknowledgment ledger

pub mod channel;
pub mod error;
pub mod id;
pub mod manager;
pub mod pool;
pub mod stop;

pub use channel::{Channel, SendError, TryRecvError, TrySendError};
pub use error::{BusError, PoolError, PoolResult};
pub use id::{IdGenerator, SequentialIdGenerator};
pub use manager::{BusSummary, ChannelManager, ChannelManagerStatus, ChannelUsage};
pub use pool::{Entity, Pool};
pub use stop::StopSign;
