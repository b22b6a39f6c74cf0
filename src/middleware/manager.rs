//! Channel manager: lifecycle owner of the four pipeline channels
//!
//! ```text
//!   Uninitialized ──init──▶ Initialized ──close──▶ Closed
//!                              ▲    │                 │
//!                              └────┘ init(reset)     │
//!                              ▲                      │
//!                              └──────── init ────────┘
//! ```
//!
//! Channels are only handed out while the manager is `Initialized`. Closing
//! stops further sends on the current channel set but leaves buffered values
//! receivable by whoever still holds a handle.

use serde::Serialize;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};

use super::channel::Channel;
use super::error::BusError;
use crate::models::{CrawlerError, Item, Request, Response};

/// Lifecycle state of a [`ChannelManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelManagerStatus {
    #[default]
    Uninitialized,
    Initialized,
    Closed,
}

impl ChannelManagerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ChannelManagerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four channels sharing one capacity
struct ChannelSet {
    request: Channel<Request>,
    response: Channel<Response>,
    item: Channel<Item>,
    error: Channel<CrawlerError>,
}

impl ChannelSet {
    fn new(channel_len: usize) -> Self {
        Self {
            request: Channel::bounded(channel_len),
            response: Channel::bounded(channel_len),
            item: Channel::bounded(channel_len),
            error: Channel::bounded(channel_len),
        }
    }

    fn close(&self) {
        self.request.close();
        self.response.close();
        self.item.close();
        self.error.close();
    }
}

#[derive(Default)]
struct ManagerState {
    status: ChannelManagerStatus,
    channel_len: usize,
    /// Last channel set. Kept after close so summaries still show backlog.
    channels: Option<ChannelSet>,
}

/// Buffered length and capacity of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelUsage {
    pub len: usize,
    pub capacity: usize,
}

impl ChannelUsage {
    fn of<T>(channel: &Channel<T>) -> Self {
        Self {
            len: channel.len(),
            capacity: channel.capacity(),
        }
    }

    /// Fraction of capacity in use (0.0 - 1.0)
    pub fn saturation(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.len as f64 / self.capacity as f64
    }
}

impl fmt::Display for ChannelUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.len, self.capacity)
    }
}

/// Point-in-time view of a [`ChannelManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusSummary {
    pub status: ChannelManagerStatus,
    pub channel_len: usize,
    pub request: ChannelUsage,
    pub response: ChannelUsage,
    pub item: ChannelUsage,
    pub error: ChannelUsage,
}

impl BusSummary {
    /// Channels paired with their names, in pipeline order
    pub fn channels(&self) -> [(&'static str, ChannelUsage); 4] {
        [
            ("request", self.request),
            ("response", self.response),
            ("item", self.item),
            ("error", self.error),
        ]
    }
}

impl fmt::Display for BusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status: {}, requestChannel: {}, responseChannel: {}, itemChannel: {}, errorChannel: {}",
            self.status, self.request, self.response, self.item, self.error
        )
    }
}

/// Owner of the request, response, item and error channels
#[derive(Default)]
pub struct ChannelManager {
    state: RwLock<ManagerState>,
}

impl ChannelManager {
    /// Create a manager and initialize it with `channel_len`
    ///
    /// # Panics
    ///
    /// Panics if `channel_len` is 0.
    pub fn new(channel_len: usize) -> Self {
        let manager = Self::default();
        manager.init(channel_len, true);
        manager
    }

    /// (Re)build the channel set
    ///
    /// Returns `false` without touching anything when already initialized
    /// and `reset` is not set. A reset of a live manager closes the previous
    /// set first; stale handles can still drain it.
    ///
    /// # Panics
    ///
    /// Panics if `channel_len` is 0.
    pub fn init(&self, channel_len: usize, reset: bool) -> bool {
        assert!(channel_len > 0, "channel length must be greater than 0");

        let mut state = self.write();
        if state.status == ChannelManagerStatus::Initialized {
            if !reset {
                return false;
            }
            if let Some(previous) = state.channels.take() {
                previous.close();
                tracing::warn!(
                    previous_len = state.channel_len,
                    channel_len,
                    "Resetting live channel manager; previous channels closed"
                );
            }
        }

        state.channels = Some(ChannelSet::new(channel_len));
        state.channel_len = channel_len;
        state.status = ChannelManagerStatus::Initialized;

        tracing::info!(channel_len, "Channel manager initialized");
        true
    }

    /// Close all four channels. Returns `false` unless the manager was initialized.
    pub fn close(&self) -> bool {
        let mut state = self.write();
        if state.status != ChannelManagerStatus::Initialized {
            return false;
        }

        if let Some(channels) = &state.channels {
            channels.close();
        }
        state.status = ChannelManagerStatus::Closed;

        tracing::info!("Channel manager closed");
        true
    }

    pub fn status(&self) -> ChannelManagerStatus {
        self.read().status
    }

    /// Capacity of each channel in the current set (0 before the first init)
    pub fn channel_len(&self) -> usize {
        self.read().channel_len
    }

    pub fn request_channel(&self) -> Result<Channel<Request>, BusError> {
        self.channel(|set| &set.request)
    }

    pub fn response_channel(&self) -> Result<Channel<Response>, BusError> {
        self.channel(|set| &set.response)
    }

    pub fn item_channel(&self) -> Result<Channel<Item>, BusError> {
        self.channel(|set| &set.item)
    }

    pub fn error_channel(&self) -> Result<Channel<CrawlerError>, BusError> {
        self.channel(|set| &set.error)
    }

    /// Status plus length/capacity of every channel
    pub fn snapshot(&self) -> BusSummary {
        let state = self.read();
        let usage = |pick: fn(&ChannelSet) -> ChannelUsage| {
            state.channels.as_ref().map(pick).unwrap_or_default()
        };

        BusSummary {
            status: state.status,
            channel_len: state.channel_len,
            request: usage(|set| ChannelUsage::of(&set.request)),
            response: usage(|set| ChannelUsage::of(&set.response)),
            item: usage(|set| ChannelUsage::of(&set.item)),
            error: usage(|set| ChannelUsage::of(&set.error)),
        }
    }

    /// Human-readable [`ChannelManager::snapshot`]
    pub fn summary(&self) -> String {
        self.snapshot().to_string()
    }

    fn channel<T>(
        &self,
        pick: impl FnOnce(&ChannelSet) -> &Channel<T>,
    ) -> Result<Channel<T>, BusError> {
        let state = self.read();
        match (&state.status, &state.channels) {
            (ChannelManagerStatus::Initialized, Some(set)) => Ok(pick(set).clone()),
            (status, _) => Err(BusError::NotInitialized { status: *status }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ManagerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ManagerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ChannelManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChannelManager").field(&self.snapshot()).finish()
    }
}
