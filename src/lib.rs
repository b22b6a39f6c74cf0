//! crawl-middleware - concurrency backbone for a multi-stage crawler
//!
//! Manages pooled worker resources, routes typed work between pipeline stages
//! over bounded channels, and coordinates cooperative shutdown.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`middleware`] - Id allocation, entity pools, channel bus and stop signal
//! - [`models`] - Requests, responses, items and pipeline errors
//! - [`downloader`] - Page downloader capability and its HTTP implementation
//! - [`analyzer`] - Response analyzer capability and the generic analyzer
//! - [`config`] - Configuration management and settings
//! - [`logging`] - Tracing subscriber setup
//! - [`metrics`] - Prometheus gauges and counters
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use crawl_middleware::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!
//!     let bus = ChannelManager::new(config.middleware.channel_len);
//!     let stop = StopSign::new();
//!
//!     let requests = bus.request_channel()?;
//!     requests.send(Request::parse("https://example.com")?).await.ok();
//!
//!     stop.sign();
//!     bus.close();
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod config;
pub mod downloader;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod models;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analyzer::{Analyzer, AnalyzerPool, GenericAnalyzer, ParseResponse};
    pub use crate::config::Config;
    pub use crate::downloader::{DownloadError, DownloaderPool, HttpDownloader, PageDownloader};
    pub use crate::error::{Error, ErrorCategory, MiddlewareErrorTrait, Result};
    pub use crate::middleware::{
        BusError, Channel, ChannelManager, ChannelManagerStatus, Entity, IdGenerator, Pool,
        PoolError, SequentialIdGenerator, StopSign,
    };
    pub use crate::models::{CrawlerError, CrawlerErrorKind, Data, Item, Request, Response};
}

// Direct re-exports for convenience
pub use middleware::{ChannelManager, Pool, StopSign};
pub use models::{CrawlerError, Data, Item, Request, Response};
