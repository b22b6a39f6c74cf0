//! Unified error handling for the crawl-middleware crate
//!
//! Domain-specific errors live next to the code that raises them. This module
//! gathers them into a single [`Error`] enum for callers that cross module
//! boundaries, while keeping the detailed variants reachable.
//!
//! - [`MiddlewareErrorTrait`] - common interface implemented by all error types
//! - [`ErrorCategory`] - classification used to pick a handling strategy
//! - [`Error`] - unified error enum
//!
//! # Usage
//!
//! ```rust,ignore
//! use crawl_middleware::error::{Error, MiddlewareErrorTrait};
//!
//! fn handle(err: Error) {
//!     if err.is_recoverable() {
//!         // back off and retry
//!     } else {
//!         eprintln!("fatal: {err}");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::downloader::DownloadError;
pub use crate::middleware::{BusError, PoolError, SendError, TryRecvError, TrySendError};
pub use crate::models::CrawlerError;

/// Common trait for all crate error types
pub trait MiddlewareErrorTrait: std::error::Error {
    /// Whether retrying the same operation later can succeed
    fn is_recoverable(&self) -> bool;

    /// Error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Resource pool checkout/return errors
    Pool,
    /// Channel manager lifecycle errors
    Bus,
    /// Network-related errors (HTTP, timeout)
    Network,
    /// Errors reported by pipeline stages over the error channel
    Pipeline,
    /// Configuration and validation errors
    Config,
    /// I/O errors
    Io,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pool => "pool",
            Self::Bus => "bus",
            Self::Network => "network",
            Self::Pipeline => "pipeline",
            Self::Config => "config",
            Self::Io => "io",
            Self::Other => "other",
        }
    }
}

impl MiddlewareErrorTrait for PoolError {
    fn is_recoverable(&self) -> bool {
        self.is_busy()
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Pool
    }
}

impl MiddlewareErrorTrait for BusError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Bus
    }
}

impl MiddlewareErrorTrait for DownloadError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout | Self::ServerError(_) => true,
            Self::InvalidRequest(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

/// Unified error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    /// Resource pool errors
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    /// Channel manager errors
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// Download errors
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// A bus channel no longer accepts or yields values
    #[error("Channel closed")]
    ChannelClosed,

    /// A non-suspending send found the channel at capacity
    #[error("Channel full")]
    ChannelFull,

    /// A non-suspending receive found nothing buffered
    #[error("Channel empty")]
    ChannelEmpty,

    /// Error reported by a pipeline stage
    #[error("Pipeline error: {0}")]
    Crawler(#[from] CrawlerError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MiddlewareErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Pool(e) => e.is_recoverable(),
            Self::Bus(e) => e.is_recoverable(),
            Self::Download(e) => e.is_recoverable(),
            Self::ChannelClosed => false,
            Self::ChannelFull | Self::ChannelEmpty => true,
            Self::Crawler(_) => false,
            Self::Io(_) => true, // I/O errors are often transient
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Pool(e) => e.category(),
            Self::Bus(e) => e.category(),
            Self::Download(e) => e.category(),
            Self::ChannelClosed | Self::ChannelFull | Self::ChannelEmpty => ErrorCategory::Bus,
            Self::Crawler(_) => ErrorCategory::Pipeline,
            Self::Io(_) => ErrorCategory::Io,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl<T> From<SendError<T>> for Error {
    fn from(_: SendError<T>) -> Self {
        Self::ChannelClosed
    }
}

impl<T> From<TrySendError<T>> for Error {
    fn from(err: TrySendError<T>) -> Self {
        match err {
            TrySendError::Full(_) => Self::ChannelFull,
            TrySendError::Closed(_) => Self::ChannelClosed,
        }
    }
}

impl From<TryRecvError> for Error {
    fn from(err: TryRecvError) -> Self {
        match err {
            TryRecvError::Empty => Self::ChannelEmpty,
            TryRecvError::Closed => Self::ChannelClosed,
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: format!("{err:#}"),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
