//! Page downloaders and their pool
//!
//! The pipeline only depends on the [`PageDownloader`] capability. [`HttpDownloader`]
//! is a thin `reqwest` implementation; anything else with an identity and a
//! `download` method can be pooled the same way.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::middleware::{Entity, IdGenerator, Pool, PoolResult};
use crate::models::{Request, Response};

pub use http::HttpDownloader;

/// Errors that can occur while downloading a page
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// The request cannot be downloaded at all
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Fetches the content behind a [`Request`]
#[async_trait]
pub trait PageDownloader: Entity + Send + Sync {
    async fn download(&self, request: &Request) -> Result<Response, DownloadError>;
}

/// Pool of boxed downloaders
pub type DownloaderPool = Pool<Box<dyn PageDownloader>>;

/// Build a pool of `total` [`HttpDownloader`]s sharing one configuration
pub fn http_downloader_pool(
    total: u32,
    ids: &dyn IdGenerator,
    user_agent: &str,
    timeout: std::time::Duration,
) -> PoolResult<DownloaderPool> {
    Pool::try_new(total, ids, |id| {
        HttpDownloader::with_config(id, user_agent, timeout)
            .map(|downloader| Box::new(downloader) as Box<dyn PageDownloader>)
    })
}
