//! `reqwest`-backed page downloader

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{DownloadError, PageDownloader};
use crate::middleware::Entity;
use crate::models::{Request, Response};

/// Plain GET downloader
///
/// Non-2xx client responses are returned as-is so the analyzer can decide
/// what to do with them; 5xx responses become [`DownloadError::ServerError`].
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    id: u32,
    client: Client,
}

impl HttpDownloader {
    /// Wrap an existing client
    pub fn new(id: u32, client: Client) -> Self {
        Self { id, client }
    }

    /// Build a client with the given user agent and request timeout
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Http` if the HTTP client cannot be created
    pub fn with_config(id: u32, user_agent: &str, timeout: Duration) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self::new(id, client))
    }
}

impl Entity for HttpDownloader {
    fn id(&self) -> u32 {
        self.id
    }
}

#[async_trait]
impl PageDownloader for HttpDownloader {
    async fn download(&self, request: &Request) -> Result<Response, DownloadError> {
        if !request.is_valid() {
            return Err(DownloadError::InvalidRequest(request.url.to_string()));
        }

        tracing::debug!(
            downloader = self.id,
            url = %request.url,
            depth = request.depth,
            "Downloading"
        );

        let response = self
            .client
            .get(request.url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DownloadError::Timeout
                } else {
                    DownloadError::Http(e)
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(DownloadError::ServerError(status.as_u16()));
        }

        let url = response.url().clone();
        let body = response.bytes().await?;

        Ok(Response::new(url, status.as_u16(), body, request.depth))
    }
}
