// Payload types carried between pipeline stages

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use url::Url;

/// A unit of crawl work: a URL and the recursion depth it was discovered at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Url,
    pub depth: u32,
}

impl Request {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }

    /// Parse a URL string into a depth-0 request
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?, 0))
    }

    /// Only absolute http(s) URLs with a host can be downloaded
    pub fn is_valid(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https") && self.url.host_str().is_some()
    }
}

/// Raw fetched content, tagged with the depth of the request that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: Url,
    pub status: u16,
    pub body: Bytes,
    pub depth: u32,
}

impl Response {
    pub fn new(url: Url, status: u16, body: impl Into<Bytes>, depth: u32) -> Self {
        Self {
            url,
            status,
            body: body.into(),
            depth,
        }
    }

    pub fn is_valid(&self) -> bool {
        (100..=599).contains(&self.status)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Finished output of the pipeline. Opaque key/value record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An item without any fields carries nothing worth emitting
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Item {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Output of an analyzer: either more work or a finished item
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Request(Request),
    Item(Item),
}

impl Data {
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Request(request) => request.is_valid(),
            Self::Item(item) => item.is_valid(),
        }
    }
}

impl From<Request> for Data {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}

impl From<Item> for Data {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}

/// Pipeline stage an error-channel entry originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlerErrorKind {
    Downloader,
    Analyzer,
    ItemProcessor,
}

impl CrawlerErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Downloader => "downloader",
            Self::Analyzer => "analyzer",
            Self::ItemProcessor => "item processor",
        }
    }
}

impl fmt::Display for CrawlerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error value sent over the error channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct CrawlerError {
    kind: CrawlerErrorKind,
    message: String,
}

impl CrawlerError {
    pub fn new(kind: CrawlerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn downloader(message: impl Into<String>) -> Self {
        Self::new(CrawlerErrorKind::Downloader, message)
    }

    pub fn analyzer(message: impl Into<String>) -> Self {
        Self::new(CrawlerErrorKind::Analyzer, message)
    }

    pub fn item_processor(message: impl Into<String>) -> Self {
        Self::new(CrawlerErrorKind::ItemProcessor, message)
    }

    pub fn kind(&self) -> CrawlerErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
