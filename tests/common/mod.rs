//! Common test utilities

use std::sync::Arc;

use crawl_middleware::analyzer::ParseResponse;
use crawl_middleware::config::LoggingConfig;
use crawl_middleware::middleware::Entity;
use crawl_middleware::models::{CrawlerError, Data, Item, Request, Response};

/// Minimal pooled entity
#[derive(Debug, PartialEq, Eq)]
pub struct Worker {
    pub id: u32,
}

impl Entity for Worker {
    fn id(&self) -> u32 {
        self.id
    }
}

/// Install a quiet subscriber so `RUST_LOG=debug cargo test` shows middleware logs
#[allow(dead_code)]
pub fn init_test_tracing() {
    let config = LoggingConfig {
        level: String::from("warn"),
        format: String::from("text"),
    };
    let _ = crawl_middleware::logging::init_tracing(&config);
}

/// Extract every `href="..."` target as a new request
#[allow(dead_code)]
pub fn href_parser() -> ParseResponse {
    Arc::new(|response: &Response| {
        let body = response.text();
        let mut data = Vec::new();
        let mut errors = Vec::new();

        for chunk in body.split("href=\"").skip(1) {
            let Some(end) = chunk.find('"') else {
                continue;
            };
            match response.url.join(&chunk[..end]) {
                Ok(url) => data.push(Data::Request(Request::new(url, 0))),
                Err(e) => errors.push(CrawlerError::analyzer(format!("bad link: {e}"))),
            }
        }

        (data, errors)
    })
}

/// Emit one item holding the page `<title>`, or an error when there is none
#[allow(dead_code)]
pub fn title_parser() -> ParseResponse {
    Arc::new(|response: &Response| {
        let body = response.text();
        let title = body
            .split_once("<title>")
            .and_then(|(_, rest)| rest.split_once("</title>"))
            .map(|(title, _)| title.trim().to_string());

        match title {
            Some(title) => (
                vec![Data::Item(
                    Item::new()
                        .with("url", response.url.as_str())
                        .with("title", title)
                        .with("depth", response.depth),
                )],
                Vec::new(),
            ),
            None => (
                Vec::new(),
                vec![CrawlerError::analyzer(format!("no title at {}", response.url))],
            ),
        }
    })
}
