//! Worker loops driving the middleware the way an orchestrator would
//!
//! Each loop polls the stop signal between units of work, acknowledges it
//! with its own code and exits. A closed and drained input channel also ends
//! the loop.

use std::sync::Arc;
use std::time::Duration;

use crawl_middleware::analyzer::{AnalyzerPool, ParseResponse};
use crawl_middleware::downloader::DownloaderPool;
use crawl_middleware::middleware::{ChannelManager, Entity, Pool, StopSign};
use crawl_middleware::models::{CrawlerError, Data};

/// How long a worker waits on an empty channel before re-checking the stop signal
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Take an entity, backing off while the pool is busy
pub async fn take_with_backoff<T: Entity>(pool: &Pool<T>) -> T {
    loop {
        match pool.take() {
            Ok(entity) => return entity,
            Err(e) => {
                assert!(e.is_busy(), "unexpected pool error: {e}");
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }
    }
}

/// Move requests to responses. Returns the number of requests handled.
pub async fn run_downloader(
    code: String,
    pool: Arc<DownloaderPool>,
    bus: Arc<ChannelManager>,
    stop: Arc<StopSign>,
) -> usize {
    let (Ok(requests), Ok(responses), Ok(errors)) =
        (bus.request_channel(), bus.response_channel(), bus.error_channel())
    else {
        return 0;
    };

    let mut handled = 0;
    loop {
        if stop.signaled() {
            stop.deal(&code);
            break;
        }

        let request = match tokio::time::timeout(POLL_INTERVAL, requests.recv()).await {
            Ok(Some(request)) => request,
            Ok(None) => break,
            Err(_) => continue,
        };

        let downloader = take_with_backoff(&pool).await;
        let outcome = downloader.download(&request).await;
        pool.give_back(downloader).ok();

        match outcome {
            Ok(response) => {
                if responses.send(response).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                let error = CrawlerError::downloader(format!("{}: {e}", request.url));
                if errors.send(error).await.is_err() {
                    break;
                }
            }
        }
        handled += 1;
    }
    handled
}

/// Move responses to requests, items and errors. Requests deeper than
/// `max_depth` are dropped. Returns the number of responses handled.
pub async fn run_analyzer(
    code: String,
    pool: Arc<AnalyzerPool>,
    parsers: Vec<ParseResponse>,
    max_depth: u32,
    bus: Arc<ChannelManager>,
    stop: Arc<StopSign>,
) -> usize {
    let (Ok(requests), Ok(responses), Ok(items), Ok(errors)) = (
        bus.request_channel(),
        bus.response_channel(),
        bus.item_channel(),
        bus.error_channel(),
    ) else {
        return 0;
    };

    let mut handled = 0;
    loop {
        if stop.signaled() {
            stop.deal(&code);
            break;
        }

        let response = match tokio::time::timeout(POLL_INTERVAL, responses.recv()).await {
            Ok(Some(response)) => response,
            Ok(None) => break,
            Err(_) => continue,
        };

        let analyzer = take_with_backoff(&pool).await;
        let (data, failures) = analyzer.analyze(&parsers, &response);
        pool.give_back(analyzer).ok();

        for entry in data {
            let sent = match entry {
                Data::Request(request) if request.depth > max_depth => Ok(()),
                Data::Request(request) => requests.send(request).await.map_err(|_| ()),
                Data::Item(item) => items.send(item).await.map_err(|_| ()),
            };
            if sent.is_err() {
                return handled;
            }
        }
        for failure in failures {
            if errors.send(failure).await.is_err() {
                return handled;
            }
        }
        handled += 1;
    }
    handled
}
