//! Cooperative shutdown tests
//!
//! Raising the stop signal must never lose buffered work, closing the bus
//! must wake blocked workers, and the acknowledgment ledger must account for
//! every participant.

use std::sync::Arc;
use std::time::Duration;

use crawl_middleware::analyzer::generic_analyzer_pool;
use crawl_middleware::downloader::http_downloader_pool;
use crawl_middleware::middleware::{ChannelManager, SequentialIdGenerator, StopSign};
use crawl_middleware::models::Request;

use super::workers::{run_analyzer, run_downloader};
use crate::common::title_parser;

fn request(n: u32) -> Request {
    Request::parse(&format!("https://example.com/{n}")).unwrap()
}

#[tokio::test]
async fn test_stop_signal_keeps_buffered_requests() {
    let bus = Arc::new(ChannelManager::new(8));
    let stop = Arc::new(StopSign::new());
    let requests = bus.request_channel().unwrap();

    for n in 0..5 {
        requests.send(request(n)).await.unwrap();
    }

    // Signal before any worker runs: workers acknowledge without consuming
    assert!(stop.sign());

    let ids = SequentialIdGenerator::new();
    let pool = Arc::new(http_downloader_pool(1, &ids, "crawl-test", Duration::from_secs(1)).unwrap());
    let handled = run_downloader(String::from("d0"), pool, Arc::clone(&bus), Arc::clone(&stop)).await;

    assert_eq!(handled, 0);
    assert_eq!(stop.deal_count("d0"), 1);
    assert_eq!(requests.len(), 5);

    // Close, then drain everything that was buffered
    assert!(bus.close());
    let mut drained = Vec::new();
    while let Some(request) = requests.recv().await {
        drained.push(request.url.path().to_string());
    }
    assert_eq!(drained, ["/0", "/1", "/2", "/3", "/4"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_close_wakes_idle_workers() {
    let bus = Arc::new(ChannelManager::new(4));
    let stop = Arc::new(StopSign::new());
    let ids = SequentialIdGenerator::new();
    let pool = Arc::new(generic_analyzer_pool(1, &ids).unwrap());

    let worker = tokio::spawn(run_analyzer(
        String::from("a0"),
        pool,
        vec![title_parser()],
        1,
        Arc::clone(&bus),
        Arc::clone(&stop),
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(bus.close());

    let handled = tokio::time::timeout(Duration::from_secs(2), worker)
        .await
        .expect("worker did not observe the close")
        .unwrap();
    assert_eq!(handled, 0);
    // Exited on close, not on the signal
    assert_eq!(stop.deal_total(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_participant_acknowledges_once() {
    const WORKERS: u32 = 16;
    let stop = Arc::new(StopSign::new());

    let tasks: Vec<_> = (0..WORKERS)
        .map(|n| {
            let stop = Arc::clone(&stop);
            tokio::spawn(async move {
                while !stop.signaled() {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                stop.deal(&format!("worker-{n}"));
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(stop.sign());
    assert!(!stop.sign());

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(stop.deal_total(), WORKERS);
    for n in 0..WORKERS {
        assert_eq!(stop.deal_count(&format!("worker-{n}")), 1);
    }
}

#[tokio::test]
async fn test_reset_starts_a_fresh_round() {
    let stop = StopSign::new();

    stop.deal("early");
    assert_eq!(stop.deal_total(), 0);

    assert!(stop.sign());
    stop.deal("a");
    stop.deal("a");
    stop.deal("b");
    assert_eq!(stop.deal_count("a"), 2);
    assert_eq!(stop.summary(), "signaled: true, deal_count: {\"a\": 2, \"b\": 1}");

    stop.reset();
    assert!(!stop.signaled());
    assert_eq!(stop.deal_total(), 0);
    assert_eq!(stop.summary(), "signaled: false");

    assert!(stop.sign());
    stop.deal("b");
    assert_eq!(stop.deal_count("a"), 0);
    assert_eq!(stop.deal_count("b"), 1);
}

#[tokio::test]
async fn test_reset_of_live_bus_closes_stale_handles() {
    let bus = ChannelManager::new(4);
    let stale = bus.request_channel().unwrap();
    stale.send(request(1)).await.unwrap();

    assert!(bus.init(2, true));
    assert_eq!(bus.channel_len(), 2);

    let fresh = bus.request_channel().unwrap();
    assert!(!fresh.same_channel(&stale));
    assert!(fresh.is_empty());

    // The stale set is closed but still drainable
    assert!(stale.is_closed());
    assert!(stale.send(request(2)).await.is_err());
    assert_eq!(stale.recv().await.map(|r| r.url.path().to_string()), Some(String::from("/1")));
    assert!(stale.recv().await.is_none());
}
