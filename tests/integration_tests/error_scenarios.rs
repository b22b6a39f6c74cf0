//! Error scenario integration tests
//!
//! Tests various failure modes and error handling:
//! 1. Bus accessors outside the initialized state
//! 2. Re-initialization without reset
//! 3. Zero channel length
//! 4. Pool exhaustion and bad returns surfacing through the unified error
//! 5. Channel errors surfacing through the unified error

use std::time::Duration;

use crawl_middleware::error::{Error, ErrorCategory, MiddlewareErrorTrait};
use crawl_middleware::middleware::{
    BusError, ChannelManager, ChannelManagerStatus, Pool, PoolError, SequentialIdGenerator,
};
use crawl_middleware::models::{Item, Request};

use crate::common::Worker;

// ============================================================================
// Channel Manager Lifecycle Errors
// ============================================================================

#[test]
fn test_accessors_before_init() {
    let bus = ChannelManager::default();
    assert_eq!(bus.status(), ChannelManagerStatus::Uninitialized);

    let err = bus.request_channel().unwrap_err();
    assert_eq!(
        err,
        BusError::NotInitialized {
            status: ChannelManagerStatus::Uninitialized
        }
    );
    assert!(bus.error_channel().is_err());
    assert!(!bus.close());
}

#[test]
fn test_accessors_after_close() {
    let bus = ChannelManager::new(4);
    assert!(bus.close());
    assert!(!bus.close());

    for err in [
        bus.request_channel().err(),
        bus.response_channel().err(),
        bus.item_channel().err(),
        bus.error_channel().err(),
    ]
    .map(|e| e.map(|e| e.to_string()))
    {
        assert_eq!(
            err.as_deref(),
            Some("Channel manager is not initialized (status: closed)")
        );
    }

    // A fresh init after close hands out new channels
    assert!(bus.init(4, false));
    assert!(bus.request_channel().is_ok());
}

#[test]
fn test_init_without_reset_keeps_capacity() {
    let bus = ChannelManager::default();
    assert!(bus.init(8, true));
    assert!(!bus.init(4, false));
    assert_eq!(bus.channel_len(), 8);
    assert_eq!(bus.request_channel().unwrap().capacity(), 8);
    assert_eq!(
        bus.summary(),
        "status: initialized, requestChannel: 0/8, responseChannel: 0/8, itemChannel: 0/8, errorChannel: 0/8"
    );
}

#[test]
#[should_panic(expected = "channel length must be greater than 0")]
fn test_zero_channel_len_panics() {
    let bus = ChannelManager::default();
    bus.init(0, true);
}

// ============================================================================
// Unified Error Propagation
// ============================================================================

fn enqueue(bus: &ChannelManager, url: &str) -> crawl_middleware::error::Result<()> {
    let requests = bus.request_channel()?;
    let request = Request::parse(url).map_err(|e| Error::with_source("bad seed", e))?;
    requests.try_send(request)?;
    Ok(())
}

#[test]
fn test_bus_errors_propagate_with_question_mark() {
    let bus = ChannelManager::new(1);
    enqueue(&bus, "https://example.com/1").unwrap();

    let err = enqueue(&bus, "https://example.com/2").unwrap_err();
    assert!(matches!(err, Error::ChannelFull));
    assert!(err.is_recoverable());

    bus.close();
    let err = enqueue(&bus, "https://example.com/3").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Bus);
    assert!(!err.is_recoverable());

    let err = enqueue(&ChannelManager::new(1), "not a url").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Other);
}

#[test]
fn test_pool_errors_through_unified_error() {
    let ids = SequentialIdGenerator::new();
    let pool = Pool::new(1, &ids, |id| Worker { id }).unwrap();

    let held = pool.take().unwrap();
    let err: Error = pool.take().unwrap_err().into();
    assert_eq!(err.category(), ErrorCategory::Pool);
    assert!(err.is_recoverable());

    pool.give_back(held).unwrap();
    let err: Error = pool.give_back(Worker { id: 0 }).unwrap_err().into();
    assert!(!err.is_recoverable());
    assert!(err.to_string().contains("already been returned"));
}

#[test]
fn test_invalid_pool_construction() {
    let ids = SequentialIdGenerator::new();
    let err = Pool::new(0, &ids, |id| Worker { id }).unwrap_err();
    assert!(matches!(err, PoolError::InvalidCapacity));

    let err = Pool::new(2, &ids, |_| Worker { id: 7 }).unwrap_err();
    assert!(matches!(err, PoolError::DuplicateEntity { id: 7 }));
}

#[tokio::test]
async fn test_closed_item_channel_rejects_send() {
    let bus = ChannelManager::new(2);
    let items = bus.item_channel().unwrap();
    bus.close();

    let err = items.send(Item::new().with("k", "v")).await.unwrap_err();
    assert_eq!(err.into_inner().get("k").and_then(|v| v.as_str()), Some("v"));

    let result = tokio::time::timeout(Duration::from_millis(100), items.recv()).await;
    assert_eq!(result.unwrap(), None);
}
