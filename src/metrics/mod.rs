//! Prometheus metrics for pools, the channel bus and the stop signal
//!
//! This module provides metrics tracking for:
//! - Pools: used and total entities per pool
//! - Channel bus: status and buffered length/capacity per channel
//! - Stop signal: acknowledgments per participant code
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Encoder, Gauge,
    GaugeVec, TextEncoder,
};
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::middleware::{BusSummary, ChannelManagerStatus};

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all middleware metrics
struct MiddlewareMetrics {
    pool_used: GaugeVec,
    pool_total: GaugeVec,
    bus_status: Gauge,
    channel_len: GaugeVec,
    channel_capacity: GaugeVec,
    stop_acks: CounterVec,
}

/// Global storage for middleware metrics
static MIDDLEWARE_METRICS: OnceLock<MiddlewareMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted; held while registering
static METRICS_INIT_ATTEMPTED: Mutex<bool> = Mutex::new(false);

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup.
/// If metric registration fails, subsequent metric operations become no-ops.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = crawl_middleware::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
///     // Application can continue without metrics
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    // Prevent double initialization
    let mut attempted = METRICS_INIT_ATTEMPTED
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if *attempted {
        return Ok(());
    }
    *attempted = true;

    let metrics = MiddlewareMetrics {
        pool_used: register_gauge_vec!(
            "crawl_pool_used_entities",
            "Entities currently checked out of a pool",
            &["pool"]
        )?,
        pool_total: register_gauge_vec!(
            "crawl_pool_total_entities",
            "Fixed capacity of a pool",
            &["pool"]
        )?,
        bus_status: register_gauge!(
            "crawl_bus_status",
            "Channel manager status (0 = uninitialized, 1 = initialized, 2 = closed)"
        )?,
        channel_len: register_gauge_vec!(
            "crawl_bus_channel_len",
            "Values buffered in a bus channel",
            &["channel"]
        )?,
        channel_capacity: register_gauge_vec!(
            "crawl_bus_channel_capacity",
            "Capacity of a bus channel",
            &["channel"]
        )?,
        stop_acks: register_counter_vec!(
            "crawl_stop_acks_total",
            "Stop acknowledgments by participant code",
            &["code"]
        )?,
    };

    MIDDLEWARE_METRICS
        .set(metrics)
        .map_err(|_| "Middleware metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    MIDDLEWARE_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record the current occupancy of a named pool
pub fn observe_pool(name: &str, used: u32, total: u32) {
    if let Some(m) = MIDDLEWARE_METRICS.get() {
        m.pool_used.with_label_values(&[name]).set(f64::from(used));
        m.pool_total.with_label_values(&[name]).set(f64::from(total));
    }
}

/// Record a channel manager snapshot
pub fn observe_bus(summary: &BusSummary) {
    let Some(m) = MIDDLEWARE_METRICS.get() else {
        return;
    };

    m.bus_status.set(status_value(summary.status));

    for (name, usage) in summary.channels() {
        m.channel_len
            .with_label_values(&[name])
            .set(usage.len as f64);
        m.channel_capacity
            .with_label_values(&[name])
            .set(usage.capacity as f64);
    }
}

/// Record one stop acknowledgment from `code`
pub fn record_stop_ack(code: &str) {
    if let Some(m) = MIDDLEWARE_METRICS.get() {
        m.stop_acks.with_label_values(&[code]).inc();
    }
}

fn status_value(status: ChannelManagerStatus) -> f64 {
    match status {
        ChannelManagerStatus::Uninitialized => 0.0,
        ChannelManagerStatus::Initialized => 1.0,
        ChannelManagerStatus::Closed => 2.0,
    }
}

// ============================================================================
// Tests
// ============================================================================
