//! Integration tests module
//!
//! This module provides end-to-end integration tests for the crawl middleware,
//! including:
//! - Complete download → analyze → collect pipeline over the channel bus
//! - Cooperative shutdown with the stop signal
//! - Error handling at the bus, pool and pipeline boundaries

pub mod error_scenarios;
pub mod shutdown_test;
pub mod workers;
