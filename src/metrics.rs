// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for contact-sync.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application chooses the exporter; with no recorder
//! installed every call here is a no-op.
//!
//! # Metric Naming Convention
//! - `contact_sync_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: list, create, replace, delete
//! - `status`: HTTP status code
//! - `outcome`: applied, skipped

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a completed request and its HTTP status
pub fn record_request(operation: &str, status: u16) {
    counter!(
        "contact_sync_requests_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record request latency
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "contact_sync_request_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a request that failed before a response arrived
pub fn record_error(operation: &str, error_type: &str) {
    counter!(
        "contact_sync_errors_total",
        "operation" => operation.to_string(),
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

/// Record a rate-limit back-off
pub fn record_backoff(duration: Duration) {
    counter!("contact_sync_backoffs_total").increment(1);
    histogram!("contact_sync_backoff_seconds").record(duration.as_secs_f64());
}

/// Record the single retry issued after a back-off
pub fn record_retry(operation: &str) {
    counter!(
        "contact_sync_retries_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record the fate of one record in a bulk operation
pub fn record_record(operation: &str, outcome: &str) {
    counter!(
        "contact_sync_records_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a fetched list page
pub fn record_page(items: usize) {
    counter!("contact_sync_pages_total").increment(1);
    histogram!("contact_sync_page_items").record(items as f64);
}

/// Timer guard that records request latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}
