//! Metrics definitions for connection loading.
//!
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "pagination_requests_total",
        "Total number of connection pagination requests"
    );
    describe_counter!(
        "pagination_validation_errors_total",
        "Total number of pagination requests rejected during validation"
    );
    describe_counter!(
        "pagination_load_failures_total",
        "Total number of pagination requests failed by the record source"
    );
    describe_histogram!(
        "pagination_duration_seconds",
        "Time taken to resolve a connection in seconds"
    );
}

/// Record an incoming pagination request.
pub fn record_request(entity: &'static str) {
    counter!("pagination_requests_total", "entity" => entity).increment(1);
}

/// Record a validation failure.
///
/// # Arguments
/// * `entity` - The record type tag
/// * `code` - The error code (e.g. `LIMIT_EXCEEDED`)
pub fn record_validation_error(entity: &'static str, code: &'static str) {
    counter!("pagination_validation_errors_total", "entity" => entity, "code" => code)
        .increment(1);
}

/// Record a record source failure.
pub fn record_load_failure(entity: &'static str) {
    counter!("pagination_load_failures_total", "entity" => entity).increment(1);
}

/// A timer that records the connection duration when dropped.
pub struct PaginationTimer {
    entity: &'static str,
    start: Instant,
}

impl PaginationTimer {
    /// Start a new timer for `entity`.
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            start: Instant::now(),
        }
    }
}

impl Drop for PaginationTimer {
    fn drop(&mut self) {
        histogram!("pagination_duration_seconds", "entity" => self.entity)
            .record(self.start.elapsed().as_secs_f64());
    }
}
