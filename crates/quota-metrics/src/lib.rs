//! Metrics collection and Prometheus exporter for quota-rs.
//!
//! This module provides metrics instrumentation for the usage limiter,
//! including check outcomes, storage failures and policy fallbacks.

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Initialize Prometheus metrics exporter.
///
/// Starts an HTTP server on the given address to expose metrics.
/// Returns an error message if binding fails.
pub fn init_prometheus(listen: &str) -> Result<(), String> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| format!("invalid metrics listen address: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install prometheus exporter: {}", e))?;

    Ok(())
}

// ============================================================================
// Metric Names
// ============================================================================

/// Total number of usage checks, by outcome
/// (`allowed`, `rejected`, `unlimited`, `degraded`).
pub const CHECKS_TOTAL: &str = "quota_checks_total";
/// Usage check duration histogram (seconds), storage round trip included.
pub const CHECK_DURATION_SECONDS: &str = "quota_check_duration_seconds";
/// Total number of storage failures by type (`storage`, `timeout`).
pub const STORAGE_ERRORS_TOTAL: &str = "quota_storage_errors_total";
/// Total number of classes resolved through the unknown-class fallback.
pub const POLICY_FALLBACK_TOTAL: &str = "quota_policy_fallback_total";
/// Total number of read-only usage lookups that hit storage.
pub const USAGE_READS_TOTAL: &str = "quota_usage_reads_total";
/// Total number of HTTP requests by route and status.
pub const HTTP_REQUESTS_TOTAL: &str = "quota_http_requests_total";

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a usage check outcome.
#[inline]
pub fn record_check(outcome: &'static str) {
    counter!(CHECKS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record usage check duration.
#[inline]
pub fn record_check_duration(duration_secs: f64) {
    histogram!(CHECK_DURATION_SECONDS).record(duration_secs);
}

/// Record a storage failure (the request was allowed anyway).
#[inline]
pub fn record_storage_error(error_type: &'static str) {
    counter!(STORAGE_ERRORS_TOTAL, "type" => error_type).increment(1);
}

/// Record an unknown-class fallback resolution.
#[inline]
pub fn record_policy_fallback() {
    counter!(POLICY_FALLBACK_TOTAL).increment(1);
}

/// Record a read-only usage lookup.
#[inline]
pub fn record_usage_read() {
    counter!(USAGE_READS_TOTAL).increment(1);
}

/// Record an HTTP response.
#[inline]
pub fn record_http_request(route: &'static str, status: u16) {
    counter!(HTTP_REQUESTS_TOTAL, "route" => route, "status" => status.to_string()).increment(1);
}

// ============================================================================
// Error Type Constants (re-exported from quota-core)
// ============================================================================

pub use quota_core::{
    ERROR_CONFIG, ERROR_INVALID_CALLER, ERROR_IO, ERROR_POLICY, ERROR_STORAGE, ERROR_TIMEOUT,
};

#[cfg(test)]
mod tests {
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;

    #[test]
    fn test_recorded_metrics_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_check("allowed");
            record_check("rejected");
            record_check("rejected");
            record_storage_error(ERROR_TIMEOUT);
            record_policy_fallback();
            record_http_request("check", 429);
        });

        let output = handle.render();
        assert!(output.contains(r#"quota_checks_total{outcome="rejected"} 2"#));
        assert!(output.contains(r#"quota_storage_errors_total{type="timeout"} 1"#));
        assert!(output.contains("quota_policy_fallback_total 1"));
        assert!(output.contains(r#"status="429""#));
    }

    #[test]
    fn test_init_prometheus_rejects_bad_address() {
        let err = init_prometheus("not-an-address").unwrap_err();
        assert!(err.contains("invalid metrics listen address"));
    }
}
