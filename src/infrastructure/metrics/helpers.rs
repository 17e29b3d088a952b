//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use crate::redis::CircuitState;
use crate::template::RenderOutput;

use super::{
    BACKEND_ERRORS_TOTAL, BACKEND_OPERATIONS_TOTAL, BACKEND_OPERATION_LATENCY, CACHE_HITS_TOTAL,
    CACHE_INVALIDATIONS_TOTAL, CACHE_MISSES_TOTAL, CIRCUIT_BREAKER_STATE, HTTP_REQUESTS_TOTAL,
    RENDERS_TOTAL, RENDER_MISSING_VARIABLES_TOTAL, TEMPLATES_STORED,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording render metrics
pub struct RenderMetrics;

impl RenderMetrics {
    /// Record a finished render
    pub fn record(output: &RenderOutput) {
        if output.is_complete() {
            RENDERS_TOTAL.with_label_values(&["complete"]).inc();
        } else {
            RENDERS_TOTAL.with_label_values(&["partial"]).inc();
            RENDER_MISSING_VARIABLES_TOTAL.inc_by(output.missing.len() as u64);
        }
    }

    /// Record a render refused in strict mode
    pub fn record_rejected(missing: usize) {
        RENDERS_TOTAL.with_label_values(&["rejected"]).inc();
        RENDER_MISSING_VARIABLES_TOTAL.inc_by(missing as u64);
    }
}

/// Helper struct for template cache metrics
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn record_hit() {
        CACHE_HITS_TOTAL.inc();
    }

    pub fn record_miss() {
        CACHE_MISSES_TOTAL.inc();
    }

    pub fn record_invalidation() {
        CACHE_INVALIDATIONS_TOTAL.inc();
    }
}

/// Helper struct for store backend metrics
pub struct BackendMetrics;

impl BackendMetrics {
    /// Record a completed backend operation and its latency
    pub fn record_operation(backend: &str, operation: &str, elapsed: Duration) {
        BACKEND_OPERATIONS_TOTAL
            .with_label_values(&[backend, operation])
            .inc();
        BACKEND_OPERATION_LATENCY
            .with_label_values(&[backend, operation])
            .observe(elapsed.as_secs_f64());
    }

    /// Record backend error
    pub fn record_error(backend: &str, operation: &str) {
        BACKEND_ERRORS_TOTAL
            .with_label_values(&[backend, operation])
            .inc();
    }

    /// Update the stored template count
    pub fn set_template_count(count: usize) {
        TEMPLATES_STORED.set(count as i64);
    }

    /// Publish the circuit breaker state of a backend
    pub fn set_circuit_state(backend: &str, state: CircuitState) {
        CIRCUIT_BREAKER_STATE
            .with_label_values(&[backend])
            .set(state as i64);
    }
}

/// Helper struct for HTTP metrics
pub struct HttpMetrics;

impl HttpMetrics {
    pub fn record_request(endpoint: &str) {
        HTTP_REQUESTS_TOTAL.with_label_values(&[endpoint]).inc();
    }
}
