//! Prometheus metrics for the template service.
//!
//! - Render metrics (outcomes, unresolved placeholders)
//! - Cache metrics (hits, misses, invalidations)
//! - Store backend metrics (operations, errors, latency, circuit breaker)
//! - HTTP request metrics

mod helpers;

pub use helpers::{encode_metrics, BackendMetrics, CacheMetrics, HttpMetrics, RenderMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    register_int_gauge_vec, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "ara";

lazy_static! {
    // ============================================================================
    // Render Metrics
    // ============================================================================

    /// Renders by outcome (complete, partial, rejected)
    pub static ref RENDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_renders_total", METRIC_PREFIX),
        "Total template renders by outcome",
        &["outcome"]
    ).unwrap();

    /// Placeholders left unresolved across all renders
    pub static ref RENDER_MISSING_VARIABLES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_missing_variables_total", METRIC_PREFIX),
        "Total distinct variables left unresolved by renders"
    ).unwrap();

    // ============================================================================
    // Cache Metrics
    // ============================================================================

    pub static ref CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_cache_hits_total", METRIC_PREFIX),
        "Template list reads served from cache"
    ).unwrap();

    pub static ref CACHE_MISSES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_cache_misses_total", METRIC_PREFIX),
        "Template list reads that loaded from the store"
    ).unwrap();

    pub static ref CACHE_INVALIDATIONS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_cache_invalidations_total", METRIC_PREFIX),
        "Explicit template cache invalidations"
    ).unwrap();

    // ============================================================================
    // Store Metrics
    // ============================================================================

    /// Number of templates in the last loaded snapshot
    pub static ref TEMPLATES_STORED: IntGauge = register_int_gauge!(
        format!("{}_templates_stored", METRIC_PREFIX),
        "Number of templates in the store"
    ).unwrap();

    pub static ref BACKEND_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_backend_operations_total", METRIC_PREFIX),
        "Total store backend operations",
        &["backend", "operation"]
    ).unwrap();

    pub static ref BACKEND_OPERATION_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_backend_operation_latency_seconds", METRIC_PREFIX),
        "Store backend operation latency in seconds",
        &["backend", "operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ).unwrap();

    pub static ref BACKEND_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_backend_errors_total", METRIC_PREFIX),
        "Total store backend errors",
        &["backend", "operation"]
    ).unwrap();

    /// Store circuit breaker state (0=closed, 1=open, 2=half-open)
    pub static ref CIRCUIT_BREAKER_STATE: IntGaugeVec = register_int_gauge_vec!(
        format!("{}_circuit_breaker_state", METRIC_PREFIX),
        "Store circuit breaker state (0=closed, 1=open, 2=half-open)",
        &["backend"]
    ).unwrap();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_http_requests_total", METRIC_PREFIX),
        "Total HTTP requests by endpoint",
        &["endpoint"]
    ).unwrap();
}
