//! Prometheus metrics for the tournament server.
//!
//! Metrics are recorded through the `metrics` facade. When `METRICS_BIND` is
//! configured an exporter serves them in Prometheus text format; otherwise the
//! calls are no-ops.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use padel_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/auth/login", 200);
//! metrics::brackets_generated_total("ranking");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// `path` should be the matched route template so that IDs do not explode
/// label cardinality.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment new accounts counter.
pub fn accounts_created_total() {
    metrics::counter!("accounts_created_total").increment(1);
}

// ============================================================================
// Tournament Metrics
// ============================================================================

/// Increment tournament registrations counter.
pub fn registrations_total(pair: bool) {
    metrics::counter!("registrations_total",
        "kind" => if pair { "pair" } else { "single" }
    )
    .increment(1);
}

/// Increment generated brackets counter.
pub fn brackets_generated_total(seeding: &str) {
    metrics::counter!("brackets_generated_total",
        "seeding" => seeding.to_string()
    )
    .increment(1);
}

/// Increment recorded match results counter.
pub fn match_results_total() {
    metrics::counter!("match_results_total").increment(1);
}

/// Increment finished tournaments counter.
pub fn tournaments_finished_total() {
    metrics::counter!("tournaments_finished_total").increment(1);
}

/// Record points handed out when a tournament finishes.
pub fn points_awarded(points: i32) {
    metrics::histogram!("points_awarded").record(f64::from(points));
}
