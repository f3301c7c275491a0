//! Metrics collection and exposition.
//!
//! # Metrics
//! - `xframe_headers_emitted_total` (counter): responses that carried the header
//! - `xframe_policy_updates_total` (counter): admin updates by result (ok, rejected, failed)
//! - `xframe_policy_reloads_total` (counter): out-of-band reloads by result (ok, failed)
//!
//! Recording is a no-op until a recorder is installed, so the store and
//! layer can record unconditionally.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_header_emitted() {
    metrics::counter!("xframe_headers_emitted_total").increment(1);
}

pub fn record_policy_update(result: &'static str) {
    metrics::counter!("xframe_policy_updates_total", "result" => result).increment(1);
}

pub fn record_policy_reload(result: &'static str) {
    metrics::counter!("xframe_policy_reloads_total", "result" => result).increment(1);
}
