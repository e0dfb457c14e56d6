//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rest_client_calls_total` (counter): calls by outcome and status
//! - `rest_client_call_duration_seconds` (histogram): latency by outcome
//! - `rest_client_in_flight` (gauge): calls currently awaiting the transport

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished call.
pub fn record_call(outcome: &'static str, status: Option<u16>, start_time: Instant) {
    let status = status.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string());
    let duration = start_time.elapsed().as_secs_f64();

    counter!("rest_client_calls_total", "outcome" => outcome, "status" => status).increment(1);
    histogram!("rest_client_call_duration_seconds", "outcome" => outcome).record(duration);
}

/// Counts one call in `rest_client_in_flight` until dropped.
#[must_use]
pub struct InFlightGuard(());

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("rest_client_in_flight").decrement(1.0);
    }
}

/// Track a call as in flight for the lifetime of the returned guard.
pub fn track_in_flight() -> InFlightGuard {
    gauge!("rest_client_in_flight").increment(1.0);
    InFlightGuard(())
}
