//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / dispatch produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (call counters, latency histograms)
//!     → spans.rs (one span per call, carrying the request ID)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - The library only emits events and metrics; installing a subscriber or
//!   exporter is the binary's job
//! - Metric updates are cheap enough to run on every call

pub mod logging;
pub mod metrics;
pub mod spans;
