//! Load-balancer feedback subsystem.
//!
//! # Data Flow
//! ```text
//! RestClient::call completes (success or classified failure)
//!     → latency.rs (record elapsed time under the call's address)
//!     → load-balancing strategy reads samples / averages
//! ```
//!
//! # Design Decisions
//! - The client only produces latency samples; endpoint selection belongs to
//!   the strategy consuming them
//! - Collector is an explicitly owned object injected into each client
//! - Cancelled calls and transport errors are not recorded

pub mod latency;

pub use latency::{LatencyCollector, DEFAULT_WINDOW};
