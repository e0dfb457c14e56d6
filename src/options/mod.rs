//! Option composition.
//!
//! # Data Flow
//! ```text
//! construction options ─┐
//! Init options ─────────┼─▶ ClientOptions (raw, last writer wins)
//! config file settings ─┘        │
//!                                ▼ resolve()
//!                           ClientConfig (defaults applied, failure set narrowed)
//!
//! call options    ─▶ CallOptions     (per call: url path)
//! request options ─▶ RequestOptions  (recorded on the Request only)
//! ```
//!
//! # Design Decisions
//! - Options are boxed closures mutating a plain struct, so callers can
//!   compose them freely and new knobs do not break existing call sites
//! - Raw options are kept separately from the resolved configuration so
//!   re-resolving after `init` is deterministic
//! - Request options are accepted and recorded but never consulted during
//!   dispatch; per-request overrides are not supported

pub mod call;
pub mod client;

pub use call::{metadata, url_path, CallOption, CallOptions, RequestOption, RequestOptions};
pub use client::{
    codecs, content_type, failure, failure_codes, latency_collector, pool_size, tls, ClientConfig,
    ClientOption, ClientOptions, DEFAULT_CONTENT_TYPE, DEFAULT_POOL_SIZE,
};
