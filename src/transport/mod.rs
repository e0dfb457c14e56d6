//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher (client/dispatch.rs)
//!     → TransportRequest (method, url, headers, body)
//!     → Transport::execute
//!         → limits.rs (per-host connection ceiling)
//!         → http.rs (reqwest client, fixed 5s timeouts, TLS material)
//!     → TransportResponse (status, headers, body) | TransportError
//! ```
//!
//! # Design Decisions
//! - The transport is opaque to the client; anything implementing
//!   [`Transport`] can be injected (tests use scripted transports)
//! - The connection ceiling is sized once at construction; nothing mutates it
//!   per call
//! - Transport errors carry no status code; status policy lives in
//!   `resilience::failure`

pub mod http;
pub mod limits;
pub mod tls;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Method;
use thiserror::Error;
use url::Url;

pub use http::{ReqwestTransport, TransportSettings, MIN_CONNS_PER_HOST, READ_TIMEOUT, WRITE_TIMEOUT};
pub use limits::{HostLimits, HostPermit};
pub use tls::{load_tls_material, TlsMaterial};

/// A fully-addressed request handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// What the transport observed on the wire.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Errors raised below the status-code layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connection error: {0}")]
    Connect(String),

    /// Read or write timed out.
    #[error("transport timeout: {0}")]
    Timeout(String),

    /// Malformed response or protocol violation.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The response body could not be read.
    #[error("body error: {0}")]
    Body(String),

    /// The per-host connection ceiling was reached.
    #[error("no free connection available for host {host}")]
    PoolExhausted { host: String },

    /// The task driving the transport call ended abnormally.
    #[error("transport task failed: {0}")]
    Task(String),
}

impl TransportError {
    /// Returns `true` if this error is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connect(_) | Self::Timeout(_) | Self::PoolExhausted { .. }
        )
    }
}

/// The wire-level collaborator every client dispatches through.
///
/// Implementations must be `Send + Sync`: one handle is shared by every call a
/// client issues, and each call executes on its own tokio task.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Perform one request/response exchange.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;

    /// Identifier used in logs.
    fn name(&self) -> &str;
}
