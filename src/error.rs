//! Error taxonomy for invocations.
//!
//! Every failure surfaced by [`crate::client::RestClient::call`] is an
//! [`InvokeError`]. Callers that drive retries or circuit breaking branch on
//! [`InvokeError::kind`] rather than on individual variants.

use thiserror::Error;

use crate::transport::TransportError;

/// Coarse classification consumed by retry and circuit-breaking layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The client was misused (wrong variant, bad URL, bad TLS material).
    Configuration,
    /// The caller cancelled or the deadline elapsed before completion.
    Cancellation,
    /// Connection, timeout or protocol failure reported by the transport.
    Transport,
    /// The transport succeeded but the status code is policy-marked as failure.
    ClassifiedFailure,
}

impl ErrorKind {
    /// Label used for metrics and structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Cancellation => "cancellation",
            ErrorKind::Transport => "transport",
            ErrorKind::ClassifiedFailure => "classified_failure",
        }
    }
}

/// Errors returned by client construction and invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The request argument is not a `RestRequest`.
    #[error("rest consumer call arg is not a RestRequest")]
    InvalidArgument,

    /// The response output is not a `RestResponse`.
    #[error("rest consumer response arg is not a RestResponse")]
    InvalidResponse,

    /// The computed target URL could not be parsed.
    #[error("invalid target url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// TLS material could not be loaded.
    #[error("TLS error: {0}")]
    Tls(String),

    /// No constructor is installed under the requested name.
    #[error("no client plugin installed under '{0}'")]
    UnknownPlugin(String),

    /// Body encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// The caller's context was cancelled before the call completed.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the call completed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Transport-level failure, propagated verbatim.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A well-formed response whose status code is marked as a failure.
    #[error("received failure status code {status} from http response: {body}")]
    FailureStatus { status: u16, body: String },
}

impl InvokeError {
    /// Classify this error for upstream fault-tolerance logic.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InvokeError::InvalidArgument
            | InvokeError::InvalidResponse
            | InvokeError::InvalidUrl { .. }
            | InvokeError::InvalidHeader(_)
            | InvokeError::Tls(_)
            | InvokeError::UnknownPlugin(_)
            | InvokeError::Codec(_) => ErrorKind::Configuration,
            InvokeError::Cancelled | InvokeError::DeadlineExceeded => ErrorKind::Cancellation,
            InvokeError::Transport(_) => ErrorKind::Transport,
            InvokeError::FailureStatus { .. } => ErrorKind::ClassifiedFailure,
        }
    }

    /// Returns `true` for errors a retry layer may reasonably retry.
    ///
    /// Configuration errors and caller cancellation are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            InvokeError::Transport(e) => e.is_retryable(),
            InvokeError::FailureStatus { .. } => true,
            _ => false,
        }
    }
}

/// Result type for invocation operations.
pub type InvokeResult<T> = Result<T, InvokeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_status_display() {
        let err = InvokeError::FailureStatus {
            status: 503,
            body: "overloaded".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded"));
        assert_eq!(err.kind(), ErrorKind::ClassifiedFailure);
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let inner = TransportError::Connect("connection refused".into());
        let expected = inner.to_string();
        let err = InvokeError::from(inner);
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_configuration_errors_not_retryable() {
        assert_eq!(InvokeError::InvalidArgument.kind(), ErrorKind::Configuration);
        assert!(!InvokeError::InvalidResponse.is_retryable());
        assert!(!InvokeError::Cancelled.is_retryable());
        assert_eq!(InvokeError::DeadlineExceeded.kind().as_str(), "cancellation");
    }
}
