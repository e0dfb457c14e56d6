//! Per-call spans.

use tracing::Span;

/// Span wrapping one invocation.
pub fn call_span(service: &str, operation: &str, address: &str, request_id: &str) -> Span {
    tracing::info_span!(
        "rest_call",
        service = %service,
        operation = %operation,
        address = %address,
        request_id = %request_id,
    )
}
