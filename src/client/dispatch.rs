//! Invocation dispatch.
//!
//! # Responsibilities
//! - Validate the request/response variants before any network activity
//! - Build the target URL (scheme + address + path) and set it on the request
//! - Fill the default content type and a request ID
//! - Run the transport exchange on its own task and race it against the
//!   caller's context
//! - Feed the outcome through the failure classifier
//!
//! # Design Decisions
//! - The race is biased towards cancellation: a context that is already done
//!   always wins
//! - The losing transport task is aborted so its connection slot is released
//!   immediately
//! - Latency is recorded only for exchanges that produced a response

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::client::{Request, RestRequest, RestResponse};
use crate::error::{InvokeError, InvokeResult};
use crate::load_balancer::LatencyCollector;
use crate::observability::{metrics, spans};
use crate::options::{CallOptions, ClientConfig};
use crate::resilience::CallContext;
use crate::transport::{Transport, TransportError, TransportRequest};

/// Header carrying the per-call correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Everything a single dispatch needs from its client.
pub(crate) struct Dispatcher<'a> {
    pub transport: &'a Arc<dyn Transport>,
    pub config: &'a ClientConfig,
    pub latency: &'a LatencyCollector,
}

impl Dispatcher<'_> {
    pub(crate) async fn call(
        &self,
        ctx: &CallContext,
        address: &str,
        request: &mut Request,
        response: &mut (dyn Any + Send),
        opts: CallOptions,
    ) -> InvokeResult<()> {
        let service = request.service.clone();
        let operation = request.operation.clone();

        let rest_request = request
            .arg
            .downcast_mut::<RestRequest>()
            .ok_or(InvokeError::InvalidArgument)?;
        let rest_response = response
            .downcast_mut::<RestResponse>()
            .ok_or(InvokeError::InvalidResponse)?;

        // Cancelled on every exit path, including early returns below.
        let ctx = ctx.child();
        let _cancel_on_exit = ctx.token().clone().drop_guard();

        let url = target_url(self.config, address, &opts.url_path)?;
        rest_request.set_uri(url.clone());
        let request_id = self.prepare_headers(rest_request);

        if ctx.is_cancelled() {
            return self.config.failure.classify(Err(InvokeError::Cancelled), None);
        }

        let transport_request = rest_request.to_transport(url);
        let span = spans::call_span(&service, &operation, address, &request_id);

        let outcome = self
            .race(&ctx, address, transport_request, rest_response)
            .instrument(span)
            .await;

        self.config.failure.classify(outcome, Some(&*rest_response))
    }

    /// Default content type when a body is present, and a request ID.
    fn prepare_headers(&self, request: &mut RestRequest) -> String {
        let has_body = !request.body().is_empty();
        let headers = request.headers_mut();

        if has_body && !headers.contains_key(CONTENT_TYPE) {
            match HeaderValue::from_str(&self.config.content_type) {
                Ok(value) => {
                    headers.insert(CONTENT_TYPE, value);
                }
                Err(_) => tracing::warn!(
                    content_type = %self.config.content_type,
                    "Configured content type is not a valid header value"
                ),
            }
        }

        if let Some(existing) = headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
            return existing.to_string();
        }

        let request_id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(X_REQUEST_ID, value);
        }
        request_id
    }

    async fn race(
        &self,
        ctx: &CallContext,
        address: &str,
        transport_request: TransportRequest,
        response: &mut RestResponse,
    ) -> InvokeResult<()> {
        let start_time = Instant::now();
        let transport = Arc::clone(self.transport);
        // Also stops once the call's token is cancelled, including when this
        // future is dropped before the race resolves.
        let token = ctx.token().clone();
        let mut task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = transport.execute(transport_request) => Some(result),
            }
        });

        let in_flight = metrics::track_in_flight();
        let raced = tokio::select! {
            biased;
            cancelled = ctx.done() => Err(cancelled),
            joined = &mut task => Ok(joined),
        };
        drop(in_flight);

        let outcome = match raced {
            Err(cancelled) => {
                task.abort();
                tracing::debug!(error = %cancelled, "Call abandoned, transport task aborted");
                Err(cancelled)
            }
            Ok(Ok(Some(Ok(received)))) => {
                self.latency.record(address, start_time.elapsed());
                response.populate(received);
                Ok(())
            }
            Ok(Ok(Some(Err(e)))) => Err(InvokeError::Transport(e)),
            Ok(Ok(None)) => Err(InvokeError::Cancelled),
            Ok(Err(join_error)) => Err(InvokeError::Transport(TransportError::Task(
                join_error.to_string(),
            ))),
        };

        let status = outcome.as_ref().ok().map(|_| response.status_code());
        let label = match (&outcome, status) {
            (Err(e), _) => e.kind().as_str(),
            (Ok(()), Some(code)) if self.config.failure.is_failure(code) => "classified_failure",
            (Ok(()), _) => "success",
        };
        metrics::record_call(label, status, start_time);

        match &outcome {
            Ok(()) => tracing::debug!(
                status = ?status,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Call completed"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                kind = e.kind().as_str(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Call failed"
            ),
        }

        outcome
    }
}

/// `scheme://address{path}` for the configured scheme.
pub(crate) fn target_url(config: &ClientConfig, address: &str, path: &str) -> InvokeResult<Url> {
    let raw = format!("{}://{}{}", config.scheme(), address, path);
    Url::parse(&raw).map_err(|e| InvokeError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TlsConfig;
    use crate::options::{self, ClientOptions};

    #[test]
    fn test_target_url_plain_and_tls() {
        let plain = ClientConfig::default();
        let url = target_url(&plain, "127.0.0.1:8080", "/users/1?x=y").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/users/1?x=y");

        let secure = ClientOptions::apply(vec![options::tls(TlsConfig::default())]).resolve();
        let url = target_url(&secure, "svc.local", "").unwrap();
        assert_eq!(url.as_str(), "https://svc.local/");
    }

    #[test]
    fn test_target_url_rejects_garbage() {
        let err = target_url(&ClientConfig::default(), "bad host:x", "/").unwrap_err();
        assert!(matches!(err, InvokeError::InvalidUrl { .. }));
    }
}
