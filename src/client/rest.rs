//! The "rest" protocol client.
//!
//! # Responsibilities
//! - Resolve layered options into an immutable [`ClientConfig`]
//! - Own one long-lived transport shared by every call
//! - Build registry-level [`Request`]s and dispatch them
//!
//! # Design Decisions
//! - The resolved configuration lives in an `ArcSwap`: calls read a snapshot,
//!   `init` swaps a new one in without blocking readers
//! - Transport settings (pool size, TLS) are fixed at construction; `init`
//!   only affects content type, codecs and the failure set

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::client::dispatch::Dispatcher;
use crate::client::Request;
use crate::error::InvokeResult;
use crate::load_balancer::LatencyCollector;
use crate::options::{
    CallOption, CallOptions, ClientConfig, ClientOption, ClientOptions, RequestOption,
    RequestOptions,
};
use crate::resilience::CallContext;
use crate::transport::{load_tls_material, ReqwestTransport, Transport, TransportSettings};

/// Plugin name the rest client is registered under.
pub const NAME: &str = "rest";

const DISPLAY_NAME: &str = "rest_client";

/// HTTP invocation client.
pub struct RestClient {
    options: Mutex<ClientOptions>,
    config: ArcSwap<ClientConfig>,
    transport: Arc<dyn Transport>,
    latency: ArcSwap<LatencyCollector>,
}

impl RestClient {
    /// Build a client backed by a reqwest transport.
    pub fn new(opts: Vec<ClientOption>) -> InvokeResult<Self> {
        let options = ClientOptions::apply(opts);
        let config = options.resolve();

        let tls = config.tls.as_ref().map(load_tls_material).transpose()?;
        let transport = ReqwestTransport::new(TransportSettings {
            pool_size: config.pool_size,
            tls,
        })?;

        Ok(Self::from_parts(options, config, Arc::new(transport)))
    }

    /// Build a client over an explicit transport.
    pub fn with_transport(transport: Arc<dyn Transport>, opts: Vec<ClientOption>) -> Self {
        let options = ClientOptions::apply(opts);
        let config = options.resolve();
        Self::from_parts(options, config, transport)
    }

    fn from_parts(
        options: ClientOptions,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let latency = options.latency.clone().unwrap_or_default();

        tracing::debug!(
            transport = transport.name(),
            content_type = %config.content_type,
            pool_size = config.pool_size,
            failure_codes = ?config.failure.codes(),
            scheme = config.scheme(),
            "Rest client created"
        );

        Self {
            options: Mutex::new(options),
            config: ArcSwap::from_pointee(config),
            transport,
            latency: ArcSwap::new(latency),
        }
    }

    /// Merge `opts` into the current options and swap in the re-resolved
    /// configuration.
    pub fn init(&self, opts: Vec<ClientOption>) -> InvokeResult<()> {
        let mut options = self.options.lock().unwrap_or_else(PoisonError::into_inner);
        options.merge(opts);

        let previous = self.config.load_full();
        let next = options.resolve();

        if next.pool_size != previous.pool_size || next.tls != previous.tls {
            tracing::warn!(
                pool_size = next.pool_size,
                tls = next.tls.is_some(),
                "Transport settings are fixed at construction; change ignored"
            );
        }

        if let Some(latency) = options.latency.clone() {
            self.latency.store(latency);
        }

        tracing::info!(
            content_type = %next.content_type,
            failure_codes = ?next.failure.codes(),
            "Rest client re-initialized"
        );

        self.config.store(Arc::new(next));
        Ok(())
    }

    /// Assemble a request for `service`/`schema`/`operation`.
    ///
    /// Request options are recorded on the request only.
    pub fn new_request<T>(
        &self,
        service: impl Into<String>,
        schema: impl Into<String>,
        operation: impl Into<String>,
        arg: T,
        req_opts: Vec<RequestOption>,
    ) -> Request
    where
        T: Any + Send + Sync,
    {
        build_request(service, schema, operation, Box::new(arg), req_opts)
    }

    /// Invoke `request` against `address`, populating `response` in place.
    ///
    /// `request.arg` must be a [`RestRequest`](crate::client::RestRequest)
    /// and `response` a [`RestResponse`](crate::client::RestResponse).
    pub async fn call(
        &self,
        ctx: &CallContext,
        address: &str,
        request: &mut Request,
        response: &mut (dyn Any + Send),
        opts: Vec<CallOption>,
    ) -> InvokeResult<()> {
        let config = self.config.load_full();
        let latency = self.latency.load_full();

        let dispatcher = Dispatcher {
            transport: &self.transport,
            config: &config,
            latency: &latency,
        };
        dispatcher
            .call(ctx, address, request, response, CallOptions::apply(opts))
            .await
    }

    /// Current resolved configuration.
    pub fn options(&self) -> Arc<ClientConfig> {
        self.config.load_full()
    }

    pub fn latency(&self) -> Arc<LatencyCollector> {
        self.latency.load_full()
    }

    pub fn name(&self) -> &'static str {
        DISPLAY_NAME
    }
}

impl fmt::Display for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(DISPLAY_NAME)
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.config.load_full())
            .field("transport", &self.transport.name())
            .finish_non_exhaustive()
    }
}

pub(crate) fn build_request(
    service: impl Into<String>,
    schema: impl Into<String>,
    operation: impl Into<String>,
    arg: Box<dyn Any + Send + Sync>,
    req_opts: Vec<RequestOption>,
) -> Request {
    let mut request = Request::new(service, schema, operation, arg);
    request.options = RequestOptions::apply(req_opts);
    request
}
