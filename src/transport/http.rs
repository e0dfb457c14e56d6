//! Default transport backed by `reqwest`.
//!
//! # Responsibilities
//! - Own one pooled `reqwest::Client` for the lifetime of the rest client
//! - Apply fixed read/write timeouts
//! - Enforce the per-host connection ceiling
//! - Install TLS trust anchors and client identity

use std::time::Duration;

use async_trait::async_trait;

use crate::error::InvokeError;
use crate::transport::{
    HostLimits, TlsMaterial, Transport, TransportError, TransportRequest, TransportResponse,
};

/// Read timeout for every exchange.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Write timeout for every exchange (applied to connection setup and upload).
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Floor for the per-host connection ceiling. Applied once, at construction.
pub const MIN_CONNS_PER_HOST: usize = 512 * 20;

const USER_AGENT: &str = "restinvoker";

/// Construction-time settings for [`ReqwestTransport`].
#[derive(Debug, Clone, Default)]
pub struct TransportSettings {
    /// Requested pool size; the effective ceiling is never below
    /// [`MIN_CONNS_PER_HOST`].
    pub pool_size: usize,
    /// Optional TLS material.
    pub tls: Option<TlsMaterial>,
}

impl TransportSettings {
    /// The per-host ceiling actually enforced.
    pub fn effective_conns_per_host(&self) -> usize {
        self.pool_size.max(MIN_CONNS_PER_HOST)
    }
}

/// Pooled HTTP transport.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    limits: HostLimits,
}

impl ReqwestTransport {
    /// Build the transport. Fails only on unusable TLS material.
    pub fn new(settings: TransportSettings) -> Result<Self, InvokeError> {
        let per_host = settings.effective_conns_per_host();

        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(WRITE_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .timeout(READ_TIMEOUT + WRITE_TIMEOUT)
            .pool_max_idle_per_host(per_host);

        if let Some(tls) = &settings.tls {
            builder = builder.use_rustls_tls();
            if let Some(ca) = &tls.ca_bundle {
                for cert in reqwest::Certificate::from_pem_bundle(ca)
                    .map_err(|e| InvokeError::Tls(e.to_string()))?
                {
                    builder = builder.add_root_certificate(cert);
                }
            }
            if let Some(identity) = &tls.identity_pem {
                let identity = reqwest::Identity::from_pem(identity)
                    .map_err(|e| InvokeError::Tls(e.to_string()))?;
                builder = builder.identity(identity);
            }
            if tls.insecure_skip_verify {
                tracing::warn!("TLS certificate verification disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        let client = builder
            .build()
            .map_err(|e| InvokeError::Tls(format!("failed to build http client: {}", e)))?;

        tracing::debug!(
            max_conns_per_host = per_host,
            tls = settings.tls.is_some(),
            "HTTP transport initialized"
        );

        Ok(Self {
            client,
            limits: HostLimits::new(per_host),
        })
    }

    /// Connection ceiling bookkeeping.
    pub fn limits(&self) -> &HostLimits {
        &self.limits
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let host = host_key(&request.url);
        let _permit = self.limits.try_acquire(&host)?;

        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    fn name(&self) -> &str {
        USER_AGENT
    }
}

fn host_key(url: &url::Url) -> String {
    match (url.host_str(), url.port_or_known_default()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_body() || e.is_decode() {
        TransportError::Body(e.to_string())
    } else {
        TransportError::Protocol(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_never_below_floor() {
        let small = TransportSettings {
            pool_size: 1000,
            tls: None,
        };
        assert_eq!(small.effective_conns_per_host(), MIN_CONNS_PER_HOST);

        let large = TransportSettings {
            pool_size: 50_000,
            tls: None,
        };
        assert_eq!(large.effective_conns_per_host(), 50_000);
    }

    #[test]
    fn test_host_key_uses_default_port() {
        let url: url::Url = "http://127.0.0.1/x".parse().unwrap();
        assert_eq!(host_key(&url), "127.0.0.1:80");
        let url: url::Url = "https://example.com:8443/x".parse().unwrap();
        assert_eq!(host_key(&url), "example.com:8443");
    }

    #[tokio::test]
    async fn test_transport_builds_with_plain_settings() {
        let transport = ReqwestTransport::new(TransportSettings::default()).unwrap();
        assert_eq!(transport.limits().per_host(), MIN_CONNS_PER_HOST);
        assert_eq!(transport.name(), "restinvoker");
    }
}
