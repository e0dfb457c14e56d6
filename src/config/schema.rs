//! Configuration schema definitions.
//!
//! This module defines the on-disk configuration structure for the invoker.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::options::{self, ClientOption};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InvokerConfig {
    /// Settings for the rest client.
    pub client: ClientSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Client construction settings. Unset fields fall back to option defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientSettings {
    /// Content type for request bodies (default "application/json").
    pub content_type: Option<String>,

    /// Connection pool size (default 1000).
    pub pool_size: Option<usize>,

    /// Status codes to treat as failures. May only narrow the canonical set.
    pub failure_codes: Vec<u16>,

    /// Optional TLS material; its presence switches the scheme to https.
    pub tls: Option<TlsConfig>,
}

impl ClientSettings {
    /// Translate these settings into functional options.
    pub fn to_options(&self) -> Vec<ClientOption> {
        let mut opts = Vec::new();

        if let Some(content_type) = &self.content_type {
            opts.push(options::content_type(content_type.clone()));
        }
        if let Some(pool_size) = self.pool_size {
            opts.push(options::pool_size(pool_size));
        }
        if !self.failure_codes.is_empty() {
            opts.push(options::failure_codes(&self.failure_codes));
        }
        if let Some(tls) = &self.tls {
            opts.push(options::tls(tls.clone()));
        }

        opts
    }
}

/// TLS configuration for outbound connections.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to additional trusted CA certificates (PEM).
    pub ca_path: Option<PathBuf>,

    /// Path to client certificate chain (PEM).
    pub cert_path: Option<PathBuf>,

    /// Path to client private key (PEM).
    pub key_path: Option<PathBuf>,

    /// Accept any server certificate. Test environments only.
    pub insecure_skip_verify: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
