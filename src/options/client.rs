//! Client construction options and their resolution.

use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::{default_codecs, CodecMap};
use crate::config::TlsConfig;
use crate::load_balancer::LatencyCollector;
use crate::resilience::{failure_label, FailureSet};

/// Content type used when none is configured.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Connection pool size used when none is configured.
pub const DEFAULT_POOL_SIZE: usize = 1000;

/// A functional option mutating [`ClientOptions`] in place.
pub type ClientOption = Box<dyn FnOnce(&mut ClientOptions) + Send>;

/// Raw, layered option values. `None` means "not set by anyone yet".
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub codecs: Option<CodecMap>,
    pub content_type: Option<String>,
    pub failure: Option<HashMap<String, bool>>,
    pub pool_size: Option<usize>,
    pub tls: Option<TlsConfig>,
    pub latency: Option<Arc<LatencyCollector>>,
}

impl ClientOptions {
    /// Apply `opts` in order to empty options.
    pub fn apply<I>(opts: I) -> Self
    where
        I: IntoIterator<Item = ClientOption>,
    {
        let mut options = Self::default();
        options.merge(opts);
        options
    }

    /// Apply `opts` in order on top of the current values.
    pub fn merge<I>(&mut self, opts: I)
    where
        I: IntoIterator<Item = ClientOption>,
    {
        for opt in opts {
            opt(self);
        }
    }

    /// Produce the effective configuration.
    pub fn resolve(&self) -> ClientConfig {
        let empty = HashMap::new();

        ClientConfig {
            codecs: self.codecs.clone().unwrap_or_else(default_codecs),
            content_type: self
                .content_type
                .clone()
                .filter(|ct| !ct.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            failure: FailureSet::narrow(self.failure.as_ref().unwrap_or(&empty)),
            pool_size: self
                .pool_size
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_POOL_SIZE),
            tls: self.tls.clone(),
        }
    }
}

/// Effective client configuration. Immutable; replaced wholesale on `init`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub codecs: CodecMap,
    pub content_type: String,
    pub failure: FailureSet,
    pub pool_size: usize,
    pub tls: Option<TlsConfig>,
}

impl ClientConfig {
    /// `https` when TLS material is configured, `http` otherwise.
    pub fn scheme(&self) -> &'static str {
        if self.tls.is_some() {
            "https"
        } else {
            "http"
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientOptions::default().resolve()
    }
}

/// Set the codec map.
pub fn codecs(map: CodecMap) -> ClientOption {
    Box::new(move |o| o.codecs = Some(map))
}

/// Set the request content type.
pub fn content_type(content_type: impl Into<String>) -> ClientOption {
    let content_type = content_type.into();
    Box::new(move |o| o.content_type = Some(content_type))
}

/// Narrow the failure set using labels such as `http_503`.
pub fn failure(labels: HashMap<String, bool>) -> ClientOption {
    Box::new(move |o| o.failure = Some(labels))
}

/// Narrow the failure set using numeric status codes.
pub fn failure_codes(codes: &[u16]) -> ClientOption {
    failure(codes.iter().map(|code| (failure_label(*code), true)).collect())
}

/// Set the connection pool size. Zero means "use the default".
pub fn pool_size(size: usize) -> ClientOption {
    Box::new(move |o| o.pool_size = Some(size))
}

/// Configure TLS material; switches the scheme to https.
pub fn tls(config: TlsConfig) -> ClientOption {
    Box::new(move |o| o.tls = Some(config))
}

/// Inject the latency collector shared with the load balancer.
pub fn latency_collector(collector: Arc<LatencyCollector>) -> ClientOption {
    Box::new(move |o| o.latency = Some(collector))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientOptions::apply(Vec::new()).resolve();
        assert_eq!(config.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.failure, FailureSet::canonical());
        assert_eq!(config.codecs.len(), default_codecs().len());
        assert!(config.tls.is_none());
        assert_eq!(config.scheme(), "http");
    }

    #[test]
    fn test_last_writer_wins() {
        let config = ClientOptions::apply(vec![
            content_type("text/plain"),
            pool_size(10),
            content_type("application/xml"),
        ])
        .resolve();
        assert_eq!(config.content_type, "application/xml");
        assert_eq!(config.pool_size, 10);
    }

    #[test]
    fn test_zero_pool_and_empty_content_type_fall_back() {
        let config = ClientOptions::apply(vec![pool_size(0), content_type("")]).resolve();
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_failure_narrowing() {
        let config = ClientOptions::apply(vec![failure_codes(&[502, 418])]).resolve();
        assert_eq!(config.failure.codes(), vec![502]);

        let mut only_ok = HashMap::new();
        only_ok.insert("http_200".to_string(), true);
        let config = ClientOptions::apply(vec![failure(only_ok)]).resolve();
        assert!(config.failure.is_empty());

        let config = ClientOptions::apply(vec![failure(HashMap::new())]).resolve();
        assert_eq!(config.failure, FailureSet::canonical());
    }

    #[test]
    fn test_merge_keeps_earlier_values() {
        let mut options = ClientOptions::apply(vec![failure_codes(&[500]), pool_size(5)]);
        options.merge(vec![content_type("text/plain")]);

        let config = options.resolve();
        assert_eq!(config.failure.codes(), vec![500]);
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.content_type, "text/plain");

        // Re-resolving is stable
        assert_eq!(options.resolve().failure, config.failure);
    }

    #[test]
    fn test_tls_switches_scheme() {
        let config = ClientOptions::apply(vec![tls(TlsConfig::default())]).resolve();
        assert_eq!(config.scheme(), "https");
    }
}
