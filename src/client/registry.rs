//! Protocol client registry.
//!
//! Constructors are installed under a plugin name; `create` builds one client
//! per name and hands back the cached instance on later calls, re-applying
//! the new options through `init`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::client::rest::{self, build_request, RestClient};
use crate::client::Request;
use crate::error::{InvokeError, InvokeResult};
use crate::load_balancer::LatencyCollector;
use crate::options::{latency_collector, CallOption, ClientConfig, ClientOption, RequestOption};
use crate::resilience::CallContext;

/// Capability every protocol client exposes to the registry.
#[async_trait]
pub trait ProtocolClient: Send + Sync + fmt::Display {
    /// Merge additional options into the client's configuration.
    fn init(&self, opts: Vec<ClientOption>) -> InvokeResult<()>;

    /// Assemble a request envelope.
    fn new_request(
        &self,
        service: &str,
        schema: &str,
        operation: &str,
        arg: Box<dyn Any + Send + Sync>,
        req_opts: Vec<RequestOption>,
    ) -> Request;

    /// Invoke `request` against `address`, populating `response` in place.
    async fn call(
        &self,
        ctx: &CallContext,
        address: &str,
        request: &mut Request,
        response: &mut (dyn Any + Send),
        opts: Vec<CallOption>,
    ) -> InvokeResult<()>;

    /// Current resolved configuration.
    fn options(&self) -> Arc<ClientConfig>;
}

#[async_trait]
impl ProtocolClient for RestClient {
    fn init(&self, opts: Vec<ClientOption>) -> InvokeResult<()> {
        RestClient::init(self, opts)
    }

    fn new_request(
        &self,
        service: &str,
        schema: &str,
        operation: &str,
        arg: Box<dyn Any + Send + Sync>,
        req_opts: Vec<RequestOption>,
    ) -> Request {
        build_request(service, schema, operation, arg, req_opts)
    }

    async fn call(
        &self,
        ctx: &CallContext,
        address: &str,
        request: &mut Request,
        response: &mut (dyn Any + Send),
        opts: Vec<CallOption>,
    ) -> InvokeResult<()> {
        RestClient::call(self, ctx, address, request, response, opts).await
    }

    fn options(&self) -> Arc<ClientConfig> {
        RestClient::options(self)
    }
}

/// Builds a client from construction options.
pub type ClientConstructor =
    Arc<dyn Fn(Vec<ClientOption>) -> InvokeResult<Arc<dyn ProtocolClient>> + Send + Sync>;

/// Name → constructor, name → live client.
pub struct ClientRegistry {
    constructors: DashMap<String, ClientConstructor>,
    clients: DashMap<String, Arc<dyn ProtocolClient>>,
    latency: Arc<LatencyCollector>,
}

impl ClientRegistry {
    /// An empty registry sharing `latency` with every client it creates.
    pub fn new(latency: Arc<LatencyCollector>) -> Self {
        Self {
            constructors: DashMap::new(),
            clients: DashMap::new(),
            latency,
        }
    }

    /// A registry with the rest client installed under `"rest"`.
    pub fn with_defaults(latency: Arc<LatencyCollector>) -> Self {
        let registry = Self::new(latency);
        registry.install_plugin(
            rest::NAME,
            Arc::new(
                |opts: Vec<ClientOption>| -> InvokeResult<Arc<dyn ProtocolClient>> {
                    Ok(Arc::new(RestClient::new(opts)?))
                },
            ),
        );
        registry
    }

    /// Install (or replace) the constructor for `name`.
    pub fn install_plugin(&self, name: &str, constructor: ClientConstructor) {
        if self
            .constructors
            .insert(name.to_string(), constructor)
            .is_some()
        {
            tracing::warn!(plugin = name, "Client plugin replaced");
        } else {
            tracing::debug!(plugin = name, "Client plugin installed");
        }
    }

    /// Installed plugin names, sorted.
    pub fn plugins(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// The live client for `name`, if one has been created.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ProtocolClient>> {
        self.clients.get(name).map(|entry| entry.value().clone())
    }

    /// Create the client for `name`, or re-initialize the existing one.
    ///
    /// The registry's latency collector is applied before `opts`.
    pub fn create(
        &self,
        name: &str,
        opts: Vec<ClientOption>,
    ) -> InvokeResult<Arc<dyn ProtocolClient>> {
        let mut all = Vec::with_capacity(opts.len() + 1);
        all.push(latency_collector(self.latency.clone()));
        all.extend(opts);

        if let Some(client) = self.get(name) {
            client.init(all)?;
            return Ok(client);
        }

        // No map lock is held while the constructor runs.
        let constructor = self
            .constructors
            .get(name)
            .map(|c| c.value().clone())
            .ok_or_else(|| InvokeError::UnknownPlugin(name.to_string()))?;
        let built = constructor(all)?;

        let client = match self.clients.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(plugin = name, "Client created concurrently; keeping the first");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                tracing::info!(plugin = name, client = %built, "Client created");
                entry.insert(built).value().clone()
            }
        };
        Ok(client)
    }

    pub fn latency(&self) -> &Arc<LatencyCollector> {
        &self.latency
    }
}

impl fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("plugins", &self.plugins())
            .field("clients", &self.clients.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RestRequest, RestResponse};
    use crate::options;

    #[test]
    fn test_defaults_install_rest() {
        let registry = ClientRegistry::with_defaults(Arc::new(LatencyCollector::new()));
        assert_eq!(registry.plugins(), vec!["rest".to_string()]);
        assert!(registry.get("rest").is_none());
    }

    #[tokio::test]
    async fn test_create_caches_one_client_per_name() {
        let registry = ClientRegistry::with_defaults(Arc::new(LatencyCollector::new()));

        let first = registry
            .create("rest", vec![options::content_type("text/plain")])
            .unwrap();
        let second = registry
            .create("rest", vec![options::failure_codes(&[503])])
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.to_string(), "rest_client");

        let config = second.options();
        assert_eq!(config.content_type, "text/plain");
        assert_eq!(config.failure.codes(), vec![503]);
        assert!(registry.get("rest").is_some());
    }

    #[tokio::test]
    async fn test_constructor_may_use_registry() {
        let registry = Arc::new(ClientRegistry::with_defaults(Arc::new(LatencyCollector::new())));
        let weak = Arc::downgrade(&registry);

        registry.install_plugin(
            "nested",
            Arc::new(
                move |opts: Vec<ClientOption>| -> InvokeResult<Arc<dyn ProtocolClient>> {
                    let registry = weak.upgrade().ok_or(InvokeError::InvalidArgument)?;
                    assert!(registry.get("nested").is_none());
                    registry.create("rest", vec![])?;
                    Ok(Arc::new(RestClient::new(opts)?))
                },
            ),
        );

        let client = registry.create("nested", vec![]).unwrap();
        assert!(Arc::ptr_eq(&client, &registry.get("nested").unwrap()));
        assert!(registry.get("rest").is_some());
    }

    #[test]
    fn test_unknown_plugin() {
        let registry = ClientRegistry::new(Arc::new(LatencyCollector::new()));
        let err = registry.create("grpc", vec![]).err().unwrap();
        assert!(matches!(err, InvokeError::UnknownPlugin(name) if name == "grpc"));
    }

    #[tokio::test]
    async fn test_trait_object_rejects_wrong_variant() {
        let registry = ClientRegistry::with_defaults(Arc::new(LatencyCollector::new()));
        let client = registry.create("rest", vec![]).unwrap();

        let mut request = client.new_request("svc", "schema", "op", Box::new(7u8), vec![]);
        let mut response = RestResponse::default();
        let result = client
            .call(
                &CallContext::background(),
                "127.0.0.1:1",
                &mut request,
                &mut response,
                vec![],
            )
            .await;
        assert!(matches!(result, Err(InvokeError::InvalidArgument)));

        let request = client.new_request("S", "Sc", "Op", Box::new(RestRequest::get()), vec![]);
        assert_eq!(
            (request.service.as_str(), request.schema.as_str(), request.operation.as_str()),
            ("S", "Sc", "Op")
        );
        assert!(request.arg_ref::<RestRequest>().is_some());
    }
}
