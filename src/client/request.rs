//! Request types.
//!
//! [`Request`] is the registry-level envelope every protocol client accepts.
//! Its argument is opaque; the rest client requires it to be a
//! [`RestRequest`].

use std::any::Any;
use std::fmt;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::codec::Codec;
use crate::error::InvokeError;
use crate::options::RequestOptions;
use crate::transport::TransportRequest;

/// A protocol-agnostic invocation request.
pub struct Request {
    /// Target microservice name.
    pub service: String,
    /// Schema (interface) identifier.
    pub schema: String,
    /// Operation identifier.
    pub operation: String,
    /// Protocol-specific argument.
    pub arg: Box<dyn Any + Send + Sync>,
    /// Request options as recorded at build time.
    pub options: RequestOptions,
}

impl Request {
    pub fn new(
        service: impl Into<String>,
        schema: impl Into<String>,
        operation: impl Into<String>,
        arg: Box<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            service: service.into(),
            schema: schema.into(),
            operation: operation.into(),
            arg,
            options: RequestOptions::default(),
        }
    }

    /// Borrow the argument as `T`.
    pub fn arg_ref<T: Any>(&self) -> Option<&T> {
        self.arg.downcast_ref::<T>()
    }

    /// Mutably borrow the argument as `T`.
    pub fn arg_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.arg.downcast_mut::<T>()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("service", &self.service)
            .field("schema", &self.schema)
            .field("operation", &self.operation)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// The rest client's own request: method, headers and body.
///
/// The target URL is filled in by the dispatcher from the scheme, the call
/// address and the call's path option.
#[derive(Debug, Clone)]
pub struct RestRequest {
    method: Method,
    uri: Option<Url>,
    headers: HeaderMap,
    body: Bytes,
}

impl RestRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            uri: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Add a header, replacing any existing value.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, InvokeError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| InvokeError::InvalidHeader(format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| InvokeError::InvalidHeader(format!("{}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set a raw body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as JSON into the body.
    pub fn with_json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, InvokeError> {
        self.body = serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| InvokeError::Codec(e.to_string()))?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    /// Encode `value` with `codec` and tag the body with its content type.
    pub fn encode_with(
        mut self,
        codec: &dyn Codec,
        value: &serde_json::Value,
    ) -> Result<Self, InvokeError> {
        let content_type = HeaderValue::from_str(codec.content_type())
            .map_err(|e| InvokeError::InvalidHeader(format!("content-type: {}", e)))?;
        self.body = codec.encode(value)?;
        self.headers.insert(CONTENT_TYPE, content_type);
        Ok(self)
    }

    pub fn set_uri(&mut self, uri: Url) {
        self.uri = Some(uri);
    }

    /// Target URL, once the request has been dispatched.
    pub fn uri(&self) -> Option<&Url> {
        self.uri.as_ref()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Snapshot for the transport task. Cheap: the body is reference counted.
    pub(crate) fn to_transport(&self, url: Url) -> TransportRequest {
        TransportRequest {
            method: self.method.clone(),
            url,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

impl Default for RestRequest {
    fn default() -> Self {
        Self::get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TextCodec;
    use serde_json::json;

    #[test]
    fn test_request_fields() {
        let req = Request::new("S", "Sc", "Op", Box::new(42i32));
        assert_eq!(req.service, "S");
        assert_eq!(req.schema, "Sc");
        assert_eq!(req.operation, "Op");
        assert_eq!(req.arg_ref::<i32>(), Some(&42));
        assert!(req.arg_ref::<RestRequest>().is_none());
    }

    #[test]
    fn test_with_json_sets_content_type() {
        let req = RestRequest::post().with_json(&json!({"name": "a"})).unwrap();
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(&req.body()[..], br#"{"name":"a"}"#);
        assert!(req.uri().is_none());
    }

    #[test]
    fn test_encode_with_codec() {
        let req = RestRequest::post().encode_with(&TextCodec, &json!("hi")).unwrap();
        assert_eq!(req.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(&req.body()[..], b"hi");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = RestRequest::get().with_header("bad header", "v").unwrap_err();
        assert!(matches!(err, InvokeError::InvalidHeader(_)));

        let req = RestRequest::get().with_header("x-trace", "abc").unwrap();
        assert_eq!(req.headers()["x-trace"], "abc");
    }
}
