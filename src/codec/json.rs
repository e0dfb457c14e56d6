//! Built-in codecs.

use bytes::Bytes;
use serde_json::Value;

use crate::codec::Codec;
use crate::error::InvokeError;

/// `application/json` via serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, value: &Value) -> Result<Bytes, InvokeError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| InvokeError::Codec(e.to_string()))
    }

    fn decode(&self, body: &[u8]) -> Result<Value, InvokeError> {
        serde_json::from_slice(body).map_err(|e| InvokeError::Codec(e.to_string()))
    }
}

/// `text/plain`. Encodes string values verbatim; other values use their JSON
/// rendering. Decoding always yields a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn content_type(&self) -> &'static str {
        "text/plain"
    }

    fn encode(&self, value: &Value) -> Result<Bytes, InvokeError> {
        match value {
            Value::String(s) => Ok(Bytes::from(s.clone())),
            other => Ok(Bytes::from(other.to_string())),
        }
    }

    fn decode(&self, body: &[u8]) -> Result<Value, InvokeError> {
        std::str::from_utf8(body)
            .map(|s| Value::String(s.to_string()))
            .map_err(|e| InvokeError::Codec(e.to_string()))
    }
}
