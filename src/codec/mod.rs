//! Payload codecs.
//!
//! # Data Flow
//! ```text
//! serde_json::Value ──encode──▶ Bytes (request body)
//! Bytes (response body) ──decode──▶ serde_json::Value
//! ```
//!
//! # Design Decisions
//! - Codecs are keyed by content type in a [`CodecMap`]
//! - The default map is built once per process and cloned into each client;
//!   clones share the codec instances
//! - The client never picks a codec on its own; callers look one up from the
//!   resolved configuration when they need to (de)serialize

pub mod json;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;

use crate::error::InvokeError;

pub use json::{JsonCodec, TextCodec};

/// Encodes and decodes message bodies for one content type.
pub trait Codec: Send + Sync {
    /// MIME type this codec produces and accepts.
    fn content_type(&self) -> &'static str;

    /// Serialize a value into a body.
    fn encode(&self, value: &serde_json::Value) -> Result<Bytes, InvokeError>;

    /// Deserialize a body into a value.
    fn decode(&self, body: &[u8]) -> Result<serde_json::Value, InvokeError>;
}

/// Content type → codec mapping.
#[derive(Clone, Default)]
pub struct CodecMap {
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl CodecMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` under its own content type, replacing any previous one.
    pub fn register(&mut self, codec: Arc<dyn Codec>) {
        self.codecs.insert(codec.content_type().to_string(), codec);
    }

    /// Look up a codec by content type. Parameters such as `; charset=utf-8`
    /// are ignored.
    pub fn get(&self, content_type: &str) -> Option<Arc<dyn Codec>> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.codecs.get(&essence).cloned()
    }

    /// Registered content types, sorted.
    pub fn content_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl fmt::Debug for CodecMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecMap")
            .field("content_types", &self.content_types())
            .finish()
    }
}

static DEFAULT_CODECS: OnceLock<CodecMap> = OnceLock::new();

/// The process-wide default codec map (JSON and plain text).
pub fn default_codecs() -> CodecMap {
    DEFAULT_CODECS
        .get_or_init(|| {
            let mut map = CodecMap::new();
            map.register(Arc::new(JsonCodec));
            map.register(Arc::new(TextCodec));
            map
        })
        .clone()
}
