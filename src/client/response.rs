//! Response type populated in place by dispatch.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::codec::Codec;
use crate::error::InvokeError;
use crate::transport::TransportResponse;

/// The rest client's response: status, headers and raw body.
///
/// Callers allocate one per call and pass it to `call`; a status of `0`
/// means nothing has been received yet.
#[derive(Debug, Clone, Default)]
pub struct RestResponse {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl RestResponse {
    /// Build a response directly (tests, fakes).
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn read_body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, InvokeError> {
        serde_json::from_slice(&self.body).map_err(|e| InvokeError::Codec(e.to_string()))
    }

    /// Decode the body with `codec`.
    pub fn decode_with(&self, codec: &dyn Codec) -> Result<serde_json::Value, InvokeError> {
        codec.decode(&self.body)
    }

    pub(crate) fn populate(&mut self, response: TransportResponse) {
        self.status = response.status;
        self.headers = response.headers;
        self.body = response.body;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u32,
    }

    #[test]
    fn test_default_is_empty() {
        let rsp = RestResponse::default();
        assert_eq!(rsp.status_code(), 0);
        assert!(rsp.read_body().is_empty());
    }

    #[test]
    fn test_populate_replaces_everything() {
        let mut rsp = RestResponse::new(200, "stale");
        rsp.populate(TransportResponse {
            status: 201,
            headers: HeaderMap::new(),
            body: Bytes::from_static(br#"{"id":9}"#),
        });
        assert_eq!(rsp.status_code(), 201);
        assert_eq!(rsp.json::<User>().unwrap(), User { id: 9 });
        assert_eq!(rsp.decode_with(&JsonCodec).unwrap()["id"], 9);
    }

    #[test]
    fn test_json_error_is_codec_error() {
        let rsp = RestResponse::new(200, "nope");
        assert!(matches!(rsp.json::<User>(), Err(InvokeError::Codec(_))));
        assert_eq!(rsp.text(), "nope");
    }
}
