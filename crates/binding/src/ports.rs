//! Port traits for the two external collaborators.
//!
//! - [`Transport`]: sends one [`RequestTemplate`] and yields the raw response.
//!   Connection handling, TLS, pooling, and any retry policy live behind it.
//! - [`BodyCodec`]: turns structured values into bytes and back. Used only
//!   for structured-body requests and for decoding single-value responses.
//!
//! Structured values are represented as [`serde_json::Value`], the neutral
//! tree form every codec maps to and from.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{CodecError, RequestTemplate, TransportError};

/// Raw outcome of one transport exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in the order received.
    pub headers: Vec<(String, String)>,
    /// Response body bytes (possibly empty).
    pub body: Bytes,
}

impl TransportResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends requests on behalf of a generated client.
///
/// Implementations must be safe to call concurrently; the client shares one
/// transport between all in-flight calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and waits for the complete response.
    async fn send(&self, request: RequestTemplate) -> Result<TransportResponse, TransportError>;

    /// Releases any resources held by the transport.
    ///
    /// Called exactly once, by the owning client's shutdown.
    async fn shutdown(&self) {}
}

/// Serialises request bodies and deserialises response bodies.
pub trait BodyCodec: Send + Sync {
    /// `Content-Type` of bodies produced by [`BodyCodec::encode`].
    fn content_type(&self) -> &str;

    /// Serialises a structured value.
    fn encode(&self, value: &serde_json::Value) -> Result<Bytes, CodecError>;

    /// Deserialises response bytes into a structured value.
    fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value, CodecError>;
}
