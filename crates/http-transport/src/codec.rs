//! JSON body codec.

use binding::{BodyCodec, CodecError};
use bytes::Bytes;
use serde_json::Value;

/// Media type written by [`JsonCodec`].
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Encodes structured bodies and decodes responses as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl BodyCodec for JsonCodec {
    fn content_type(&self) -> &str {
        JSON_CONTENT_TYPE
    }

    fn encode(&self, value: &Value) -> Result<Bytes, CodecError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode {
                message: e.to_string(),
            })
    }

    /// Whitespace-only input decodes to `null`.
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn encodes_compact_json() {
        let bytes = JsonCodec.encode(&json!({"name": "widget", "tags": [1, 2]})).unwrap();
        assert_eq!(&bytes[..], br#"{"name":"widget","tags":[1,2]}"#);
    }

    #[test]
    fn decodes_objects() {
        let value = JsonCodec.decode(br#"{"id": 7}"#).unwrap();
        assert_eq!(value, json!({"id": 7}));
    }

    #[test]
    fn blank_input_is_null() {
        assert_eq!(JsonCodec.decode(b""), Ok(Value::Null));
        assert_eq!(JsonCodec.decode(b" \r\n"), Ok(Value::Null));
    }

    #[test]
    fn malformed_input_is_a_decode_error() {
        assert!(matches!(
            JsonCodec.decode(b"{not json"),
            Err(CodecError::Decode { .. })
        ));
    }

    #[test]
    fn advertises_json_media_type() {
        assert_eq!(JsonCodec.content_type(), "application/json");
    }
}
