//! The Body Encoder.
//!
//! | Encoding | Result |
//! |----------|--------|
//! | `none` | no body (length absent), or an empty present body if the method declares one |
//! | `form` | `field` pairs in declared order, then `fieldMap` entries in map order; nulls skipped; zero pairs give an empty present body (length 0) |
//! | `structuredBody` | the single `body` argument serialised by the [`BodyCodec`] |

use bytes::Bytes;
use serde_json::Value;

use crate::arguments::{effective, kind, null, Effective};
use crate::{Args, BodyCodec, BodyEncoding, InvocationError, MethodDescriptor, ParamRole};

/// `Content-Type` of form-encoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An encoded request body and its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    /// Encoded payload.
    pub bytes: Bytes,
    /// Media type, when the encoding defines one.
    pub content_type: Option<String>,
}

impl RequestBody {
    /// A present body with no content and no media type.
    pub fn empty() -> Self {
        Self {
            bytes: Bytes::new(),
            content_type: None,
        }
    }

    /// Length of the payload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Builds the request body of one call.
///
/// # Errors
///
/// Fails if the `body` argument is null, if an argument has the wrong shape
/// for its role, or if the codec cannot serialise the body.
pub fn build_body(
    d: &MethodDescriptor,
    args: &Args,
    codec: &dyn BodyCodec,
) -> Result<Option<RequestBody>, InvocationError> {
    match d.encoding {
        BodyEncoding::None => Ok(d.empty_body.then(RequestBody::empty)),
        BodyEncoding::Form => {
            let encoded = encode_form(d, args)?;
            Ok(Some(RequestBody {
                bytes: Bytes::from(encoded),
                content_type: Some(FORM_CONTENT_TYPE.to_owned()),
            }))
        }
        BodyEncoding::StructuredBody => {
            let Some(p) = d.body_param() else {
                return Ok(None);
            };
            let value = match effective(d, p, args)? {
                Effective::Null => return Err(null(d, p)),
                Effective::Text(s) => Value::String(s.into_owned()),
                Effective::Json(v) => v.clone(),
                Effective::List(items) => Value::Array(
                    items
                        .iter()
                        .map(|i| i.clone().map_or(Value::Null, Value::String))
                        .collect(),
                ),
                Effective::Map(pairs) => Value::Object(
                    pairs
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect(),
                ),
            };
            let bytes = codec.encode(&value)?;
            Ok(Some(RequestBody {
                bytes,
                content_type: Some(codec.content_type().to_owned()),
            }))
        }
    }
}

fn encode_form(d: &MethodDescriptor, args: &Args) -> Result<String, InvocationError> {
    let mut pairs = Vec::new();

    for p in d.params_with(ParamRole::Field) {
        let value = effective(d, p, args)?;
        if let Effective::Map(_) = value {
            return Err(kind(d, p, "a single value or a list"));
        }
        let name = encode_form_component(p.name_str());
        for v in value.values(d, p)? {
            pairs.push(format!("{name}={}", encode_form_component(&v)));
        }
    }

    for p in d.params_with(ParamRole::FieldMap) {
        match effective(d, p, args)? {
            Effective::Null => {}
            Effective::Map(entries) => {
                for (k, v) in entries {
                    pairs.push(format!(
                        "{}={}",
                        encode_form_component(k),
                        encode_form_component(v)
                    ));
                }
            }
            Effective::Json(Value::Object(entries)) => {
                for (k, v) in entries {
                    let v = match v {
                        Value::Null => continue,
                        Value::String(s) => s.clone(),
                        Value::Array(_) | Value::Object(_) => {
                            return Err(kind(d, p, "a map of scalar values"))
                        }
                        other => other.to_string(),
                    };
                    pairs.push(format!(
                        "{}={}",
                        encode_form_component(k),
                        encode_form_component(&v)
                    ));
                }
            }
            _ => return Err(kind(d, p, "a map")),
        }
    }

    Ok(pairs.join("&"))
}

/// Form-encodes one key or value: space becomes `+`, everything outside the
/// unreserved set is percent-escaped (`!` → `%21`, `+` → `%2B`, `/` → `%2F`).
pub fn encode_form_component(value: &str) -> String {
    // Spaces are the only source of "%20" in the encoded output.
    urlencoding::encode(value).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{args, resolve, Arg, CodecError, MethodMetadata};

    struct EchoCodec;

    impl BodyCodec for EchoCodec {
        fn content_type(&self) -> &str {
            "application/json"
        }

        fn encode(&self, value: &Value) -> Result<Bytes, CodecError> {
            Ok(Bytes::from(value.to_string()))
        }

        fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
            serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
                message: e.to_string(),
            })
        }
    }

    fn body_for(meta: MethodMetadata, args: Args) -> Result<Option<RequestBody>, InvocationError> {
        build_body(&resolve(&meta).unwrap(), &args, &EchoCodec)
    }

    fn form(meta: MethodMetadata, args: Args) -> String {
        let body = body_for(meta, args).unwrap().unwrap();
        String::from_utf8(body.bytes.to_vec()).unwrap()
    }

    #[test]
    fn no_encoding_means_no_body() {
        let meta = MethodMetadata::post("ping", "ping");
        assert_eq!(body_for(meta, Args::new()).unwrap(), None);
    }

    #[test]
    fn declared_empty_body_is_present_with_zero_length() {
        let meta = MethodMetadata::post("ping", "ping").empty_body();
        let body = body_for(meta, Args::new()).unwrap().unwrap();
        assert_eq!(body.len(), 0);
    }

    #[test]
    fn null_field_is_skipped() {
        let meta = MethodMetadata::post("submit", "submit")
            .form_encoded()
            .field("arg1")
            .field("czp");
        let body = body_for(meta, args!["01", Option::<&str>::None])
            .unwrap()
            .unwrap();
        assert_eq!(&body.bytes[..], b"arg1=01");
        assert_eq!(body.len(), 7);
        assert_eq!(body.content_type.as_deref(), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn remaining_fields_keep_declared_order() {
        let meta = MethodMetadata::post("submit", "submit")
            .form_encoded()
            .field("a")
            .field("b")
            .field("c");
        assert_eq!(
            form(meta, args!["1", Option::<&str>::None, "3"]),
            "a=1&c=3"
        );
    }

    #[test]
    fn all_null_fields_give_empty_present_body() {
        let meta = MethodMetadata::post("submit", "submit")
            .form_encoded()
            .field("a");
        let body = body_for(meta, args![Option::<&str>::None]).unwrap().unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn form_encoding_escapes_reserved_characters() {
        let meta = MethodMetadata::post("submit", "submit")
            .form_encoded()
            .field("q");
        assert_eq!(form(meta, args!["a b!+/"]), "q=a+b%21%2B%2F");
    }

    #[test]
    fn field_maps_follow_discrete_fields() {
        let meta = MethodMetadata::post("submit", "submit")
            .form_encoded()
            .field_map()
            .field("first");
        let mut map = BTreeMap::new();
        map.insert("k 1".to_owned(), "v/1".to_owned());
        map.insert("k2".to_owned(), "v2".to_owned());
        assert_eq!(
            form(meta, args![map, "x"]),
            "first=x&k+1=v%2F1&k2=v2"
        );
    }

    #[test]
    fn field_map_rejects_scalars() {
        let meta = MethodMetadata::post("submit", "submit")
            .form_encoded()
            .field_map();
        assert!(matches!(
            body_for(meta, args!["oops"]).unwrap_err(),
            InvocationError::ArgumentKind {
                role: ParamRole::FieldMap,
                ..
            }
        ));
    }

    #[test]
    fn structured_body_goes_through_the_codec() {
        let meta = MethodMetadata::post("create", "items")
            .structured_body()
            .body();
        let value = serde_json::json!({ "name": "courier" });
        let body = body_for(meta, args![value.clone()]).unwrap().unwrap();
        assert_eq!(body.bytes, Bytes::from(value.to_string()));
        assert_eq!(body.len(), value.to_string().len());
        assert_eq!(body.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn structured_body_rejects_null() {
        let meta = MethodMetadata::post("create", "items")
            .structured_body()
            .body();
        assert!(matches!(
            body_for(meta, args![Arg::Null]).unwrap_err(),
            InvocationError::NullArgument {
                role: ParamRole::Body,
                ..
            }
        ));
    }
}
