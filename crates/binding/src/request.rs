//! Request templates: the fully resolved, ready-to-send request of one call.

use bytes::Bytes;

use crate::arguments::{check_count, effective};
use crate::body::build_body;
use crate::url::build_url;
use crate::{
    Args, BodyCodec, ClientConfig, HttpMethod, InvocationError, MethodDescriptor, ParamRole,
};

/// One invocation's request.
///
/// Built fresh for every call, never mutated afterwards, and handed to the
/// transport exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl RequestTemplate {
    /// Assembles a template from already-resolved parts.
    pub fn new(
        method: HttpMethod,
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Option<Bytes>,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            body,
        }
    }

    /// Builds the request for calling `d` with `args`.
    ///
    /// Headers are emitted in this order: configured defaults, the method's
    /// fixed headers, `Content-Type` (when the body defines one and no earlier
    /// header set it), then `header` arguments in declared order.
    ///
    /// # Errors
    ///
    /// Any argument or codec failure for this call.
    pub fn build(
        config: &ClientConfig,
        d: &MethodDescriptor,
        args: &Args,
        codec: &dyn BodyCodec,
    ) -> Result<Self, InvocationError> {
        check_count(d, args)?;

        let url = build_url(&config.base_url, d, args)?;
        let body = build_body(d, args, codec)?;

        let mut headers: Vec<(String, String)> = config
            .default_headers
            .iter()
            .chain(d.headers.iter())
            .cloned()
            .collect();

        if let Some(content_type) = body.as_ref().and_then(|b| b.content_type.clone()) {
            let already_set = headers
                .iter()
                .any(|(k, _)| k.eq_ignore_ascii_case("content-type"));
            if !already_set {
                headers.push(("Content-Type".to_owned(), content_type));
            }
        }

        for p in d.params_with(ParamRole::Header) {
            let name = p.name_str();
            for value in effective(d, p, args)?.values(d, p)? {
                headers.push((name.to_owned(), value.into_owned()));
            }
        }

        Ok(Self {
            method: d.verb,
            url,
            headers,
            body: body.map(|b| b.bytes),
        })
    }

    /// HTTP verb.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Fully resolved target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers in emission order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body payload, or `None` when the request carries no body.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Body length; `None` (absent) is distinct from `Some(0)` (present but empty).
    pub fn content_length(&self) -> Option<usize> {
        self.body.as_ref().map(Bytes::len)
    }

    /// Splits the template into its parts for a transport to consume.
    pub fn into_parts(self) -> (HttpMethod, String, Vec<(String, String)>, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{args, resolve, CodecError, MethodMetadata};

    struct NullCodec;

    impl BodyCodec for NullCodec {
        fn content_type(&self) -> &str {
            "application/json"
        }

        fn encode(&self, _value: &serde_json::Value) -> Result<Bytes, CodecError> {
            Ok(Bytes::from_static(b"{}"))
        }

        fn decode(&self, _bytes: &[u8]) -> Result<serde_json::Value, CodecError> {
            Ok(serde_json::Value::Null)
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("https://localhost/").unwrap()
    }

    fn build(meta: MethodMetadata, args: Args) -> Result<RequestTemplate, InvocationError> {
        RequestTemplate::build(&config(), &resolve(&meta).unwrap(), &args, &NullCodec)
    }

    #[test]
    fn absent_body_differs_from_empty_form() {
        let none = build(MethodMetadata::get("list", "items"), Args::new()).unwrap();
        assert_eq!(none.content_length(), None);

        let meta = MethodMetadata::post("submit", "items")
            .form_encoded()
            .field("a");
        let empty = build(meta, args![Option::<&str>::None]).unwrap();
        assert_eq!(empty.content_length(), Some(0));
    }

    #[test]
    fn headers_follow_documented_order() {
        let cfg = config().with_default_header("User-Agent", "courier");
        let meta = MethodMetadata::post("create", "items")
            .with_header("Accept", "application/json")
            .structured_body()
            .body()
            .header("X-Trace")
            .header("X-Skipped");
        let d = resolve(&meta).unwrap();
        let req = RequestTemplate::build(
            &cfg,
            &d,
            &args![serde_json::json!({}), "abc", Option::<&str>::None],
            &NullCodec,
        )
        .unwrap();

        let names: Vec<&str> = req.headers().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["User-Agent", "Accept", "Content-Type", "X-Trace"]);
        assert_eq!(req.header("x-trace"), Some("abc"));
    }

    #[test]
    fn explicit_content_type_is_not_overridden() {
        let meta = MethodMetadata::post("create", "items")
            .with_header("Content-Type", "application/vnd.custom+json")
            .structured_body()
            .body();
        let req = build(meta, args![serde_json::json!(1)]).unwrap();
        assert_eq!(req.header("content-type"), Some("application/vnd.custom+json"));
        assert_eq!(
            req.headers()
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
    }

    #[test]
    fn too_many_arguments_fail() {
        let err = build(MethodMetadata::get("list", "items"), args!["extra"]).unwrap_err();
        assert!(matches!(
            err,
            InvocationError::ArgumentCount {
                expected: 0,
                found: 1,
                ..
            }
        ));
    }
}
