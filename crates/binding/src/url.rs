//! The Path/Query Builder.
//!
//! Produces the final target URL for one call:
//!
//! 1. A non-null `url` argument is taken verbatim as the target; otherwise the
//!    service base URL is joined with the path template.
//! 2. `{name}` placeholders are replaced by their `path` arguments. Slashes in
//!    a path argument are kept, so one argument may span several segments.
//!    Placeholders after a literal `?` are encoded as query components.
//! 3. Non-null `query` arguments are appended as `name=value` pairs in
//!    declared order, with component encoding (`!` becomes `%21`). Null query
//!    arguments leave no trace; with none left there is no `?` either.

use std::borrow::Cow;

use crate::arguments::{effective, kind, null, Effective};
use crate::descriptor::Segment;
use crate::{Args, BaseUrl, InvocationError, MethodDescriptor, ParamRole};

/// Builds the target URL of one call.
///
/// # Errors
///
/// Fails if a `path` argument is null or not a single value, or if an
/// argument violates its parameter's nullability.
pub fn build_url(
    base: &BaseUrl,
    d: &MethodDescriptor,
    args: &Args,
) -> Result<String, InvocationError> {
    let override_url = match d.url_param() {
        Some(p) => effective(d, p, args)?.scalar(d, p)?,
        None => None,
    };

    let mut url = match override_url {
        Some(target) => target.into_owned(),
        None => join(base.as_str(), &expand_path(d, args)?),
    };

    let query = build_query(d, args)?;
    if !query.is_empty() {
        if !url.contains('?') {
            url.push('?');
        } else if !url.ends_with('?') && !url.ends_with('&') {
            url.push('&');
        }
        url.push_str(&query);
    }
    Ok(url)
}

/// Substitutes path arguments into the template.
fn expand_path(d: &MethodDescriptor, args: &Args) -> Result<String, InvocationError> {
    let Some(template) = &d.path else {
        return Ok(String::new());
    };

    let mut out = String::with_capacity(template.as_str().len());
    let mut in_query = false;
    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => {
                in_query |= text.contains('?');
                out.push_str(text);
            }
            Segment::Placeholder(name) => {
                // Resolution guarantees exactly one path parameter per placeholder.
                let Some(p) = d
                    .params_with(ParamRole::Path)
                    .find(|p| p.name_str() == name.as_str())
                else {
                    continue;
                };
                let value = effective(d, p, args)?
                    .scalar(d, p)?
                    .ok_or_else(|| null(d, p))?;
                // Past the `?`, a value must not be able to add its own pairs.
                if in_query {
                    out.push_str(&encode_query_component(&value));
                } else {
                    out.push_str(&encode_path_value(&value));
                }
            }
        }
    }
    Ok(out)
}

fn build_query(d: &MethodDescriptor, args: &Args) -> Result<String, InvocationError> {
    let mut pairs = Vec::new();
    for p in d.params_with(ParamRole::Query) {
        let value = effective(d, p, args)?;
        if let Effective::Map(_) = value {
            return Err(kind(d, p, "a single value or a list"));
        }
        let name = encode_query_component(p.name_str());
        for v in value.values(d, p)? {
            pairs.push(format!("{name}={}", encode_query_component(&v)));
        }
    }
    Ok(pairs.join("&"))
}

/// Joins the base URL and an expanded path with exactly one `/` between them.
fn join(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) if !path.is_empty() => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Percent-encodes a path argument, leaving `/` and the other characters that
/// are legal inside a path (unreserved, sub-delimiters, `:`, `@`) untouched.
pub fn encode_path_value(value: &str) -> Cow<'_, str> {
    let keep = |c: char| {
        c.is_ascii_alphanumeric() || "-._~!$&'()*+,;=:@/".contains(c)
    };
    if value.chars().all(keep) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if keep(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    Cow::Owned(out)
}

/// Percent-encodes a query name or value; only unreserved characters
/// (`A-Z a-z 0-9 - _ . ~`) pass through.
pub fn encode_query_component(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{args, resolve, Arg, HttpMethod, MethodMetadata};

    fn base() -> BaseUrl {
        BaseUrl::parse("https://localhost/").unwrap()
    }

    fn url_for(meta: MethodMetadata, args: Args) -> Result<String, InvocationError> {
        build_url(&base(), &resolve(&meta).unwrap(), &args)
    }

    #[test]
    fn substitutes_path_arguments() {
        let meta = MethodMetadata::get("repos", "users/{user}/repos").path("user");
        assert_eq!(
            url_for(meta, args!["czp3009"]).unwrap(),
            "https://localhost/users/czp3009/repos"
        );
    }

    #[test]
    fn path_arguments_keep_embedded_slashes() {
        let meta = MethodMetadata::get("repos", "user/{p}/repos").path("p");
        assert_eq!(
            url_for(meta, args!["a/b/c"]).unwrap(),
            "https://localhost/user/a/b/c/repos"
        );
    }

    #[test]
    fn placeholders_in_the_template_query_cannot_inject_pairs() {
        let meta = MethodMetadata::get("search", "search/{scope}?x={v}")
            .path("scope")
            .path("v")
            .query("page");
        assert_eq!(
            url_for(meta, args!["a/b", "a&b=c+d", "2"]).unwrap(),
            "https://localhost/search/a/b?x=a%26b%3Dc%2Bd&page=2"
        );
    }

    #[test]
    fn path_arguments_escape_characters_illegal_in_a_path() {
        assert_eq!(encode_path_value("a b?c#d"), "a%20b%3Fc%23d");
        assert_eq!(encode_path_value("x:y@z"), "x:y@z");
    }

    #[test]
    fn appends_query_in_declared_order() {
        let meta = MethodMetadata::get("users", "users")
            .query("param1")
            .query("param2");
        assert_eq!(
            url_for(meta, args!["czp1", "czp2"]).unwrap(),
            "https://localhost/users?param1=czp1&param2=czp2"
        );
    }

    #[test]
    fn null_query_arguments_are_omitted() {
        let meta = MethodMetadata::get("users", "users")
            .query("a")
            .query("b")
            .query("c");
        assert_eq!(
            url_for(meta.clone(), args!["1", Option::<&str>::None, "3"]).unwrap(),
            "https://localhost/users?a=1&c=3"
        );
        assert_eq!(
            url_for(meta, args![Option::<&str>::None, Option::<&str>::None]).unwrap(),
            "https://localhost/users"
        );
    }

    #[test]
    fn query_values_use_component_encoding() {
        let meta = MethodMetadata::get("search", "search").query("q");
        assert_eq!(
            url_for(meta, args!["hi!+/ x"]).unwrap(),
            "https://localhost/search?q=hi%21%2B%2F%20x"
        );
    }

    #[test]
    fn list_query_arguments_repeat_the_name() {
        let meta = MethodMetadata::get("search", "search").query("tag");
        let tags = Arg::List(vec![Some("a".into()), None, Some("b".into())]);
        assert_eq!(
            url_for(meta, Args::new().with(tags)).unwrap(),
            "https://localhost/search?tag=a&tag=b"
        );
    }

    #[test]
    fn template_query_is_extended_with_ampersand() {
        let meta = MethodMetadata::get("search", "search?sort=asc").query("q");
        assert_eq!(
            url_for(meta, args!["x"]).unwrap(),
            "https://localhost/search?sort=asc&q=x"
        );
    }

    #[test]
    fn omitted_arguments_take_their_default() {
        let meta = MethodMetadata::get("search", "search")
            .query("page")
            .default_value("1");
        assert_eq!(
            url_for(meta.clone(), Args::new()).unwrap(),
            "https://localhost/search?page=1"
        );
        assert_eq!(
            url_for(meta, args![Arg::Omitted]).unwrap(),
            "https://localhost/search?page=1"
        );
    }

    #[test]
    fn url_override_replaces_base_and_path() {
        let meta = MethodMetadata::dynamic("fetch", HttpMethod::Get)
            .url()
            .query("q");
        assert_eq!(
            url_for(meta, args!["https://other.example/x/y", "1"]).unwrap(),
            "https://other.example/x/y?q=1"
        );
    }

    #[test]
    fn null_url_override_falls_back_to_base() {
        let meta = MethodMetadata::get("fetch", "").url();
        assert_eq!(
            url_for(meta, args![Option::<&str>::None]).unwrap(),
            "https://localhost/"
        );
    }

    #[test]
    fn null_path_argument_fails() {
        let meta = MethodMetadata::get("repos", "users/{user}").path("user");
        assert!(matches!(
            url_for(meta, args![Option::<&str>::None]).unwrap_err(),
            InvocationError::NullArgument {
                role: ParamRole::Path,
                ..
            }
        ));
    }

    #[test]
    fn required_query_rejects_null() {
        let meta = MethodMetadata::get("search", "search").query("q").required();
        assert!(matches!(
            url_for(meta, args![Option::<&str>::None]).unwrap_err(),
            InvocationError::NullArgument { position: 0, .. }
        ));
    }

    #[test]
    fn join_inserts_single_separator() {
        assert_eq!(join("http://h", "a"), "http://h/a");
        assert_eq!(join("http://h/", "/a"), "http://h/a");
        assert_eq!(join("http://h/", "a"), "http://h/a");
        assert_eq!(join("http://h", ""), "http://h");
    }
}
