//! Shared value types for the binding domain.
//!
//! The enums here are the closed vocabularies of binding metadata (verbs,
//! parameter roles, body encodings, return shapes). [`Arg`] and [`Args`] are
//! the call-time side: the values a caller passes to one invocation.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::CodecError;

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

/// HTTP request method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Returns the canonical upper-case token (`"GET"`, `"POST"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Returns `false` for verbs whose requests must not carry a body.
    pub fn permits_body(self) -> bool {
        !matches!(self, Self::Get | Self::Head)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parameter roles and encodings
// ---------------------------------------------------------------------------

/// How a method argument participates in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamRole {
    /// Substituted into a `{name}` placeholder of the path template.
    Path,
    /// Appended to the query string as `name=value`.
    Query,
    /// One `name=value` pair of a form-encoded body.
    Field,
    /// Any number of form pairs, taken from an ordered map.
    FieldMap,
    /// The structured body, handed to the body codec.
    Body,
    /// Replaces the entire target URL.
    #[serde(rename = "url")]
    UrlOverride,
    /// Emitted as a request header.
    Header,
}

impl ParamRole {
    /// Returns `true` if parameters with this role must carry a name.
    pub fn requires_name(self) -> bool {
        matches!(self, Self::Path | Self::Query | Self::Field | Self::Header)
    }
}

impl std::fmt::Display for ParamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Field => "field",
            Self::FieldMap => "field map",
            Self::Body => "body",
            Self::UrlOverride => "url",
            Self::Header => "header",
        };
        f.write_str(s)
    }
}

/// How the request body of a method is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// No body.
    #[default]
    None,
    /// `application/x-www-form-urlencoded` built from `field`/`fieldMap` arguments.
    Form,
    /// The single `body` argument, serialised by the body codec.
    StructuredBody,
}

/// The caller-facing shape an endpoint method returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    /// Completion-only handle; the response body is discarded.
    Completion,
    /// Future resolving to the decoded response body.
    #[default]
    Value,
}

// ---------------------------------------------------------------------------
// Call arguments
// ---------------------------------------------------------------------------

/// One call-time argument.
///
/// Scalars are carried in their string form, which is exactly what ends up on
/// the wire for path, query, field, and header roles.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Arg {
    /// The caller did not supply a value; the parameter's default applies.
    #[default]
    Omitted,
    /// Explicit null.
    Null,
    /// A scalar in its string form.
    Text(String),
    /// Several scalars; a `query` parameter emits one pair per element.
    List(Vec<Option<String>>),
    /// Ordered key/value pairs for a `fieldMap` parameter.
    Map(Vec<(String, String)>),
    /// A structured value for a `body` parameter.
    Json(serde_json::Value),
}

impl Arg {
    /// Serialises any value into a structured [`Arg::Json`] argument.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| CodecError::Encode {
                message: e.to_string(),
            })
    }

    /// Returns `true` for [`Arg::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

macro_rules! display_arg {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

display_arg!(bool, char, i32, i64, u32, u64, usize, f64);

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<String>> for Arg {
    fn from(values: Vec<String>) -> Self {
        Self::List(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for Arg {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(|v| Some(v.to_owned())).collect())
    }
}

impl From<Vec<(String, String)>> for Arg {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::Map(pairs)
    }
}

impl From<BTreeMap<String, String>> for Arg {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::Map(map.into_iter().collect())
    }
}

impl From<HashMap<String, String>> for Arg {
    fn from(map: HashMap<String, String>) -> Self {
        Self::Map(map.into_iter().collect())
    }
}

impl From<serde_json::Value> for Arg {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

// ---------------------------------------------------------------------------

/// The ordered argument list of one call.
///
/// Positions match the declaring method's parameter order. Positions past the
/// end of the list read as [`Arg::Omitted`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Arg>);

static OMITTED: Arg = Arg::Omitted;

impl Args {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an argument, returning the list for chaining.
    pub fn with(mut self, arg: impl Into<Arg>) -> Self {
        self.0.push(arg.into());
        self
    }

    /// Returns the argument at `position`, or [`Arg::Omitted`] past the end.
    pub fn get(&self, position: usize) -> &Arg {
        self.0.get(position).unwrap_or(&OMITTED)
    }

    /// Number of arguments actually supplied.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the supplied arguments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.0.iter()
    }
}

impl From<Vec<Arg>> for Args {
    fn from(args: Vec<Arg>) -> Self {
        Self(args)
    }
}

impl FromIterator<Arg> for Args {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds an [`Args`] list from anything convertible into [`Arg`].
///
/// ```
/// use binding::{args, Arg};
///
/// let a = args!["czp3009", Option::<String>::None, 3];
/// assert_eq!(a.get(1), &Arg::Null);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::Args::from(vec![$($crate::Arg::from($arg)),+])
    };
}
