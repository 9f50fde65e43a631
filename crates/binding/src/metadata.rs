//! Binding metadata: the declarative description attached to one method.
//!
//! [`MethodMetadata`] is what a client author writes (or loads from a
//! configuration record) to declare an endpoint. It is deliberately
//! unvalidated; [`crate::resolve`] turns it into a checked
//! [`crate::MethodDescriptor`].
//!
//! ```
//! use binding::{BodyEncoding, MethodMetadata};
//!
//! let meta = MethodMetadata::get("list_repos", "users/{user}/repos")
//!     .path("user")
//!     .query("sort");
//! assert_eq!(meta.params.len(), 2);
//! assert_eq!(meta.encoding, BodyEncoding::None);
//! ```

use serde::{Deserialize, Serialize};

use crate::{BodyEncoding, HttpMethod, MethodName, ParamRole, ReturnShape};

/// Declaration of one method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// How the argument participates in the request.
    pub role: ParamRole,

    /// Declared name. Required for `path`, `query`, `field`, and `header`.
    #[serde(default)]
    pub name: Option<String>,

    /// Whether an explicit null is accepted.
    #[serde(default = "default_nullable")]
    pub nullable: bool,

    /// String form of the value used when the caller omits the argument.
    #[serde(default)]
    pub default: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl ParamSpec {
    /// Creates a nullable parameter with no default.
    pub fn new(role: ParamRole, name: Option<String>) -> Self {
        Self {
            role,
            name,
            nullable: true,
            default: None,
        }
    }
}

// ---------------------------------------------------------------------------

/// Declarative endpoint description for one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMetadata {
    /// Method identity within its client.
    pub name: MethodName,

    /// HTTP verb.
    pub verb: HttpMethod,

    /// Path template relative to the base URL, e.g. `users/{user}/repos`.
    ///
    /// `None` for methods whose target is supplied by a `url` parameter.
    #[serde(default)]
    pub path: Option<String>,

    /// Parameters in positional order.
    #[serde(default)]
    pub params: Vec<ParamSpec>,

    /// Body strategy.
    #[serde(default)]
    pub encoding: BodyEncoding,

    /// Caller-facing return shape.
    #[serde(default)]
    pub returns: ReturnShape,

    /// Fixed headers sent on every call.
    #[serde(default)]
    pub headers: Vec<(String, String)>,

    /// Send a present, zero-length body when the encoding is `none`.
    #[serde(default)]
    pub empty_body: bool,
}

macro_rules! verb_constructor {
    ($($fn_name:ident => $verb:ident),* $(,)?) => {
        $(
            #[doc = concat!("Declares a `", stringify!($verb), "` endpoint at `path`.")]
            pub fn $fn_name(name: impl Into<String>, path: impl Into<String>) -> Self {
                Self::new(name, HttpMethod::$verb, Some(path.into()))
            }
        )*
    };
}

impl MethodMetadata {
    /// Declares an endpoint.
    ///
    /// An empty `name` is accepted here and rejected by [`crate::resolve`].
    pub fn new(name: impl Into<String>, verb: HttpMethod, path: Option<String>) -> Self {
        Self {
            name: MethodName::new_unchecked(name),
            verb,
            path,
            params: Vec::new(),
            encoding: BodyEncoding::None,
            returns: ReturnShape::Value,
            headers: Vec::new(),
            empty_body: false,
        }
    }

    verb_constructor! {
        get => Get,
        post => Post,
        put => Put,
        patch => Patch,
        delete => Delete,
        head => Head,
        options => Options,
    }

    /// Declares an endpoint whose full target URL is supplied per call.
    pub fn dynamic(name: impl Into<String>, verb: HttpMethod) -> Self {
        Self::new(name, verb, None)
    }

    fn param(mut self, role: ParamRole, name: Option<&str>) -> Self {
        self.params
            .push(ParamSpec::new(role, name.map(str::to_owned)));
        self
    }

    /// Appends a `path` parameter.
    pub fn path(self, name: &str) -> Self {
        self.param(ParamRole::Path, Some(name))
    }

    /// Appends a `query` parameter.
    pub fn query(self, name: &str) -> Self {
        self.param(ParamRole::Query, Some(name))
    }

    /// Appends a `field` parameter.
    pub fn field(self, name: &str) -> Self {
        self.param(ParamRole::Field, Some(name))
    }

    /// Appends a `fieldMap` parameter.
    pub fn field_map(self) -> Self {
        self.param(ParamRole::FieldMap, None)
    }

    /// Appends a `body` parameter.
    pub fn body(self) -> Self {
        self.param(ParamRole::Body, None)
    }

    /// Appends a `url` parameter that replaces the whole target URL.
    pub fn url(self) -> Self {
        self.param(ParamRole::UrlOverride, None)
    }

    /// Appends a `header` parameter.
    pub fn header(self, name: &str) -> Self {
        self.param(ParamRole::Header, Some(name))
    }

    /// Marks the most recently declared parameter as non-nullable.
    pub fn required(mut self) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.nullable = false;
        }
        self
    }

    /// Sets the default of the most recently declared parameter.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.default = Some(value.into());
        }
        self
    }

    /// Declares form encoding.
    pub fn form_encoded(mut self) -> Self {
        self.encoding = BodyEncoding::Form;
        self
    }

    /// Declares structured-body encoding.
    pub fn structured_body(mut self) -> Self {
        self.encoding = BodyEncoding::StructuredBody;
        self
    }

    /// Declares a present but empty body for a method with no encoding.
    pub fn empty_body(mut self) -> Self {
        self.empty_body = true;
        self
    }

    /// Sets the return shape.
    pub fn returns(mut self, shape: ReturnShape) -> Self {
        self.returns = shape;
        self
    }

    /// Adds a fixed header sent on every call.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
