//! Error types for the Courier binding domain.
//!
//! Two error kinds cross the public API:
//!
//! - [`DescriptorError`]: produced while resolving a method's binding
//!   metadata into a [`crate::MethodDescriptor`]. These are fatal: the method
//!   is declared inconsistently and no call to it can ever succeed.
//! - [`InvocationError`]: produced by one specific call. Always delivered
//!   through that call's own future or handle, never into the invoking frame.
//!
//! [`TransportError`] and [`CodecError`] are the failure vocabularies of the
//! two external collaborators; both fold into [`InvocationError`].
//! [`ConfigError`] covers invalid client configuration at construction time.
//!
//! Every type here is `Clone` because a resolution failure is cached once and
//! handed to every subsequent caller of the same method.

use thiserror::Error;

use crate::{HttpMethod, MethodName, ParamRole};

// ---------------------------------------------------------------------------
// Build-time errors
// ---------------------------------------------------------------------------

/// A method's binding metadata is internally inconsistent.
///
/// Raised exactly once, when the method is first resolved. The resolution
/// result (success or failure) is cached for the lifetime of the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The method was declared with an empty name.
    #[error("method name must not be empty")]
    EmptyMethodName,

    /// The path template contains `{name}` but no `path` parameter is called `name`.
    #[error("{method}: path placeholder '{{{placeholder}}}' has no matching path parameter")]
    UnmatchedPlaceholder {
        method: MethodName,
        placeholder: String,
    },

    /// A `path` parameter names a placeholder that the template does not contain.
    #[error("{method}: path parameter '{name}' does not appear in the path template")]
    UnknownPathParameter { method: MethodName, name: String },

    /// Two `path` parameters claim the same placeholder.
    #[error("{method}: path parameter '{name}' is declared more than once")]
    DuplicatePathParameter { method: MethodName, name: String },

    /// The path template has an unterminated or empty `{}` placeholder.
    #[error("{method}: malformed path template '{template}'")]
    MalformedTemplate { method: MethodName, template: String },

    /// More than one parameter carries the `body` role.
    #[error("{method}: only one body parameter is allowed")]
    MultipleBodyParameters { method: MethodName },

    /// More than one parameter carries the `urlOverride` role.
    #[error("{method}: only one url parameter is allowed")]
    MultipleUrlParameters { method: MethodName },

    /// A `urlOverride` parameter was declared alongside a non-empty path template.
    #[error("{method}: a url parameter cannot be combined with a path template")]
    UrlWithPathTemplate { method: MethodName },

    /// Neither a path template nor a `urlOverride` parameter was declared.
    #[error("{method}: method declares no path template and no url parameter")]
    MissingTarget { method: MethodName },

    /// `field` or `fieldMap` parameters were declared without form encoding.
    #[error("{method}: field parameters require form encoding")]
    FieldWithoutFormEncoding { method: MethodName },

    /// A `body` parameter was declared on a method that is not structured-body encoded.
    #[error("{method}: body parameters require structured-body encoding")]
    BodyWithoutStructuredEncoding { method: MethodName },

    /// Structured-body encoding needs exactly one `body` parameter.
    #[error("{method}: structured-body encoding requires exactly one body parameter, found {found}")]
    BodyCount { method: MethodName, found: usize },

    /// The verb cannot carry a request body.
    #[error("{method}: {verb} requests cannot carry a body")]
    BodyNotAllowed { method: MethodName, verb: HttpMethod },

    /// A header parameter or fixed header has an unusable name.
    #[error("{method}: invalid header name '{name}'")]
    InvalidHeaderName { method: MethodName, name: String },

    /// A parameter whose role requires a name was declared without one.
    #[error("{method}: {role} parameter at position {position} has no name")]
    MissingParameterName {
        method: MethodName,
        position: usize,
        role: ParamRole,
    },
}

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// Failure reported by a [`crate::Transport`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established or was lost.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// The transport gave up waiting for a response.
    #[error("request timed out")]
    Timeout,

    /// The request could not be sent or the response could not be read.
    #[error("protocol error: {message}")]
    Protocol { message: String },
}

/// Failure reported by a [`crate::BodyCodec`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A structured value could not be serialised.
    #[error("failed to encode body: {message}")]
    Encode { message: String },

    /// Response bytes could not be turned into a structured value, or the
    /// structured value did not match the caller's target type.
    #[error("failed to decode body: {message}")]
    Decode { message: String },
}

// ---------------------------------------------------------------------------
// Call-time errors
// ---------------------------------------------------------------------------

/// Failure of one invocation.
///
/// Recoverable by the caller; never affects other in-flight calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The method's descriptor failed to resolve on first use.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// The transport failed to deliver the request or read the response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body codec failed to encode the request or decode the response.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The server answered with a non-success status and the client is
    /// configured to treat that as a failure.
    #[error("server responded with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded as UTF-8.
        body: String,
    },

    /// More arguments were supplied than the method declares.
    #[error("{method}: expected at most {expected} arguments, got {found}")]
    ArgumentCount {
        method: MethodName,
        expected: usize,
        found: usize,
    },

    /// A null reached a parameter that cannot accept one.
    #[error("{method}: argument {position} ({role}) must not be null")]
    NullArgument {
        method: MethodName,
        position: usize,
        role: ParamRole,
    },

    /// An argument's shape does not fit its parameter's role.
    #[error("{method}: argument {position} ({role}) expects {expected}")]
    ArgumentKind {
        method: MethodName,
        position: usize,
        role: ParamRole,
        expected: &'static str,
    },

    /// No method with this name is declared on the client.
    #[error("no method named '{method}' is declared")]
    UnknownMethod { method: String },

    /// The client has been shut down and its transport released.
    #[error("client has been shut down")]
    Closed,
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Client or transport configuration is invalid.
///
/// Produced at construction time; a client never starts with an invalid config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The base URL is not an absolute `http` or `https` URL.
    #[error("invalid base url '{url}': must start with http:// or https://")]
    InvalidBaseUrl { url: String },

    /// A configured header name is empty or contains whitespace.
    #[error("invalid header name '{name}'")]
    InvalidHeader { name: String },

    /// The underlying transport could not be constructed.
    #[error("transport could not be built: {message}")]
    Transport { message: String },
}
