//! Core binding domain for Courier, a declarative HTTP client engine.
//!
//! A client author declares each endpoint as [`MethodMetadata`] (verb, path
//! template, parameter roles, body encoding). This crate turns that metadata
//! into validated [`MethodDescriptor`]s and, per call, into a concrete
//! [`RequestTemplate`] ready for a transport.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines the [`Transport`] and [`BodyCodec`] ports; the `http-transport`
//! crate supplies implementations, and the `dispatch` crate drives calls.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`MethodName`, `ParamName`, `InvocationId`) |
//! | [`types`] | Verbs, roles, encodings, return shapes, call arguments |
//! | [`metadata`] | Declarative endpoint metadata and its builder |
//! | [`descriptor`] | The Binding Parser: [`resolve`] and [`MethodDescriptor`] |
//! | [`url`] | The Path/Query Builder |
//! | [`body`] | The Body Encoder |
//! | [`request`] | [`RequestTemplate`] assembly |
//! | [`ports`] | [`Transport`] and [`BodyCodec`] traits |
//! | [`config`] | [`ClientConfig`] and friends |
//! | [`errors`] | Build-time, call-time, collaborator, and configuration errors |
//!
//! ## Example
//!
//! ```
//! use binding::{args, resolve, url::build_url, ClientConfig, MethodMetadata};
//!
//! let config = ClientConfig::new("https://localhost/").unwrap();
//! let repos = resolve(&MethodMetadata::get("repos", "users/{user}/repos").path("user")).unwrap();
//! let url = build_url(&config.base_url, &repos, &args!["czp3009"]).unwrap();
//! assert_eq!(url, "https://localhost/users/czp3009/repos");
//! ```

mod arguments;
pub mod body;
pub mod config;
pub mod descriptor;
pub mod errors;
pub mod identifiers;
pub mod metadata;
pub mod ports;
pub mod request;
pub mod types;
pub mod url;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use body::{build_body, RequestBody, FORM_CONTENT_TYPE};
pub use config::{BaseUrl, ClientConfig, StatusPolicy};
pub use descriptor::{resolve, MethodDescriptor, ParameterBinding, PathTemplate, Segment};
pub use errors::{CodecError, ConfigError, DescriptorError, InvocationError, TransportError};
pub use identifiers::{InvocationId, MethodName, ParamName};
pub use metadata::{MethodMetadata, ParamSpec};
pub use ports::{BodyCodec, Transport, TransportResponse};
pub use request::RequestTemplate;
pub use types::{Arg, Args, BodyEncoding, HttpMethod, ParamRole, ReturnShape};
pub use url::build_url;
