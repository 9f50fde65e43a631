//! Courier dispatch engine.
//!
//! Turns a set of declared methods into a callable [`ServiceClient`]. Each
//! call is routed one of two ways:
//!
//! - **Endpoint** methods resolve their [`binding::MethodDescriptor`] once
//!   (cached behind a one-time cell), build a fresh
//!   [`binding::RequestTemplate`] from the call's arguments, send it through
//!   the injected [`binding::Transport`], and adapt the outcome into a
//!   [`CompletionHandle`] or a [`ResponseFuture`].
//! - **Pass-through** methods go straight to a locally supplied
//!   implementation; the transport is never involved and the result comes
//!   back as a [`DirectValue`].
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Request construction rules live in [`binding`];
//! wire I/O lives in `http-transport`. This crate only sequences them.
//!
//! ## Concurrency
//!
//! The engine owns no threads. Clients are `Send + Sync`, descriptors are
//! read-only after their one-time build, and every call owns its request, so
//! concurrent calls need no coordination.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run(transport: std::sync::Arc<dyn binding::Transport>,
//! #              codec: std::sync::Arc<dyn binding::BodyCodec>) -> anyhow::Result<()> {
//! use binding::{args, ClientConfig, MethodMetadata};
//! use dispatch::ServiceClient;
//!
//! let client = ServiceClient::builder(ClientConfig::new("https://localhost/")?, transport, codec)
//!     .endpoint(MethodMetadata::get("repos", "users/{user}/repos").path("user"))
//!     .build()?;
//!
//! let repos: Vec<serde_json::Value> = client
//!     .invoke("repos", args!["czp3009"])?
//!     .into_response()
//!     .expect("repos returns a value")
//!     .decode()
//!     .await?;
//! # let _ = repos;
//! # Ok(())
//! # }
//! ```

mod adapter;
mod dispatcher;
mod errors;
mod local;
mod service;
mod table;

pub use adapter::{CompletionHandle, Invocation, ResponseFuture};
pub use errors::BuildError;
pub use local::{DirectValue, LocalError};
pub use service::{ClientBuilder, ServiceClient, ServiceDescriptor};
