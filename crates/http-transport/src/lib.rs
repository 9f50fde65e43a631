//! Courier HTTP infrastructure adapter.
//!
//! Provides the production collaborators a `dispatch::ServiceClient` is
//! built with:
//!
//! | Type | Implements | Backed by |
//! |------|------------|-----------|
//! | [`ReqwestTransport`] | [`binding::Transport`] | `reqwest` connection pool |
//! | [`JsonCodec`] | [`binding::BodyCodec`] | `serde_json` |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Sockets, TLS, timeouts and the JSON wire format live
//! here. The [`binding`] and `dispatch` crates see only the two traits.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::sync::Arc;
//!
//! use binding::{args, ClientConfig, MethodMetadata};
//! use dispatch::ServiceClient;
//! use http_transport::{HttpTransportConfig, JsonCodec, ReqwestTransport};
//!
//! let transport = ReqwestTransport::new(&HttpTransportConfig::default())?;
//! let client = ServiceClient::builder(
//!     ClientConfig::new("https://api.github.com/")?,
//!     Arc::new(transport),
//!     Arc::new(JsonCodec),
//! )
//! .endpoint(MethodMetadata::get("repos", "users/{user}/repos").path("user"))
//! .build()?;
//!
//! if let Some(response) = client.invoke("repos", args!["czp3009"])?.into_response() {
//!     let repos = response.await?;
//!     println!("{repos}");
//! }
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod codec;
mod config;
mod transport;

pub use codec::{JsonCodec, JSON_CONTENT_TYPE};
pub use config::HttpTransportConfig;
pub use transport::ReqwestTransport;
