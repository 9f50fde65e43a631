//! Pass-through methods: locally supplied implementations that never touch
//! the transport.
//!
//! The engine calls the implementation and hands back whatever it produced,
//! either an immediate value or a suspended computation. It imposes no
//! scheduling of its own and does not wrap failures.

use std::sync::Arc;

use binding::Args;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::ServiceClient;

/// Failure type of local implementations, propagated unmodified.
pub type LocalError = Box<dyn std::error::Error + Send + Sync>;

/// A local implementation. Receives the owning client so it can compose the
/// client's other methods.
pub(crate) type LocalFn = Arc<dyn Fn(ServiceClient, Args) -> DirectValue + Send + Sync>;

/// Result of a pass-through method.
pub enum DirectValue {
    /// The implementation completed synchronously.
    Ready(Result<Value, LocalError>),
    /// The implementation returned a computation that completes when awaited.
    Suspended(BoxFuture<'static, Result<Value, LocalError>>),
}

impl DirectValue {
    /// Wraps an immediate value.
    pub fn ready(value: impl Into<Value>) -> Self {
        Self::Ready(Ok(value.into()))
    }

    /// Wraps an immediate failure.
    pub fn failed(error: impl Into<LocalError>) -> Self {
        Self::Ready(Err(error.into()))
    }

    /// Wraps a suspending computation.
    pub fn suspended<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Result<Value, LocalError>> + Send + 'static,
    {
        Self::Suspended(future.boxed())
    }

    /// Returns `true` if the value is available without awaiting.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Waits for the value, suspending only if the implementation did.
    pub async fn resolve(self) -> Result<Value, LocalError> {
        match self {
            Self::Ready(result) => result,
            Self::Suspended(future) => future.await,
        }
    }
}

impl std::fmt::Debug for DirectValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Suspended(_) => f.write_str("Suspended(..)"),
        }
    }
}
