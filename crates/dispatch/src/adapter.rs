//! The Return Adapter.
//!
//! Wraps one transport exchange into the caller-facing shape its method
//! declares:
//!
//! | Shape | Type | Resolves to |
//! |-------|------|-------------|
//! | completion | [`CompletionHandle`] | `()` once the exchange finishes |
//! | single value | [`ResponseFuture`] | the decoded response body |
//! | direct (pass-through only) | [`DirectValue`] | the local implementation's value |
//!
//! Adapters are pure transformations: no retries, no timeouts. Both handle
//! types are lazy; the exchange runs when the caller polls, and dropping a
//! handle cancels only that call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use binding::{BodyCodec, CodecError, InvocationError, StatusPolicy, TransportResponse};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::DirectValue;

/// An in-flight transport exchange, including request construction failures.
pub(crate) type Exchange = BoxFuture<'static, Result<TransportResponse, InvocationError>>;

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Completion-only handle. Exposes no decoded value.
#[must_use = "the request is only sent when the handle is awaited"]
pub struct CompletionHandle {
    inner: BoxFuture<'static, Result<(), InvocationError>>,
}

impl CompletionHandle {
    /// Waits for the exchange to finish.
    pub async fn wait(self) -> Result<(), InvocationError> {
        self.await
    }
}

impl Future for CompletionHandle {
    type Output = Result<(), InvocationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl std::fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CompletionHandle(..)")
    }
}

/// Single-value future resolving to the decoded response body.
#[must_use = "the request is only sent when the future is awaited"]
pub struct ResponseFuture {
    inner: BoxFuture<'static, Result<Value, InvocationError>>,
}

impl ResponseFuture {
    /// Resolves the response and converts it into `T`.
    ///
    /// # Errors
    ///
    /// Any failure of the exchange, or [`CodecError::Decode`] if the decoded
    /// value does not match `T`.
    pub async fn decode<T: DeserializeOwned>(self) -> Result<T, InvocationError> {
        let value = self.await?;
        serde_json::from_value(value).map_err(|e| {
            InvocationError::Codec(CodecError::Decode {
                message: e.to_string(),
            })
        })
    }
}

impl Future for ResponseFuture {
    type Output = Result<Value, InvocationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl std::fmt::Debug for ResponseFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResponseFuture(..)")
    }
}

/// What one call to [`crate::ServiceClient::invoke`] produced.
#[derive(Debug)]
pub enum Invocation {
    /// The method returns a completion handle.
    Completion(CompletionHandle),
    /// The method returns a single decoded value.
    Value(ResponseFuture),
    /// The method is a pass-through; this is its local result.
    Direct(DirectValue),
}

impl Invocation {
    /// The completion handle, if this call has that shape.
    pub fn into_completion(self) -> Option<CompletionHandle> {
        match self {
            Self::Completion(handle) => Some(handle),
            _ => None,
        }
    }

    /// The single-value future, if this call has that shape.
    pub fn into_response(self) -> Option<ResponseFuture> {
        match self {
            Self::Value(future) => Some(future),
            _ => None,
        }
    }

    /// The local result, if this call went to a pass-through method.
    pub fn into_direct(self) -> Option<DirectValue> {
        match self {
            Self::Direct(value) => Some(value),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Adaptation
// ---------------------------------------------------------------------------

/// Adapts an exchange into a completion handle.
pub(crate) fn completion(exchange: Exchange, policy: StatusPolicy) -> CompletionHandle {
    let inner = async move {
        let response = exchange.await?;
        check_status(response, policy).map(drop)
    };
    CompletionHandle {
        inner: inner.boxed(),
    }
}

/// Adapts an exchange into a single-value future decoding with `codec`.
pub(crate) fn single_value(
    exchange: Exchange,
    policy: StatusPolicy,
    codec: Arc<dyn BodyCodec>,
) -> ResponseFuture {
    let inner = async move {
        let response = check_status(exchange.await?, policy)?;
        decode_body(codec.as_ref(), &response)
    };
    ResponseFuture {
        inner: inner.boxed(),
    }
}

fn check_status(
    response: TransportResponse,
    policy: StatusPolicy,
) -> Result<TransportResponse, InvocationError> {
    if response.is_success() || policy == StatusPolicy::PassThrough {
        return Ok(response);
    }
    warn!(status = response.status, "request failed with non-success status");
    Err(InvocationError::Status {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

/// An empty body decodes to `null` without consulting the codec.
fn decode_body(
    codec: &dyn BodyCodec,
    response: &TransportResponse,
) -> Result<Value, InvocationError> {
    if response.body.is_empty() {
        return Ok(Value::Null);
    }
    codec.decode(&response.body).map_err(|e| {
        warn!(error = %e, "response body could not be decoded");
        InvocationError::from(e)
    })
}
