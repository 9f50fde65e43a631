//! The Dispatcher: routes one call to the transport or to a local
//! implementation and hands the outcome to the Return Adapter.
//!
//! The dispatcher keeps no per-call state of its own. Everything one call
//! needs lives in that call's [`RequestTemplate`] and the future built
//! around it.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use binding::{
    Args, InvocationError, InvocationId, MethodDescriptor, RequestTemplate, ReturnShape,
};
use futures::FutureExt;
use tracing::{debug, debug_span, warn, Instrument};

use crate::adapter::{self, Exchange, Invocation};
use crate::table::{EndpointSlot, MethodEntry};
use crate::ServiceClient;

impl ServiceClient {
    /// Calls a declared method.
    ///
    /// Endpoint methods return immediately with a handle or future; nothing is
    /// sent until the caller awaits it. Every failure of an endpoint call,
    /// including descriptor resolution and argument errors, is delivered
    /// through that handle. Pass-through methods are called right away and
    /// their result is returned as [`Invocation::Direct`].
    ///
    /// # Errors
    ///
    /// [`InvocationError::UnknownMethod`] if no method has this name.
    pub fn invoke(&self, method: &str, args: Args) -> Result<Invocation, InvocationError> {
        let entry = self
            .inner
            .methods
            .get(method)
            .ok_or_else(|| InvocationError::UnknownMethod {
                method: method.to_owned(),
            })?;

        match entry {
            MethodEntry::Local(implementation) => {
                debug!(method, "forwarding to local implementation");
                Ok(Invocation::Direct(implementation(self.clone(), args)))
            }
            MethodEntry::Endpoint(slot) => Ok(self.dispatch(slot, args)),
        }
    }

    fn dispatch(&self, slot: &EndpointSlot, args: Args) -> Invocation {
        let service = &self.inner.service;
        let invocation = InvocationId::new_random();
        let span = debug_span!("invoke", method = %slot.metadata().name, %invocation);

        let prepared = span.in_scope(|| self.prepare(slot, &args));
        let inner = Arc::clone(&self.inner);
        let exchange: Exchange = async move {
            let request = prepared?;
            // The client may have shut down between invoke and the first poll.
            if inner.closed.load(Ordering::Acquire) {
                return Err(InvocationError::Closed);
            }
            let transport = inner.service.transport();
            debug!(verb = %request.method(), url = request.url(), "sending request");
            transport.send(request).await.map_err(|e| {
                warn!(error = %e, "transport failed");
                InvocationError::from(e)
            })
        }
        .instrument(span)
        .boxed();

        let policy = service.config().status_policy;
        match slot.metadata().returns {
            ReturnShape::Completion => Invocation::Completion(adapter::completion(exchange, policy)),
            ReturnShape::Value => Invocation::Value(adapter::single_value(
                exchange,
                policy,
                Arc::clone(service.codec()),
            )),
        }
    }

    /// Resolves the descriptor and builds this call's request.
    fn prepare(&self, slot: &EndpointSlot, args: &Args) -> Result<RequestTemplate, InvocationError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(InvocationError::Closed);
        }
        let descriptor: Arc<MethodDescriptor> = slot.descriptor()?;
        let service = &self.inner.service;
        RequestTemplate::build(service.config(), &descriptor, args, service.codec().as_ref())
            .inspect_err(|e| debug!(error = %e, "request could not be built"))
    }
}
