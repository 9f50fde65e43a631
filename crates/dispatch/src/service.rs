//! Generated service clients.
//!
//! A [`ServiceClient`] is what a declared interface becomes: a
//! [`ServiceDescriptor`] (configuration, transport, codec) plus a fixed table
//! of methods. Clients are cheap to clone; clones share the descriptor, the
//! method table, and the transport.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use binding::{
    Args, BodyCodec, ClientConfig, DescriptorError, MethodDescriptor, MethodMetadata, MethodName,
    Transport,
};
use serde_json::Value;
use tracing::info;

use crate::local::{DirectValue, LocalError, LocalFn};
use crate::table::{EndpointSlot, MethodEntry, MethodTable};
use crate::BuildError;

// ---------------------------------------------------------------------------
// Service descriptor
// ---------------------------------------------------------------------------

/// Identity of one generated client: its configuration and collaborators.
///
/// Created once when the client is built and never modified.
pub struct ServiceDescriptor {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    codec: Arc<dyn BodyCodec>,
}

impl ServiceDescriptor {
    /// Client configuration, including the base URL.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The transport every endpoint call is sent through.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// The codec used for structured bodies and response decoding.
    pub fn codec(&self) -> &Arc<dyn BodyCodec> {
        &self.codec
    }
}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub(crate) struct ClientInner {
    pub(crate) service: ServiceDescriptor,
    pub(crate) methods: MethodTable,
    pub(crate) closed: AtomicBool,
}

/// A generated client.
///
/// Call methods with [`ServiceClient::invoke`]. Release the transport with
/// [`ServiceClient::shutdown`].
#[derive(Clone)]
pub struct ServiceClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl ServiceClient {
    /// Starts declaring a client.
    pub fn builder(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        codec: Arc<dyn BodyCodec>,
    ) -> ClientBuilder {
        ClientBuilder {
            config,
            transport,
            codec,
            methods: Vec::new(),
        }
    }

    /// The client's service descriptor.
    pub fn service(&self) -> &ServiceDescriptor {
        &self.inner.service
    }

    /// Declared method names in sorted order.
    pub fn method_names(&self) -> Vec<&str> {
        self.inner
            .methods
            .names()
            .into_iter()
            .map(MethodName::as_str)
            .collect()
    }

    /// Returns the resolved descriptor of an endpoint method.
    ///
    /// `None` if no endpoint with that name exists. Resolves the method if
    /// this is its first use.
    pub fn descriptor(&self, method: &str) -> Option<Result<Arc<MethodDescriptor>, DescriptorError>> {
        match self.inner.methods.get(method)? {
            MethodEntry::Endpoint(slot) => Some(slot.descriptor()),
            MethodEntry::Local(_) => None,
        }
    }

    /// Resolves every endpoint descriptor now instead of on first call.
    ///
    /// # Errors
    ///
    /// The first [`DescriptorError`] found, in method-name order.
    pub fn resolve_all(&self) -> Result<(), DescriptorError> {
        self.inner.methods.resolve_all()
    }

    /// Returns `true` once [`ServiceClient::shutdown`] has run.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Releases the transport.
    ///
    /// The transport's own shutdown runs exactly once no matter how many
    /// clones call this. Endpoint calls made afterwards fail with
    /// [`binding::InvocationError::Closed`]; pass-through methods keep working.
    pub async fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(base_url = %self.inner.service.config.base_url, "shutting down client");
        self.inner.service.transport.shutdown().await;
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.inner.service)
            .field("methods", &self.method_names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

enum Declared {
    Endpoint(MethodMetadata),
    Local(String, LocalFn),
}

/// Declares the methods of a [`ServiceClient`].
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    codec: Arc<dyn BodyCodec>,
    methods: Vec<Declared>,
}

impl ClientBuilder {
    /// Declares an endpoint method.
    pub fn endpoint(mut self, metadata: MethodMetadata) -> Self {
        self.methods.push(Declared::Endpoint(metadata));
        self
    }

    /// Declares several endpoint methods, e.g. loaded from a configuration record.
    pub fn endpoints(mut self, metadata: impl IntoIterator<Item = MethodMetadata>) -> Self {
        self.methods
            .extend(metadata.into_iter().map(Declared::Endpoint));
        self
    }

    /// Declares a pass-through method served by `implementation`.
    pub fn local<F>(mut self, name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(ServiceClient, Args) -> DirectValue + Send + Sync + 'static,
    {
        self.methods
            .push(Declared::Local(name.into(), Arc::new(implementation)));
        self
    }

    /// Declares a pass-through method whose implementation suspends.
    pub fn local_async<F, Fut>(self, name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(ServiceClient, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, LocalError>> + Send + 'static,
    {
        self.local(name, move |client, args| {
            DirectValue::suspended(implementation(client, args))
        })
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - [`BuildError::Config`] if the configuration does not validate.
    /// - [`BuildError::DuplicateMethod`] / [`BuildError::EmptyMethodName`] for
    ///   clashing or empty method names.
    /// - [`BuildError::Descriptor`] if eager resolution is enabled and an
    ///   endpoint is inconsistent.
    pub fn build(self) -> Result<ServiceClient, BuildError> {
        self.config.validate()?;

        let mut methods = MethodTable::default();
        for declared in self.methods {
            let (name, entry) = match declared {
                Declared::Endpoint(metadata) => (
                    metadata.name.as_str().to_owned(),
                    MethodEntry::Endpoint(EndpointSlot::new(metadata)),
                ),
                Declared::Local(name, implementation) => (name, MethodEntry::Local(implementation)),
            };
            let name = MethodName::new(name).ok_or(BuildError::EmptyMethodName)?;
            if !methods.insert(name.clone(), entry) {
                return Err(BuildError::DuplicateMethod { method: name });
            }
        }

        if self.config.eager_resolution {
            methods.resolve_all()?;
        }

        Ok(ServiceClient {
            inner: Arc::new(ClientInner {
                service: ServiceDescriptor {
                    config: self.config,
                    transport: self.transport,
                    codec: self.codec,
                },
                methods,
                closed: AtomicBool::new(false),
            }),
        })
    }
}
