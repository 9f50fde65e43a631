//! The method table: one entry per declared method, fixed at build time.
//!
//! Endpoint entries keep their metadata and a one-time cell holding the
//! resolution outcome. The first call (or [`MethodTable::resolve_all`])
//! fills the cell; every later call reads it without locking.

use std::collections::HashMap;
use std::sync::Arc;

use binding::{resolve, DescriptorError, MethodDescriptor, MethodMetadata, MethodName};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::local::LocalFn;

/// A declared endpoint and its lazily resolved descriptor.
pub(crate) struct EndpointSlot {
    metadata: MethodMetadata,
    descriptor: OnceCell<Result<Arc<MethodDescriptor>, DescriptorError>>,
}

impl EndpointSlot {
    pub(crate) fn new(metadata: MethodMetadata) -> Self {
        Self {
            metadata,
            descriptor: OnceCell::new(),
        }
    }

    pub(crate) fn metadata(&self) -> &MethodMetadata {
        &self.metadata
    }

    /// Resolves on first use; concurrent first callers block until one of
    /// them has finished, then all observe the same outcome.
    pub(crate) fn descriptor(&self) -> Result<Arc<MethodDescriptor>, DescriptorError> {
        self.descriptor
            .get_or_init(|| {
                let outcome = resolve(&self.metadata).map(Arc::new);
                match &outcome {
                    Ok(_) => debug!(method = %self.metadata.name, "descriptor resolved"),
                    Err(e) => debug!(method = %self.metadata.name, error = %e, "descriptor rejected"),
                }
                outcome
            })
            .clone()
    }
}

/// How a declared method is served.
pub(crate) enum MethodEntry {
    /// Built into a request and sent over the transport.
    Endpoint(EndpointSlot),
    /// Forwarded to a local implementation.
    Local(LocalFn),
}

/// Immutable mapping from method name to entry.
#[derive(Default)]
pub(crate) struct MethodTable {
    entries: HashMap<MethodName, MethodEntry>,
}

impl MethodTable {
    /// Inserts an entry, returning `false` if the name is already taken.
    pub(crate) fn insert(&mut self, name: MethodName, entry: MethodEntry) -> bool {
        if self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, entry);
        true
    }

    pub(crate) fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.entries.get(name)
    }

    /// Method names in sorted order.
    pub(crate) fn names(&self) -> Vec<&MethodName> {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        names
    }

    /// Resolves every endpoint, stopping at the first failure (in name order).
    pub(crate) fn resolve_all(&self) -> Result<(), DescriptorError> {
        for name in self.names() {
            if let Some(MethodEntry::Endpoint(slot)) = self.entries.get(name) {
                slot.descriptor()?;
            }
        }
        Ok(())
    }
}
