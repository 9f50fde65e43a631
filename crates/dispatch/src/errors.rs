//! Errors raised while assembling a [`crate::ServiceClient`].
//!
//! Call-time failures use [`binding::InvocationError`]; this module only
//! covers the one-time construction step.

use binding::{ConfigError, DescriptorError, MethodName};
use thiserror::Error;

/// The client could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The supplied configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An endpoint failed eager resolution.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Two methods were declared with the same name.
    #[error("method '{method}' is declared more than once")]
    DuplicateMethod { method: MethodName },

    /// A method was declared with an empty name.
    #[error("method names must not be empty")]
    EmptyMethodName,
}
