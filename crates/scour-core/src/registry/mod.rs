//! Registry of cleanable resource kinds.
//!
//! # Architecture
//!
//! - [`ResourceKind`] - Immutable metadata describing one kind
//! - [`Registry`] - Kinds plus their bound [`ResourceManager`](crate::managers::ResourceManager),
//!   kept sorted by deletion order
//! - [`builtin_registry`] - Process-wide registry of every built-in kind
//!
//! Registration happens once at startup. A duplicate `(service, resource)`
//! pair is rejected with [`RegistryError::DuplicateKind`].

pub mod errors;
#[allow(clippy::module_inception)]
pub mod registry;
pub mod types;

pub use errors::RegistryError;
pub use registry::{RegisteredKind, Registry, builtin_registry};
pub use types::{DEFAULT_WORKERS, ResourceKind};
