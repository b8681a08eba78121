//! Resource managers: the per-kind unit of work.
//!
//! # Architecture
//!
//! - [`ResourceManager`] - Trait every kind implements (`list`, `identify`,
//!   `name`, `delete`, `is_deleted`)
//! - [`ServiceResource`] - Reusable adapter built from `(service, collection)`
//!   plus a small capability set; most kinds are just a configured adapter
//! - [`capabilities`] - Composable behaviors shared between families
//!   (tenant post-filtering, quota pseudo-resources, name-prefix scoping)
//! - [`kinds`] - Declarative per-family kind tables and their overrides
//! - [`KindContext`] - Binding of one kind to one cleanup scope

pub mod adapter;
pub mod capabilities;
pub mod context;
pub mod errors;
pub mod kinds;
pub mod traits;
pub mod types;

pub use adapter::{DeletionCheck, Pagination, ServiceResource};
pub use context::KindContext;
pub use errors::ManagerError;
pub use traits::ResourceManager;
pub use types::{DeleteStatus, DeletionState, DisplayName, RawResource, ResourceId};
