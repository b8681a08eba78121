//! Narrow contract the cleanup core needs from every backend family.
//!
//! Concrete SDK bindings live outside this crate. A backend only has to
//! expose list/get/delete plus a handful of [`Action`]s, and an identity
//! handle ([`Session`]) that resolves a client per service family.

pub mod errors;
pub mod traits;
pub mod types;

pub use errors::BackendError;
pub use traits::{ServiceClient, Session};
pub use types::{Action, ListQuery, Page, Record, service_types};
