//! Cleanup orchestration: walk the registry in deletion order and tear down
//! every resource each kind can see in the scope.

pub mod errors;
pub mod handler;
pub mod operations;
pub mod types;

pub use errors::CleanupError;
pub use handler::Cleanup;
pub use types::{
    CleanupReport, CleanupScope, KindFilter, KindReport, KindStatus, OutcomeCounts,
    ResourceReport,
};
