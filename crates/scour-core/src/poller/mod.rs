//! Deletion confirmation: poll `is_deleted` until the backend agrees.

pub mod handler;
pub mod types;

pub use handler::{MAX_CONSECUTIVE_ERRORS, wait_until_deleted};
pub use types::{DeletionOutcome, PollSettings};
