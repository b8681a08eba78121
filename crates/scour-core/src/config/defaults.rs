//! Built-in fallback values for configuration accessors.

/// Generic deletion confirmation timeout.
pub const DELETION_TIMEOUT_SECS: u64 = 600;

/// Generic pause between status checks.
pub const DELETION_POLL_INTERVAL_SECS: u64 = 1;

/// A delete call is tried this many times on transient backend errors.
pub const DELETE_MAX_ATTEMPTS: u32 = 3;

pub const DELETE_RETRY_INTERVAL_SECS: u64 = 1;

/// Confirmation timeout while deleting images.
pub const IMAGE_DELETE_TIMEOUT_SECS: u64 = 120;

pub const IMAGE_DELETE_POLL_INTERVAL_SECS: u64 = 1;
