use std::time::Duration;

use crate::clients::BackendError;
use crate::errors::ScourError;

/// Errors raised by a resource manager while listing or deleting.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Failed to list {kind}: {source}")]
    Discovery {
        kind: String,
        #[source]
        source: BackendError,
    },

    #[error("Precondition '{step}' failed for {kind} '{id}': {source}")]
    Precondition {
        kind: String,
        id: String,
        step: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to delete {kind} '{id}': {source}")]
    Delete {
        kind: String,
        id: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to check deletion of {kind} '{id}': {source}")]
    Status {
        kind: String,
        id: String,
        #[source]
        source: BackendError,
    },

    #[error("{kind} '{id}' was not confirmed deleted within {timeout:?}")]
    ConfirmTimeout {
        kind: String,
        id: String,
        timeout: Duration,
    },

    #[error("Confirming deletion of {kind} '{id}' failed: {message}")]
    ConfirmFailed {
        kind: String,
        id: String,
        message: String,
    },

    #[error("Record of {kind} has no usable '{field}' field")]
    MissingField { kind: String, field: String },

    #[error("No {role} identity available for {kind}")]
    NoIdentity { kind: String, role: &'static str },

    #[error("Service '{service}' is not reachable with the {role} identity")]
    NoClient { service: String, role: &'static str },
}

impl ManagerError {
    /// Whether repeating the failed call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ManagerError::Discovery { source, .. }
            | ManagerError::Precondition { source, .. }
            | ManagerError::Delete { source, .. }
            | ManagerError::Status { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

impl ScourError for ManagerError {
    fn error_code(&self) -> &'static str {
        match self {
            ManagerError::Discovery { .. } => "MANAGER_DISCOVERY_FAILED",
            ManagerError::Precondition { .. } => "MANAGER_PRECONDITION_FAILED",
            ManagerError::Delete { .. } => "MANAGER_DELETE_FAILED",
            ManagerError::Status { .. } => "MANAGER_STATUS_CHECK_FAILED",
            ManagerError::ConfirmTimeout { .. } => "MANAGER_CONFIRM_TIMEOUT",
            ManagerError::ConfirmFailed { .. } => "MANAGER_CONFIRM_FAILED",
            ManagerError::MissingField { .. } => "MANAGER_MISSING_FIELD",
            ManagerError::NoIdentity { .. } => "MANAGER_NO_IDENTITY",
            ManagerError::NoClient { .. } => "MANAGER_NO_CLIENT",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ManagerError::NoIdentity { .. })
    }
}
