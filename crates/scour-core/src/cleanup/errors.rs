use crate::errors::ScourError;
use crate::registry::RegistryError;

/// Errors that abort a whole cleanup run.
///
/// Per-resource and per-kind failures never surface here; they are recorded
/// in the [`CleanupReport`](super::CleanupReport).
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("Invalid cleanup scope: {message}")]
    ScopeValidation { message: String },

    #[error("Registry error: {source}")]
    Registry {
        #[from]
        source: RegistryError,
    },
}

impl ScourError for CleanupError {
    fn error_code(&self) -> &'static str {
        match self {
            CleanupError::ScopeValidation { .. } => "CLEANUP_SCOPE_INVALID",
            CleanupError::Registry { .. } => "CLEANUP_REGISTRY_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            CleanupError::ScopeValidation { .. } => true,
            CleanupError::Registry { source } => source.is_user_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_validation_error() {
        let error = CleanupError::ScopeValidation {
            message: "admin cleanup requested without an admin identity".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid cleanup scope: admin cleanup requested without an admin identity"
        );
        assert_eq!(error.error_code(), "CLEANUP_SCOPE_INVALID");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_registry_error_conversion() {
        let error: CleanupError = RegistryError::UnknownKind {
            name: "nebula".to_string(),
        }
        .into();
        assert_eq!(error.error_code(), "CLEANUP_REGISTRY_ERROR");
        assert!(error.is_user_error());
    }
}
