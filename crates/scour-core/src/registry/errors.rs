use crate::errors::ScourError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Resource kind '{service}.{resource}' is registered more than once")]
    DuplicateKind { service: String, resource: String },

    #[error("Unknown resource kind or service '{name}'")]
    UnknownKind { name: String },
}

impl ScourError for RegistryError {
    fn error_code(&self) -> &'static str {
        match self {
            RegistryError::DuplicateKind { .. } => "REGISTRY_DUPLICATE_KIND",
            RegistryError::UnknownKind { .. } => "REGISTRY_UNKNOWN_KIND",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, RegistryError::UnknownKind { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_kind_display() {
        let error = RegistryError::DuplicateKind {
            service: "nova".to_string(),
            resource: "servers".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Resource kind 'nova.servers' is registered more than once"
        );
        assert_eq!(error.error_code(), "REGISTRY_DUPLICATE_KIND");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_unknown_kind_is_user_error() {
        let error = RegistryError::UnknownKind {
            name: "nebula".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown resource kind or service 'nebula'");
        assert!(error.is_user_error());
    }
}
