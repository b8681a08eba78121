use crate::errors::ScourError;

/// Errors reported by a backend client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("{collection} '{id}' not found")]
    NotFound { collection: String, id: String },

    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Operation '{operation}' is not supported by service '{service}'")]
    Unsupported { service: String, operation: String },
}

impl BackendError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        BackendError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Whether the backend is telling us the resource does not exist.
    ///
    /// Covers explicit not-found errors, plain 404s and vendor codes such as
    /// `InvalidInstanceID.NotFound`.
    pub fn is_not_found(&self) -> bool {
        match self {
            BackendError::NotFound { .. } => true,
            BackendError::Api { status, code, .. } => {
                *status == 404 || code.as_deref().is_some_and(|c| c.ends_with("NotFound"))
            }
            _ => false,
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Transport { .. } => true,
            BackendError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl ScourError for BackendError {
    fn error_code(&self) -> &'static str {
        match self {
            BackendError::NotFound { .. } => "BACKEND_NOT_FOUND",
            BackendError::Api { .. } => "BACKEND_API_ERROR",
            BackendError::Transport { .. } => "BACKEND_TRANSPORT_ERROR",
            BackendError::Unauthorized { .. } => "BACKEND_UNAUTHORIZED",
            BackendError::Unsupported { .. } => "BACKEND_UNSUPPORTED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, BackendError::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variants() {
        assert!(BackendError::not_found("ports", "p1").is_not_found());
        assert!(
            BackendError::Api {
                status: 404,
                code: None,
                message: "gone".to_string()
            }
            .is_not_found()
        );
        assert!(
            BackendError::Api {
                status: 400,
                code: Some("InvalidInstanceID.NotFound".to_string()),
                message: "no such instance".to_string()
            }
            .is_not_found()
        );
        assert!(
            !BackendError::Transport {
                message: "reset".to_string()
            }
            .is_not_found()
        );
    }

    #[test]
    fn test_transient_errors() {
        assert!(
            BackendError::Transport {
                message: "connection reset".to_string()
            }
            .is_transient()
        );
        assert!(
            BackendError::Api {
                status: 503,
                code: None,
                message: "unavailable".to_string()
            }
            .is_transient()
        );
        assert!(
            !BackendError::Api {
                status: 409,
                code: None,
                message: "conflict".to_string()
            }
            .is_transient()
        );
        assert!(!BackendError::not_found("servers", "s1").is_transient());
    }

    #[test]
    fn test_error_display() {
        let error = BackendError::not_found("ports", "p1");
        assert_eq!(error.to_string(), "ports 'p1' not found");
        assert_eq!(error.error_code(), "BACKEND_NOT_FOUND");
        assert!(!error.is_user_error());
    }
}
