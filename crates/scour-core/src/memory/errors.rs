use crate::errors::ScourError;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixture '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse fixture: {message}")]
    Parse { message: String },
}

impl ScourError for FixtureError {
    fn error_code(&self) -> &'static str {
        match self {
            FixtureError::Io { .. } => "FIXTURE_IO_ERROR",
            FixtureError::Parse { .. } => "FIXTURE_PARSE_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}
