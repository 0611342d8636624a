use thiserror::Error;

/// Error kinds shared across the docsearch core pipeline.
///
/// Transport layers (HTTP, CLI) map these onto their own status codes; the
/// core itself never knows about HTTP.
#[derive(Error, Debug)]
pub enum DocsearchError {
    #[error("bad input: {message}")]
    BadInput { message: String },

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("index not ready: {message}")]
    NotReady { message: String },

    #[error("index snapshot stale or corrupt: {message}")]
    Stale { message: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DocsearchError {
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::BadInput {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn not_ready(message: impl Into<String>) -> Self {
        Self::NotReady {
            message: message.into(),
        }
    }

    pub fn stale(message: impl Into<String>) -> Self {
        Self::Stale {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Common Result type used across docsearch crates.
pub type Result<T> = std::result::Result<T, DocsearchError>;

impl From<std::io::Error> for DocsearchError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(error.to_string())
    }
}

impl From<serde_json::Error> for DocsearchError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(error.to_string())
    }
}
