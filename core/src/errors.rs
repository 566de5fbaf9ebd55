use thiserror::Error;

/// Errors surfaced by the API client and the stores built on top of it.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The server rejected the current credential mid-use. By the time a
    /// caller observes this, the session has already been cleared.
    #[error("not authorized")]
    Unauthorized,

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode response: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("session storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Message suitable for the stores' `error` field: the server-provided
    /// message when there is one, `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::NotFound { message } | ApiError::Server { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            ApiError::InvalidCredentials | ApiError::Unauthorized => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
