use tabula_core::CoreError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never completed (connection refused, timeout, ...)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with something that is not a success envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The server answered `ok: false`
    #[error("Rejected by server: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    /// Another mutating request is still in flight
    #[error("A submission is already in progress")]
    Busy,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ServiceError {
    /// Whether the failure happened below the application protocol.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidResponse(_))
    }

    /// Message supplied by the server, if it sent a non-empty one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<url::ParseError> for ServiceError {
    fn from(err: url::ParseError) -> Self {
        Self::Configuration(format!("invalid base URL: {}", err))
    }
}
