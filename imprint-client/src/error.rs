//! Registry client errors
//!
//! Every failure of a registry call ends up here: transport problems, non-2xx
//! answers, bodies that do not decode, and calls the caller gave up on.
//! "Already exists" is not among them; create-or-get calls report it in
//! their handle.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The registry could not be reached or the connection broke mid-call
    #[error("registry request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The registry answered with a non-2xx status
    #[error("registry returned {status}: {message}")]
    ApiError { status: u16, message: String },

    /// A 2xx body that does not match the expected DTO
    #[error("unexpected registry response: {0}")]
    ParseError(String),

    /// Iteration or build unknown to the registry
    #[error("not found on registry: {0}")]
    NotFound(String),

    /// The configured base URL cannot take `/api/...` path segments
    #[error("invalid registry URL: {0}")]
    InvalidUrl(String),

    #[error("registry call cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// True for [`ClientError::NotFound`] and for a 404 answer
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::ApiError { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Rejected by the registry (4xx); retrying the same call will not help
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status: 400..=499, .. })
    }

    /// Registry-side failure (5xx); the driver may retry the run
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status: 500.., .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
