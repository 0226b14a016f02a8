//! Error types for the registry core

use imprint_client::ClientError;
use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors returned by [`crate::Bucket`] operations
///
/// Nothing is retried here. Retry policy belongs to the client transport or
/// the pipeline driver.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Operation on a component that was never registered
    #[error("component '{0}' is not registered with the bucket")]
    Registration(String),

    /// Operation on a component that has no build record yet
    #[error("no build found for component '{0}'")]
    NotFound(String),

    /// Creating or matching the remote iteration failed
    #[error("failed to create or match iteration: {0}")]
    Iteration(#[source] ClientError),

    /// A registry call for one component failed
    #[error("registry call for component '{component}' failed: {source}")]
    Remote {
        component: String,
        #[source]
        source: ClientError,
    },

    /// The bucket slug was changed after the iteration was created remotely
    #[error("bucket slug '{0}' cannot change once the iteration exists remotely")]
    SlugLocked(String),
}

impl RegistryError {
    pub(crate) fn remote(component: impl Into<String>, source: ClientError) -> Self {
        Self::Remote {
            component: component.into(),
            source,
        }
    }

    /// Check if this error came from the registry service
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Iteration(_) | Self::Remote { .. })
    }

    /// Check if the caller cancelled the failing remote call
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Iteration(source) | Self::Remote { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}
