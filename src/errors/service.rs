use thiserror::Error;

use super::RepositoryError;

/// Outcomes of link registry and code generator operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    #[error("Short code '{0}' not found")]
    NotFound(String),

    #[error("Short code '{0}' has expired")]
    Expired(String),

    #[error("Short code '{0}' is inactive")]
    Inactive(String),

    #[error("Code generation failed: {0}")]
    GenerationFailure(String),

    /// Persistence or lookup failure, tagged with the operation that failed
    #[error("Store failure during {operation}: {source}")]
    StoreFailure {
        operation: &'static str,
        #[source]
        source: RepositoryError,
    },

    #[error("Timed out during {0}")]
    Timeout(&'static str),

    #[error("Cancelled during {0}")]
    Cancelled(&'static str),
}

impl ServiceError {
    pub fn store(operation: &'static str, source: RepositoryError) -> Self {
        Self::StoreFailure { operation, source }
    }

    /// Input and business-rule failures, as opposed to infrastructure failures
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_)
                | Self::InvalidExpiry(_)
                | Self::NotFound(_)
                | Self::Expired(_)
                | Self::Inactive(_)
        )
    }
}
