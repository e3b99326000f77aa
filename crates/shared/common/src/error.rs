//! Unified error handling for repository operations.
//!
//! Domain errors pass through untouched; store driver errors that could not
//! be translated are kept as-is so the boundary layer can treat them as
//! internal failures.

use domain::{DomainError, ErrorKind};
use thiserror::Error;

/// Repository error types.
#[derive(Error, Debug)]
pub enum RepositoryError {
    // Translated failures
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Store driver errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[cfg(feature = "document")]
    #[error("Document store error")]
    Document(#[from] mongodb::error::Error),

    #[cfg(feature = "cache")]
    #[error("Cache error")]
    Cache(#[from] redis::RedisError),

    // Conversion
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Caller mistakes
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),
}

impl RepositoryError {
    /// Get error code for client
    pub fn code(&self) -> &str {
        match self {
            RepositoryError::Domain(err) => err.code(),
            #[cfg(feature = "database")]
            RepositoryError::Database(_) => "DATABASE_ERROR",
            #[cfg(feature = "document")]
            RepositoryError::Document(_) => "DOCUMENT_STORE_ERROR",
            #[cfg(feature = "cache")]
            RepositoryError::Cache(_) => "CACHE_ERROR",
            RepositoryError::Serialization(_) => "SERIALIZATION_ERROR",
            RepositoryError::InvalidCriteria(_) => "INVALID_CRITERIA",
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            RepositoryError::Domain(err) => err.message().to_string(),

            #[cfg(feature = "database")]
            RepositoryError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            #[cfg(feature = "document")]
            RepositoryError::Document(e) => {
                tracing::error!("Document store error: {:?}", e);
                "A document store error occurred".to_string()
            }
            #[cfg(feature = "cache")]
            RepositoryError::Cache(e) => {
                tracing::error!("Cache error: {:?}", e);
                "A cache error occurred".to_string()
            }
            RepositoryError::Serialization(msg) => {
                tracing::error!("Serialization error: {}", msg);
                "An internal error occurred".to_string()
            }
            RepositoryError::InvalidCriteria(msg) => msg.clone(),
        }
    }

    /// The domain error, if this failure was translated into one
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            RepositoryError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Check whether this is a domain error of the given kind
    pub fn is_kind(&self, kind: ErrorKind) -> bool {
        self.as_domain().is_some_and(|err| err.is(kind))
    }
}

/// Convenience constructors
impl RepositoryError {
    pub fn serialization(msg: impl std::fmt::Display) -> Self {
        RepositoryError::Serialization(msg.to_string())
    }

    pub fn invalid_criteria(msg: impl Into<String>) -> Self {
        RepositoryError::InvalidCriteria(msg.into())
    }
}

/// Result type alias
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Extension trait for Option -> RepositoryError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> RepoResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> RepoResult<T> {
        self.ok_or_else(|| DomainError::data_not_found().into())
    }
}
