//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add loading/driving context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{pointer}: {source}")]
    Placement {
        pointer: String,
        #[source]
        source: DomainError,
    },

    #[error("schema error: {message}")]
    Schema { message: String },

    #[error("document error at '{pointer}': {message}")]
    Document { pointer: String, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn document(pointer: &str, message: impl Into<String>) -> Self {
        Self::Document {
            pointer: pointer.to_string(),
            message: message.into(),
        }
    }

    pub fn placement(pointer: &str, source: DomainError) -> Self {
        Self::Placement {
            pointer: pointer.to_string(),
            source,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
