//! Directory client error types
//!
//! Error definitions with transient/permanent classification. The reconciler
//! never retries; the classification is for callers deciding whether to rerun.

use thiserror::Error;

/// Error that can occur during directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Connection errors (usually transient)
    /// Failed to reach the directory service.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Directory service is temporarily unavailable.
    #[error("directory unavailable: {message}")]
    Unavailable { message: String },

    // Object errors (permanent)
    /// Object already exists (insert conflict).
    #[error("object already exists: {identifier}")]
    ObjectAlreadyExists { identifier: String },

    /// Object not found (delete or membership target missing).
    #[error("object not found: {identifier}")]
    ObjectNotFound { identifier: String },

    /// A mutation was issued outside of a begin/complete bracket.
    #[error("no open transaction for {operation}")]
    TransactionNotOpen { operation: String },

    /// Invalid data supplied to the directory.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// The directory rejected the operation.
    #[error("operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DirectoryError {
    /// Check if this error is transient.
    ///
    /// Transient errors are caused by conditions that may clear on their own,
    /// such as network issues or temporary unavailability.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::ConnectionFailed { .. } | DirectoryError::Unavailable { .. }
        )
    }

    /// Check if this error is permanent and rerunning won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            DirectoryError::Unavailable { .. } => "DIRECTORY_UNAVAILABLE",
            DirectoryError::ObjectAlreadyExists { .. } => "OBJECT_EXISTS",
            DirectoryError::ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            DirectoryError::TransactionNotOpen { .. } => "TRANSACTION_NOT_OPEN",
            DirectoryError::InvalidData { .. } => "INVALID_DATA",
            DirectoryError::OperationFailed { .. } => "OPERATION_FAILED",
            DirectoryError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an already-exists error.
    pub fn already_exists(identifier: impl Into<String>) -> Self {
        DirectoryError::ObjectAlreadyExists {
            identifier: identifier.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(identifier: impl Into<String>) -> Self {
        DirectoryError::ObjectNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create an operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        DirectoryError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create an operation failed error with source.
    pub fn operation_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::OperationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        DirectoryError::Internal {
            message: message.into(),
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
