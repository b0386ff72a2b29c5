//! Reconciliation error types.

use roster_directory::error::DirectoryError;
use roster_directory::operation::DirectoryOperation;
use thiserror::Error;

/// Error that can occur during a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Desired or existing state is malformed. Raised before any directory
    /// call is issued.
    #[error("invalid input at {path}: {message}")]
    InvalidInput { path: String, message: String },

    /// The directory refused to open a transaction.
    #[error("failed to begin transaction: {0}")]
    Begin(#[source] DirectoryError),

    /// A mutating call failed; the remaining calls were not issued and the
    /// transaction was left open.
    #[error("{operation} failed after {applied} of {planned} operations: {source}")]
    Directory {
        operation: DirectoryOperation,
        applied: usize,
        planned: usize,
        #[source]
        source: DirectoryError,
    },

    /// Every call succeeded but closing the transaction failed.
    #[error("failed to complete transaction after {applied} operations: {source}")]
    Complete {
        applied: usize,
        #[source]
        source: DirectoryError,
    },
}

impl ReconcileError {
    /// Create an invalid input error.
    pub fn invalid_input(path: impl Into<String>, message: impl Into<String>) -> Self {
        ReconcileError::InvalidInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ReconcileError::InvalidInput { .. } => "INVALID_INPUT",
            ReconcileError::Begin(_) => "BEGIN_FAILED",
            ReconcileError::Directory { .. } => "DIRECTORY_CALL_FAILED",
            ReconcileError::Complete { .. } => "COMPLETE_FAILED",
        }
    }

    /// The call that failed, if the error came from a mutating call.
    pub fn failed_operation(&self) -> Option<&DirectoryOperation> {
        match self {
            ReconcileError::Directory { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Number of mutating calls that succeeded before the failure.
    pub fn applied(&self) -> usize {
        match self {
            ReconcileError::Directory { applied, .. } | ReconcileError::Complete { applied, .. } => {
                *applied
            }
            ReconcileError::InvalidInput { .. } | ReconcileError::Begin(_) => 0,
        }
    }

    /// Whether the directory may have been partially changed.
    pub fn is_partial(&self) -> bool {
        self.applied() > 0
    }
}

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
