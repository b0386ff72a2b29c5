//! Error types for the roster CLI

use roster_directory::addresses::PropertyError;
use roster_sync::{ConfigError, NormalizeError, ReconcileError};
use thiserror::Error;

/// Exit code for any failed command.
pub const EXIT_ERROR: i32 = 2;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    Parse(String),

    #[error("{file}: {source}")]
    Document {
        file: String,
        #[source]
        source: NormalizeError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot seed directory from existing state: {0}")]
    Seed(#[from] PropertyError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CliError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        EXIT_ERROR
    }

    /// Print the error to stderr with formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::FileNotFound(_) => Some("Check the paths given to --desired and --existing."),
            CliError::Document { .. } => Some(
                "Each group is an address, a list of addresses, or a map with a 'members' key.",
            ),
            CliError::Config(_) => {
                Some("ROSTER_* flags accept true/false, 1/0, yes/no or on/off.")
            }
            CliError::Reconcile(e) if e.is_partial() => {
                Some("The directory transaction was left open; inspect it before re-running.")
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
