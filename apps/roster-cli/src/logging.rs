//! Log level selection for CLI output
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only command
//! output. `RUST_LOG` takes precedence over the `-v` flags.

use std::fmt;

use tracing_subscriber::EnvFilter;

/// Verbosity level for CLI diagnostics
///
/// Levels are ordered: Normal < Verbose < Debug < Trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Warnings only (default)
    #[default]
    Normal = 0,
    /// Run start/finish
    Verbose = 1,
    /// Every directory call
    Debug = 2,
    /// Everything, including dependencies
    Trace = 3,
}

impl LogLevel {
    /// Create a level from the number of `-v` flags.
    pub fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "warn,roster_sync=info,roster_directory=info,roster_cli=info",
            Self::Debug => "info,roster_sync=debug,roster_directory=debug,roster_cli=debug",
            Self::Trace => "trace",
        }
    }

    /// Get the display name for this level
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Verbose => "VERBOSE",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(level: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
