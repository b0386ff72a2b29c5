//! Reconciliation configuration.

use std::env::VarError;

use serde::{Deserialize, Serialize};

/// Options controlling how desired state is applied.
///
/// The defaults give full convergence: anything absent from the desired state
/// is deleted and addresses compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Delete branches that exist in the directory but not in desired state.
    #[serde(default = "default_true")]
    pub prune_branches: bool,
    /// Delete lists that exist in a kept branch but not in desired state.
    #[serde(default = "default_true")]
    pub prune_lists: bool,
    /// Lowercase member addresses during normalization. Alternate addresses
    /// are lowercased regardless.
    #[serde(default = "default_true")]
    pub ignore_case: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            prune_branches: true,
            prune_lists: true,
            ignore_case: true,
        }
    }
}

impl ReconcileConfig {
    /// Load configuration from environment variables.
    ///
    /// - `ROSTER_PRUNE_BRANCHES` (default `true`)
    /// - `ROSTER_PRUNE_LISTS` (default `true`)
    /// - `ROSTER_IGNORE_CASE` (default `true`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Lets tests supply variables without touching the process environment.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let flag = |key: &str| -> Result<bool, ConfigError> {
            match reader(key) {
                Ok(value) => parse_flag(&value)
                    .ok_or_else(|| ConfigError::InvalidValue(key.to_string(), value)),
                Err(VarError::NotPresent) => Ok(true),
                Err(VarError::NotUnicode(raw)) => Err(ConfigError::InvalidValue(
                    key.to_string(),
                    raw.to_string_lossy().into_owned(),
                )),
            }
        };

        Ok(Self {
            prune_branches: flag("ROSTER_PRUNE_BRANCHES")?,
            prune_lists: flag("ROSTER_PRUNE_LISTS")?,
            ignore_case: flag("ROSTER_IGNORE_CASE")?,
        })
    }

    /// Enable or disable both pruning options.
    #[must_use]
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune_branches = prune;
        self.prune_lists = prune;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ffi::OsString;

    /// Create a reader closure from a HashMap (no global env mutation).
    fn make_reader(vars: HashMap<&str, &str>) -> impl Fn(&str) -> Result<String, VarError> {
        let owned: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| owned.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_defaults() {
        let config = ReconcileConfig::from_reader(make_reader(HashMap::new())).unwrap();
        assert_eq!(config, ReconcileConfig::default());
        assert!(config.prune_branches);
        assert!(config.prune_lists);
        assert!(config.ignore_case);
    }

    #[test]
    fn test_custom_values() {
        let reader = make_reader(HashMap::from([
            ("ROSTER_PRUNE_BRANCHES", "false"),
            ("ROSTER_PRUNE_LISTS", "0"),
            ("ROSTER_IGNORE_CASE", "Yes"),
        ]));

        let config = ReconcileConfig::from_reader(reader).unwrap();
        assert!(!config.prune_branches);
        assert!(!config.prune_lists);
        assert!(config.ignore_case);
    }

    #[test]
    fn test_invalid_flag() {
        let reader = make_reader(HashMap::from([("ROSTER_PRUNE_LISTS", "maybe")]));
        let err = ReconcileConfig::from_reader(reader).unwrap_err();
        assert!(err.to_string().contains("ROSTER_PRUNE_LISTS"));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_non_unicode_flag() {
        let reader = |key: &str| match key {
            "ROSTER_IGNORE_CASE" => Err(VarError::NotUnicode(OsString::from("tr\u{fffd}e"))),
            _ => Err(VarError::NotPresent),
        };
        let err = ReconcileConfig::from_reader(reader).unwrap_err();
        assert!(err.to_string().contains("ROSTER_IGNORE_CASE"));
    }

    #[test]
    fn test_with_prune() {
        let config = ReconcileConfig::default().with_prune(false);
        assert!(!config.prune_branches);
        assert!(!config.prune_lists);
    }

    #[test]
    fn test_serde_defaults() {
        let config: ReconcileConfig = serde_json::from_str(r#"{"prune_lists": false}"#).unwrap();
        assert!(config.prune_branches);
        assert!(!config.prune_lists);
    }
}
