//! Board configuration.
//!
//! Loaded from environment variables with defaults for anything unset.
//! Unlike a missing variable, a variable that is set but malformed is an
//! error.

use crate::deadline::OverduePolicy;
use crate::tags::TagMatching;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Tag label matching policy (`exact` or `case-insensitive`)
pub const ENV_TAG_MATCHING: &str = "TIDYBOARD_TAG_MATCHING";
/// Maximum todo name length in characters
pub const ENV_MAX_NAME_LEN: &str = "TIDYBOARD_MAX_NAME_LEN";
/// Urgency of overdue deadlines (`danger` or `magnitude`)
pub const ENV_OVERDUE_URGENCY: &str = "TIDYBOARD_OVERDUE_URGENCY";
/// Where the JSON snapshot is kept; persistence is off when unset
pub const ENV_SNAPSHOT_PATH: &str = "TIDYBOARD_SNAPSHOT_PATH";

/// Default maximum todo name length
pub const DEFAULT_MAX_NAME_LEN: usize = 500;

/// Errors while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to something we cannot use
    #[error("{key}={value:?} is invalid: {reason}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// What was expected
        reason: &'static str,
    },
}

/// Domain configuration for the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// How `ensure_tag` compares labels
    pub tag_matching: TagMatching,
    /// Maximum todo name length in characters
    pub max_name_len: usize,
    /// Urgency assigned to overdue deadlines
    pub overdue_policy: OverduePolicy,
    /// JSON snapshot location, if persistence is enabled
    pub snapshot_path: Option<PathBuf>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            tag_matching: TagMatching::Exact,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            overdue_policy: OverduePolicy::AlwaysDanger,
            snapshot_path: None,
        }
    }
}

impl BoardConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag matching policy
    #[must_use]
    pub fn with_tag_matching(mut self, tag_matching: TagMatching) -> Self {
        self.tag_matching = tag_matching;
        self
    }

    /// Set the maximum todo name length
    #[must_use]
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    /// Set the overdue urgency policy
    #[must_use]
    pub fn with_overdue_policy(mut self, overdue_policy: OverduePolicy) -> Self {
        self.overdue_policy = overdue_policy;
        self
    }

    /// Enable JSON snapshot persistence at `path`
    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_TAG_MATCHING) {
            config.tag_matching = match value.trim().to_ascii_lowercase().as_str() {
                "exact" => TagMatching::Exact,
                "case-insensitive" | "case_insensitive" => TagMatching::CaseInsensitive,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_TAG_MATCHING,
                        value,
                        reason: "expected `exact` or `case-insensitive`",
                    });
                },
            };
        }

        if let Some(value) = lookup(ENV_MAX_NAME_LEN) {
            config.max_name_len = match value.trim().parse::<usize>() {
                Ok(len) if len > 0 => len,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_MAX_NAME_LEN,
                        value,
                        reason: "expected a positive integer",
                    });
                },
            };
        }

        if let Some(value) = lookup(ENV_OVERDUE_URGENCY) {
            config.overdue_policy = match value.trim().to_ascii_lowercase().as_str() {
                "danger" => OverduePolicy::AlwaysDanger,
                "magnitude" => OverduePolicy::ByMagnitude,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_OVERDUE_URGENCY,
                        value,
                        reason: "expected `danger` or `magnitude`",
                    });
                },
            };
        }

        config.snapshot_path = lookup(ENV_SNAPSHOT_PATH)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = BoardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.max_name_len, 500);
        assert_eq!(config.overdue_policy, OverduePolicy::AlwaysDanger);
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = BoardConfig::from_lookup(lookup(&[
            (ENV_TAG_MATCHING, "Case-Insensitive"),
            (ENV_MAX_NAME_LEN, "80"),
            (ENV_OVERDUE_URGENCY, "magnitude"),
            (ENV_SNAPSHOT_PATH, "/tmp/board.json"),
        ]))
        .unwrap();

        assert_eq!(config.tag_matching, TagMatching::CaseInsensitive);
        assert_eq!(config.max_name_len, 80);
        assert_eq!(config.overdue_policy, OverduePolicy::ByMagnitude);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/tmp/board.json")));
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = BoardConfig::from_lookup(lookup(&[(ENV_MAX_NAME_LEN, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_MAX_NAME_LEN, .. }));

        assert!(BoardConfig::from_lookup(lookup(&[(ENV_MAX_NAME_LEN, "0")])).is_err());
        assert!(BoardConfig::from_lookup(lookup(&[(ENV_TAG_MATCHING, "fuzzy")])).is_err());
        assert!(BoardConfig::from_lookup(lookup(&[(ENV_OVERDUE_URGENCY, "red")])).is_err());
    }

    #[test]
    fn blank_snapshot_path_disables_persistence() {
        let config = BoardConfig::from_lookup(lookup(&[(ENV_SNAPSHOT_PATH, "  ")])).unwrap();
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn builder_overrides() {
        let config = BoardConfig::new()
            .with_tag_matching(TagMatching::CaseInsensitive)
            .with_max_name_len(10)
            .with_overdue_policy(OverduePolicy::ByMagnitude)
            .with_snapshot_path("board.json");

        assert_eq!(config.max_name_len, 10);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("board.json")));
    }
}
