use super::LockingStrategy;
use crate::core::{DbError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_VERSION_COLUMN: &str = "version";

fn default_version_column() -> String {
    DEFAULT_VERSION_COLUMN.to_string()
}

/// Per-record-type locking configuration.
///
/// Deserializes from documents such as
/// `{"strategy": "version", "ignored_columns": ["last_seen"]}`; omitted
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockingConfig {
    #[serde(default)]
    pub strategy: LockingStrategy,

    /// Columns left out of conflict detection. They never trigger a version bump.
    #[serde(default)]
    pub ignored_columns: Vec<String>,

    /// Counter column used by the `version` strategy.
    #[serde(default = "default_version_column")]
    pub version_column: String,
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            strategy: LockingStrategy::default(),
            ignored_columns: Vec::new(),
            version_column: default_version_column(),
        }
    }
}

impl LockingConfig {
    pub fn new(strategy: LockingStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Parses a JSON configuration document.
    ///
    /// An unknown strategy name fails here rather than at the first save.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| DbError::Configuration(format!("invalid locking config: {}", err)))
    }

    pub fn strategy(mut self, strategy: LockingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn ignore_column(mut self, column: impl Into<String>) -> Self {
        self.ignored_columns.push(column.into());
        self
    }

    pub fn version_column(mut self, column: impl Into<String>) -> Self {
        self.version_column = column.into();
        self
    }
}
