use crate::core::{DbError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an update detects that its row changed underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LockingStrategy {
    /// Pin every changed column to the value it had before the first change.
    #[default]
    Dirty,
    /// Pin a counter column and bump it on every effective write.
    Version,
    /// Pin every declared column to its last persisted value.
    All,
    /// Primary key only; last writer wins.
    None,
}

impl LockingStrategy {
    pub const ALL: [LockingStrategy; 4] = [Self::Dirty, Self::Version, Self::All, Self::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dirty => "dirty",
            Self::Version => "version",
            Self::All => "all",
            Self::None => "none",
        }
    }
}

/// Rejects anything other than `dirty`, `version`, `all` or `none`.
pub fn validate_strategy(value: &str) -> Result<LockingStrategy> {
    LockingStrategy::ALL
        .into_iter()
        .find(|strategy| strategy.as_str() == value)
        .ok_or_else(|| {
            DbError::Configuration(format!(
                "unknown locking strategy '{}' (expected one of: dirty, version, all, none)",
                value
            ))
        })
}

impl FromStr for LockingStrategy {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        validate_strategy(s)
    }
}

impl TryFrom<String> for LockingStrategy {
    type Error = DbError;

    fn try_from(value: String) -> Result<Self> {
        validate_strategy(&value)
    }
}

impl fmt::Display for LockingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
