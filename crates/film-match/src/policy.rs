//! Conflict policies and reconciliation scope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// How conflicting non-key values of two duplicate rows are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConflictPolicy {
    /// Merge by value kind: text into lists, numbers by maximum, gaps filled.
    #[default]
    Automatic,
    /// Ask a [`ConflictOperator`](crate::ConflictOperator) for every conflicting pair.
    Interactive,
    /// Keep whichever value has the longer rendering.
    KeepLongest,
}

impl ConflictPolicy {
    pub const ALL: [Self; 3] = [Self::Automatic, Self::Interactive, Self::KeepLongest];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Interactive => "interactive",
            Self::KeepLongest => "keep_longest",
        }
    }

    /// True when the policy blocks on an operator.
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Interactive)
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = MatchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "automatic" | "auto" => Ok(Self::Automatic),
            "interactive" | "manual" => Ok(Self::Interactive),
            "keep_longest" | "keep_longest_value" | "longest" => Ok(Self::KeepLongest),
            _ => Err(MatchError::InvalidPolicy(value.to_string())),
        }
    }
}

impl TryFrom<String> for ConflictPolicy {
    type Error = MatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConflictPolicy> for String {
    fn from(policy: ConflictPolicy) -> Self {
        policy.as_str().to_string()
    }
}

/// Which rows of a duplicate bucket take part in reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileScope {
    /// Only the first two rows are reconciled; further duplicates are
    /// dropped and counted in the report.
    #[default]
    FirstPair,
    /// Every row is folded into the survivor in bucket order.
    AllRows,
}
