//! Severity levels and level resolution
//!
//! Every operation that takes a level accepts either a name (any case) or a
//! numeric rank. [`resolve_level`] turns both into the rank used for
//! filtering.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LoggableError, Result};

/// Canonical severities, ordered by rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Diagnostic detail
    Debug = 10,
    /// Normal progress information
    Info = 20,
    /// Something unexpected that does not stop the program
    Warning = 30,
    /// An operation failed
    Error = 40,
    /// The program may not be able to continue
    Critical = 50,
}

impl Severity {
    /// All severities, lowest first
    pub const ALL: [Self; 5] = [
        Self::Debug,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    /// Numeric rank used for threshold comparison
    #[must_use]
    pub const fn rank(self) -> u32 {
        self as u32
    }

    /// Canonical upper-case name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Look up a severity by name, case-insensitive. `WARN` is an alias of `WARNING`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARNING" | "WARN" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Severity with exactly this rank
    #[must_use]
    pub fn from_rank(rank: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.rank() == rank)
    }

    /// Highest severity whose rank is at or below `rank`
    #[must_use]
    pub fn floor(rank: u32) -> Option<Self> {
        Self::ALL.into_iter().rev().find(|s| s.rank() <= rank)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = LoggableError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| LoggableError::UnrecognizedLevel(s.to_string()))
    }
}

/// A level as supplied by a caller: a name still to be validated, or a rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSpec {
    /// Level name, resolved case-insensitively
    Name(String),
    /// Numeric rank, passed through unchecked
    Rank(u32),
}

impl From<&str> for LevelSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for LevelSpec {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for LevelSpec {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<u32> for LevelSpec {
    fn from(rank: u32) -> Self {
        Self::Rank(rank)
    }
}

impl From<Severity> for LevelSpec {
    fn from(severity: Severity) -> Self {
        Self::Rank(severity.rank())
    }
}

/// Resolve a level name or rank to its numeric rank.
///
/// Ranks are returned unchanged, without bounds validation.
pub fn resolve_level(level: impl Into<LevelSpec>) -> Result<u32> {
    match level.into() {
        LevelSpec::Rank(rank) => Ok(rank),
        LevelSpec::Name(name) => Severity::from_name(&name)
            .map(Severity::rank)
            .ok_or(LoggableError::UnrecognizedLevel(name)),
    }
}

/// Display name for a rank: the canonical name, or `Level <n>` for other ranks.
#[must_use]
pub fn level_name(rank: u32) -> Cow<'static, str> {
    Severity::from_rank(rank).map_or_else(
        || Cow::Owned(format!("Level {rank}")),
        |s| Cow::Borrowed(s.name()),
    )
}
