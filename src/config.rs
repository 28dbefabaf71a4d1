//! Settings file parser
//!
//! Parses a `loggable.toml` into the configuration used by
//! [`LoggableFactory`](crate::LoggableFactory).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::{ColorMap, DEFAULT_FORMAT};
use crate::level::{resolve_level, LevelSpec};
use crate::loggable::LoggableConfig;

/// Environment variable overriding the configured level
pub const LEVEL_ENV: &str = "LOGGABLE_LEVEL";

/// Logger settings, usually loaded from `loggable.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggableSettings {
    /// Line template
    #[serde(default = "default_format")]
    pub format: String,
    /// Default level: a name (`"info"`) or a rank (`"25"`). None keeps ERROR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Stack frames written after each record (0 disables)
    #[serde(default)]
    pub traceback_limit: usize,
    /// Per-severity color overrides, e.g. `warning = "magenta"`
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl Default for LoggableSettings {
    fn default() -> Self {
        Self {
            format: default_format(),
            level: None,
            traceback_limit: 0,
            colors: BTreeMap::new(),
        }
    }
}

impl LoggableSettings {
    /// Parse a settings file from a path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse settings from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply the `LOGGABLE_LEVEL` environment variable, if set
    pub fn with_env_override(self) -> Result<Self> {
        self.with_level_override(std::env::var(LEVEL_ENV).ok())
    }

    /// Replace the level when `level` is non-empty
    pub fn with_level_override(mut self, level: Option<String>) -> Result<Self> {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            parse_level(&level).with_context(|| format!("in {LEVEL_ENV}"))?;
            self.level = Some(level);
        }
        Ok(self)
    }

    /// Configured level as a rank
    pub fn level_rank(&self) -> Result<Option<u32>> {
        self.level.as_deref().map(parse_level).transpose()
    }

    /// Default colors with this file's overrides applied
    pub fn color_map(&self) -> Result<ColorMap> {
        Ok(ColorMap::default().with_overrides(&self.colors)?)
    }

    /// Logger configuration described by these settings
    pub fn to_config(&self) -> Result<LoggableConfig> {
        Ok(LoggableConfig::default()
            .with_format(self.format.clone())
            .with_colors(self.color_map()?))
    }

    fn validate(&self) -> Result<()> {
        self.level_rank().context("Invalid level")?;
        self.color_map().context("Invalid colors")?;
        Ok(())
    }
}

fn parse_level(level: &str) -> Result<u32> {
    let spec = level
        .trim()
        .parse::<u32>()
        .map_or_else(|_| LevelSpec::from(level.trim()), LevelSpec::from);
    Ok(resolve_level(spec)?)
}
