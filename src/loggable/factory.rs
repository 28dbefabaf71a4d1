//! Producing identically configured loggers

use super::{Loggable, LoggableConfig};
use crate::config::LoggableSettings;
use crate::error::Result;
use crate::level::{resolve_level, LevelSpec};
use crate::log::HandlerRegistry;

/// Template for [`Loggable`]s sharing a configuration, registry and
/// optional default level.
#[derive(Debug, Clone)]
pub struct LoggableFactory {
    config: LoggableConfig,
    registry: HandlerRegistry,
    level: Option<u32>,
    traceback_limit: Option<usize>,
}

impl Default for LoggableFactory {
    fn default() -> Self {
        Self::new(LoggableConfig::default())
    }
}

impl LoggableFactory {
    /// Factory emitting through the global registry
    #[must_use]
    pub fn new(config: LoggableConfig) -> Self {
        Self::with_registry(config, HandlerRegistry::global())
    }

    /// Factory emitting through `registry`
    #[must_use]
    pub const fn with_registry(config: LoggableConfig, registry: HandlerRegistry) -> Self {
        Self {
            config,
            registry,
            level: None,
            traceback_limit: None,
        }
    }

    /// Factory described by a settings file, in the global registry
    pub fn from_settings(settings: &LoggableSettings) -> anyhow::Result<Self> {
        let mut factory = Self::new(settings.to_config()?);
        factory.level = settings.level_rank()?;
        if settings.traceback_limit > 0 {
            factory.traceback_limit = Some(settings.traceback_limit);
        }
        Ok(factory)
    }

    /// Apply `level` to every logger this factory creates
    pub fn with_level(mut self, level: impl Into<LevelSpec>) -> Result<Self> {
        self.level = Some(resolve_level(level)?);
        Ok(self)
    }

    /// Write `limit` stack frames after each record of created loggers
    #[must_use]
    pub const fn with_traceback_limit(mut self, limit: usize) -> Self {
        self.traceback_limit = Some(limit);
        self
    }

    /// Shared configuration
    #[must_use]
    pub const fn config(&self) -> &LoggableConfig {
        &self.config
    }

    /// Registry created loggers emit through
    #[must_use]
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Default level, if one was set
    #[must_use]
    pub const fn level(&self) -> Option<u32> {
        self.level
    }

    /// A fresh logger named `name`.
    ///
    /// With a default level set, it is applied to the identity even when
    /// another logger already shares it.
    #[must_use]
    pub fn create(&self, name: impl Into<String>) -> Loggable {
        let log = Loggable::with_registry(name, self.config.clone(), self.registry.clone());
        if let Some(level) = self.level {
            log.apply_level(level, self.traceback_limit);
        } else if let Some(limit) = self.traceback_limit {
            log.apply_level(log.threshold(), Some(limit));
        }
        log
    }

    /// [`create`](Self::create) named after `object`, see [`super::identity_of`]
    #[must_use]
    pub fn create_for<T: ?Sized>(&self, object: &T) -> Loggable {
        self.create(super::identity_of(object))
    }
}
