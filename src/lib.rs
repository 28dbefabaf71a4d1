//! Loggable - named, colorized loggers
//!
//! A [`Loggable`] writes leveled, templated and colored lines through a
//! shared per-name handler. Levels set on a logger flow down to everything it
//! spawned: plain children, [`TimedLoggable`] scopes and [`ProgressLoggable`]
//! bars that only draw while their level is enabled.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod error;
pub mod format;
pub mod level;
pub mod log;
pub mod loggable;
pub mod progress;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use config::LoggableSettings;
pub use error::{LoggableError, Result};
pub use format::{condense_long_lists, pformat, ColorMap, ColorSpec, PrettyOptions};
pub use level::{level_name, resolve_level, LevelSpec, Severity};
pub use log::{Handler, HandlerRegistry, Record, SharedBuffer, Sink, TracingHandler};
pub use loggable::{
    identity_of, LockedLoggable, Loggable, LoggableConfig, LoggableFactory, ProgressLoggable,
    ScopeGuard, ScopeState, Scoped, TimedLoggable,
};
pub use progress::{ConsoleProgress, HiddenProgress, MaybeProgress, ProgressFactory};
