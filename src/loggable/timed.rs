//! Timing a region of code

use std::fmt::Display;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use super::scoped::{LockedLoggable, ScopeState, Scoped};
use super::Loggable;
use crate::error::Result;
use crate::level::LevelSpec;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Logs when a scope starts and how long it took.
///
/// Created by [`Loggable::timeit`]; follows the parent's level changes.
///
/// ```
/// use loggable::{Loggable, Scoped};
///
/// let log = Loggable::new("build");
/// let mut timer = log.timeit("INFO", "compile").unwrap();
/// timer.run(|t| {
///     t.log("halfway");
/// });
/// assert!(timer.elapsed().is_some());
/// ```
#[derive(Debug)]
pub struct TimedLoggable {
    locked: LockedLoggable,
    prefix: String,
    state: ScopeState,
    started_at: Option<DateTime<Local>>,
    finished_at: Option<DateTime<Local>>,
    started: Option<Instant>,
    elapsed: Option<Duration>,
}

impl TimedLoggable {
    /// Type name used in the logger identity and message prefix
    pub const KIND: &'static str = "TimedLoggable";

    pub(crate) fn new(locked: LockedLoggable, prefix: &str) -> Self {
        Self {
            locked,
            prefix: prefix.to_string(),
            state: ScopeState::NotStarted,
            started_at: None,
            finished_at: None,
            started: None,
            elapsed: None,
        }
    }

    /// Log at the locked level, with the prefix if one was given
    pub fn log(&self, message: impl Display) -> &Self {
        self.locked.log(self.decorate(&message.to_string()));
        self
    }

    /// Log at an explicit level, with the prefix if one was given
    pub fn log_at(&self, message: impl Display, level: impl Into<LevelSpec>) -> Result<&Self> {
        self.locked
            .log_at(self.decorate(&message.to_string()), level)?;
        Ok(self)
    }

    fn decorate(&self, message: &str) -> String {
        if self.prefix.is_empty() {
            message.to_string()
        } else {
            format!("{}(\"{}\"): {message}", Self::KIND, self.prefix)
        }
    }

    /// Whether the locked level is enabled
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.locked.is_enabled()
    }

    /// Whether an explicit level is enabled
    pub fn is_enabled_at(&self, level: impl Into<LevelSpec>) -> Result<bool> {
        self.locked.is_enabled_at(level)
    }

    /// The locked level
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.locked.level()
    }

    /// The underlying logger
    #[must_use]
    pub const fn loggable(&self) -> &Loggable {
        self.locked.loggable()
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> ScopeState {
        self.state
    }

    /// Wall-clock time of `enter`
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    /// Wall-clock time of `exit`
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Local>> {
        self.finished_at
    }

    /// Monotonic time between `enter` and `exit`
    #[must_use]
    pub const fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }
}

impl Scoped for TimedLoggable {
    fn enter(&mut self) -> &mut Self {
        let now = Local::now();
        self.started_at = Some(now);
        self.started = Some(Instant::now());
        self.state = ScopeState::Active;
        self.log(format!("Started at {}", now.format(TIMESTAMP_FORMAT)));
        self
    }

    fn exit(&mut self) -> &mut Self {
        let elapsed = self.started.map_or(Duration::ZERO, |s| s.elapsed());
        self.finished_at = Some(Local::now());
        self.elapsed = Some(elapsed);
        self.state = ScopeState::Finished;
        self.log(format!("Finished in {}.", format_elapsed(elapsed)));
        self
    }
}

/// `H:MM:SS.ffffff`
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{}:{:02}:{:02}.{:06}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        elapsed.subsec_micros()
    )
}
