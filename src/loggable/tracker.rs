//! Driving a progress bar from a scope

use std::fmt::Display;

use indicatif::ProgressBar;

use super::scoped::{LockedLoggable, ScopeState, Scoped};
use super::Loggable;
use crate::error::{LoggableError, Result};
use crate::level::LevelSpec;
use crate::progress::{leveled_description, MaybeProgress};

/// Progress handle; `Disabled` makes updates no-ops
#[derive(Debug)]
enum Handle {
    Disabled,
    Bar(ProgressBar),
}

/// A progress bar shown only while its locked level is enabled.
///
/// Created by [`Loggable::track`]; follows the parent's level changes.
#[derive(Debug)]
pub struct ProgressLoggable {
    locked: LockedLoggable,
    total: Option<u64>,
    desc: Option<String>,
    state: ScopeState,
    handle: Handle,
}

impl ProgressLoggable {
    /// Type name used in the logger identity
    pub const KIND: &'static str = "ProgressLoggable";

    pub(crate) fn new(locked: LockedLoggable, total: Option<u64>, desc: Option<&str>) -> Self {
        Self {
            locked,
            total,
            desc: desc.map(str::to_string),
            state: ScopeState::NotStarted,
            handle: Handle::Disabled,
        }
    }

    /// Advance the bar by `amount`, logging `message` first when non-empty.
    ///
    /// Fails with [`LoggableError::NotStarted`] before `enter`. While the
    /// level is disabled, or after `exit`, only the message is logged.
    pub fn update(&self, amount: u64, message: impl Display) -> Result<&Self> {
        if self.state == ScopeState::NotStarted {
            return Err(LoggableError::NotStarted(self.locked.loggable().name().to_string()));
        }
        let message = message.to_string();
        if !message.is_empty() {
            self.locked.log(message);
        }
        if let Handle::Bar(bar) = &self.handle {
            if self.locked.is_enabled() {
                bar.inc(amount);
            }
        }
        Ok(self)
    }

    /// Wrap `iterable` with this tracker's description when enabled
    pub fn iter<T: IntoIterator>(&self, iterable: T) -> MaybeProgress<T::IntoIter> {
        self.locked
            .loggable()
            .wrap_iter(iterable, self.locked.level(), self.desc.as_deref())
    }

    /// Log at the locked level
    pub fn log(&self, message: impl Display) -> &Self {
        self.locked.log(message);
        self
    }

    /// Log at an explicit level instead of the locked one
    pub fn log_at(&self, message: impl Display, level: impl Into<LevelSpec>) -> Result<&Self> {
        self.locked.log_at(message, level)?;
        Ok(self)
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

    /// Expected number of units, if known
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.total
    }

    /// Current bar position; `None` when no bar was created
    #[must_use]
    pub fn position(&self) -> Option<u64> {
        match &self.handle {
            Handle::Bar(bar) => Some(bar.position()),
            Handle::Disabled => None,
        }
    }
}

impl Scoped for ProgressLoggable {
    fn enter(&mut self) -> &mut Self {
        self.handle = if self.locked.is_enabled() {
            let desc = leveled_description(self.locked.level(), self.desc.as_deref());
            Handle::Bar(self.locked.loggable().config().progress.create(self.total, &desc))
        } else {
            Handle::Disabled
        };
        self.state = ScopeState::Active;
        tracing::trace!(
            logger = self.locked.loggable().name(),
            enabled = matches!(self.handle, Handle::Bar(_)),
            "progress started"
        );
        self
    }

    fn exit(&mut self) -> &mut Self {
        if let Handle::Bar(bar) = std::mem::replace(&mut self.handle, Handle::Disabled) {
            bar.finish();
        }
        self.state = ScopeState::Finished;
        self
    }
}
