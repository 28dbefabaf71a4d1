//! Level-locked loggers and the enter/exit scope contract

use std::fmt::Display;
use std::ops::{Deref, DerefMut};

use super::Loggable;
use crate::error::Result;
use crate::level::{resolve_level, LevelSpec};

/// Lifecycle of a scoped logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// `enter` has not been called
    NotStarted,
    /// Between `enter` and `exit`
    Active,
    /// `exit` has been called
    Finished,
}

/// Something with an enter/exit lifecycle.
///
/// Prefer [`scope`](Self::scope) or [`run`](Self::run) over calling
/// `enter`/`exit` by hand: both guarantee `exit` on every path out of the
/// block, including `?` and panics.
pub trait Scoped: Sized {
    /// Start the scope
    fn enter(&mut self) -> &mut Self;

    /// End the scope
    fn exit(&mut self) -> &mut Self;

    /// Enter now and exit when the returned guard is dropped
    fn scope(&mut self) -> ScopeGuard<'_, Self> {
        self.enter();
        ScopeGuard { inner: self }
    }

    /// Run `f` inside the scope
    fn run<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = self.scope();
        f(&mut guard)
    }
}

/// Calls [`Scoped::exit`] on drop
#[derive(Debug)]
pub struct ScopeGuard<'a, S: Scoped> {
    inner: &'a mut S,
}

impl<S: Scoped> Deref for ScopeGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.inner
    }
}

impl<S: Scoped> DerefMut for ScopeGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.inner
    }
}

impl<S: Scoped> Drop for ScopeGuard<'_, S> {
    fn drop(&mut self) {
        self.inner.exit();
    }
}

/// A logger bound to one level, used whenever no level is given
#[derive(Debug)]
pub struct LockedLoggable {
    base: Loggable,
    level: u32,
}

impl LockedLoggable {
    /// Lock `base` to `level`
    pub fn new(base: Loggable, level: impl Into<LevelSpec>) -> Result<Self> {
        Ok(Self::from_rank(base, resolve_level(level)?))
    }

    pub(crate) const fn from_rank(base: Loggable, level: u32) -> Self {
        Self { base, level }
    }

    /// The locked level
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// The underlying logger, for level changes and spawning
    #[must_use]
    pub const fn loggable(&self) -> &Loggable {
        &self.base
    }

    /// Log at the locked level
    pub fn log(&self, message: impl Display) -> &Self {
        self.base.emit(&message.to_string(), self.level);
        self
    }

    /// Log at an explicit level instead of the locked one
    pub fn log_at(&self, message: impl Display, level: impl Into<LevelSpec>) -> Result<&Self> {
        self.base.log(message, level)?;
        Ok(self)
    }

    /// Whether the locked level is currently enabled
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.base.enabled_for(self.level)
    }

    /// Whether an explicit level is currently enabled
    pub fn is_enabled_at(&self, level: impl Into<LevelSpec>) -> Result<bool> {
        self.base.is_enabled(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::capture;

    #[derive(Default)]
    struct Counter {
        entered: u32,
        exited: u32,
    }

    impl Scoped for Counter {
        fn enter(&mut self) -> &mut Self {
            self.entered += 1;
            self
        }

        fn exit(&mut self) -> &mut Self {
            self.exited += 1;
            self
        }
    }

    #[test]
    fn test_guard_exits_on_drop() {
        let mut counter = Counter::default();
        {
            let guard = counter.scope();
            assert_eq!(guard.entered, 1);
            assert_eq!(guard.exited, 0);
        }
        assert_eq!(counter.exited, 1);
    }

    #[test]
    fn test_run_exits_on_early_return() {
        fn work(counter: &mut Counter) -> Result<(), &'static str> {
            counter.run(|_| Err("bail"))
        }
        let mut counter = Counter::default();
        assert!(work(&mut counter).is_err());
        assert_eq!((counter.entered, counter.exited), (1, 1));
    }

    #[test]
    fn test_guard_exits_on_panic() {
        let mut counter = Counter::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            counter.run(|_| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(counter.exited, 1);
    }

    #[test]
    fn test_locked_level_is_default() {
        let (factory, buffer) = capture();
        let base = factory.create("locked");
        base.set_level("INFO").unwrap();
        let locked = LockedLoggable::new(base, "warning").unwrap();

        assert_eq!(locked.level(), 30);
        assert!(locked.is_enabled());
        locked.log("default level");
        assert!(buffer.take().starts_with("WARNING - locked"));
    }

    #[test]
    fn test_locked_level_can_be_overridden() {
        let (factory, buffer) = capture();
        let base = factory.create("locked");
        base.set_level("DEBUG").unwrap();
        let locked = LockedLoggable::new(base, "ERROR").unwrap();

        locked.log_at("override", "debug").unwrap();
        assert!(buffer.take().starts_with("DEBUG - locked"));
        assert!(locked.is_enabled_at("DEBUG").unwrap());
        assert!(locked.log_at("x", "bogus").is_err());
    }
}
