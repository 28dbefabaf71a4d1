//! The core named logger

use std::fmt::Display;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;

use super::{renamed, LoggableConfig, LockedLoggable, ProgressLoggable, TimedLoggable};
use crate::error::Result;
use crate::format::{condense_long_lists, pformat, PrettyOptions};
use crate::level::{resolve_level, LevelSpec, Severity};
use crate::log::{Handler, HandlerRegistry, Record, StreamHandler};
use crate::progress::{self, MaybeProgress};

#[derive(Debug)]
struct Core {
    name: String,
    config: LoggableConfig,
    registry: HandlerRegistry,
    handler: Arc<StreamHandler>,
    /// Loggers spawned from this one; not owned
    children: Mutex<Vec<Weak<Core>>>,
}

impl Core {
    /// Apply a level here and, depth-first, to every live child
    fn apply_level(&self, level: u32, traceback_limit: Option<usize>) {
        self.registry.set_level(&self.name, level, traceback_limit);

        let live: Vec<Arc<Self>> = {
            let mut children = self.children.lock();
            children.retain(|child| child.strong_count() > 0);
            children.iter().filter_map(Weak::upgrade).collect()
        };
        if !live.is_empty() {
            tracing::trace!(
                logger = %self.name,
                threshold = level,
                children = live.len(),
                "propagating level"
            );
        }
        for child in live {
            child.apply_level(level, traceback_limit);
        }
    }
}

/// A named logger.
///
/// Loggers with the same name in the same registry share one handler, so a
/// level set through one is seen by all of them. Levels set here also flow
/// to every logger spawned from this one that is still alive.
///
/// # Example
///
/// ```
/// use loggable::Loggable;
///
/// let log = Loggable::new("worker");
/// log.set_verbose(true, 0);
/// log.info("ready").debug("not shown at INFO");
/// ```
#[derive(Debug)]
pub struct Loggable {
    core: Arc<Core>,
}

impl Loggable {
    /// Logger in the global registry with the default configuration
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, LoggableConfig::default())
    }

    /// Logger named after `object`'s type and address, see [`super::identity_of`]
    #[must_use]
    pub fn for_object<T: ?Sized>(object: &T) -> Self {
        Self::new(super::identity_of(object))
    }

    /// Logger in the global registry
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: LoggableConfig) -> Self {
        Self::with_registry(name, config, HandlerRegistry::global())
    }

    /// Logger in a specific registry
    #[must_use]
    pub fn with_registry(
        name: impl Into<String>,
        config: LoggableConfig,
        registry: HandlerRegistry,
    ) -> Self {
        let name = name.into();
        let handler = registry.resolve(&name, &config.handler_spec());
        Self {
            core: Arc::new(Core {
                name,
                config,
                registry,
                handler,
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Identity of this logger
    #[must_use]
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Configuration this logger was built with
    #[must_use]
    pub fn config(&self) -> &LoggableConfig {
        &self.core.config
    }

    /// Registry this logger emits through
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.core.registry
    }

    /// Log `message` at `level`.
    pub fn log(&self, message: impl Display, level: impl Into<LevelSpec>) -> Result<&Self> {
        let level = resolve_level(level)?;
        self.emit(&message.to_string(), level);
        Ok(self)
    }

    pub(crate) fn emit(&self, message: &str, level: u32) {
        let record = Record::new(self.name(), level, message);
        self.core.registry.dispatch(self.name(), &record);

        let passes = self
            .core
            .registry
            .logger_level(self.name())
            .is_some_and(|threshold| level >= threshold);
        if passes && self.enabled_for(level) {
            self.core
                .handler
                .write_traceback(self.core.handler.traceback_limit());
        }
    }

    /// Log at CRITICAL
    pub fn critical(&self, message: impl Display) -> &Self {
        self.emit(&message.to_string(), Severity::Critical.rank());
        self
    }

    /// Log at ERROR
    pub fn error(&self, message: impl Display) -> &Self {
        self.emit(&message.to_string(), Severity::Error.rank());
        self
    }

    /// Log at WARNING
    pub fn warn(&self, message: impl Display) -> &Self {
        self.emit(&message.to_string(), Severity::Warning.rank());
        self
    }

    /// Log at INFO
    pub fn info(&self, message: impl Display) -> &Self {
        self.emit(&message.to_string(), Severity::Info.rank());
        self
    }

    /// Log at DEBUG
    pub fn debug(&self, message: impl Display) -> &Self {
        self.emit(&message.to_string(), Severity::Debug.rank());
        self
    }

    /// Set the threshold here and on every live spawned logger.
    pub fn set_level(&self, level: impl Into<LevelSpec>) -> Result<&Self> {
        let level = resolve_level(level)?;
        self.core.apply_level(level, None);
        Ok(self)
    }

    /// [`set_level`](Self::set_level), also changing the number of stack
    /// frames written after each record (0 disables).
    pub fn set_level_with_traceback(
        &self,
        level: impl Into<LevelSpec>,
        traceback_limit: usize,
    ) -> Result<&Self> {
        let level = resolve_level(level)?;
        self.core.apply_level(level, Some(traceback_limit));
        Ok(self)
    }

    /// INFO when `verbose`, ERROR otherwise
    pub fn set_verbose(&self, verbose: bool, traceback_limit: usize) -> &Self {
        let level = if verbose {
            Severity::Info
        } else {
            Severity::Error
        };
        self.core.apply_level(level.rank(), Some(traceback_limit));
        self
    }

    /// Whether a message at `level` would be written
    pub fn is_enabled(&self, level: impl Into<LevelSpec>) -> Result<bool> {
        Ok(self.enabled_for(resolve_level(level)?))
    }

    pub(crate) fn enabled_for(&self, level: u32) -> bool {
        level >= self.threshold()
    }

    /// Current threshold of this logger's handler
    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.core.handler.level()
    }

    /// Stack frames written after each record
    #[must_use]
    pub fn traceback_limit(&self) -> usize {
        self.core.handler.traceback_limit()
    }

    /// Render nested data for display, condensing long lists.
    pub fn pprint_data<T: Serialize + ?Sized>(
        &self,
        data: &T,
        options: &PrettyOptions,
    ) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let condensed = condense_long_lists(&value, options.max_list_len);
        Ok(pformat(&condensed, options))
    }

    /// Log [`pprint_data`](Self::pprint_data) output with default options
    pub fn pprint<T: Serialize + ?Sized>(
        &self,
        data: &T,
        level: impl Into<LevelSpec>,
    ) -> Result<&Self> {
        let level = resolve_level(level)?;
        let text = self.pprint_data(data, &PrettyOptions::default())?;
        self.emit(&text, level);
        Ok(self)
    }

    /// Wrap `iterable` in a progress bar when `level` is enabled; otherwise
    /// return it untouched. Iteration yields the same items either way.
    pub fn tqdm<T: IntoIterator>(
        &self,
        iterable: T,
        level: impl Into<LevelSpec>,
        desc: Option<&str>,
    ) -> Result<MaybeProgress<T::IntoIter>> {
        let level = resolve_level(level)?;
        Ok(self.wrap_iter(iterable, level, desc))
    }

    pub(crate) fn wrap_iter<T: IntoIterator>(
        &self,
        iterable: T,
        level: u32,
        desc: Option<&str>,
    ) -> MaybeProgress<T::IntoIter> {
        if self.enabled_for(level) {
            let desc = progress::leveled_description(level, desc);
            progress::wrap(iterable, self.core.config.progress.as_ref(), &desc)
        } else {
            MaybeProgress::Plain(iterable.into_iter())
        }
    }

    /// Independent logger with this configuration and threshold.
    ///
    /// Keeping the name shares this logger's handler; a new name gets its own.
    #[must_use]
    pub fn copy(&self, name: Option<&str>) -> Self {
        let copy = Self::with_registry(
            name.unwrap_or(self.name()),
            self.core.config.clone(),
            self.core.registry.clone(),
        );
        copy.core.apply_level(self.threshold(), None);
        copy
    }

    /// Like [`copy`](Self::copy), but the new logger follows this one's level changes
    #[must_use]
    pub fn spawn(&self, name: Option<&str>) -> Self {
        let child = self.copy(name);
        self.adopt(&child);
        child
    }

    /// Timed scope locked to `level`; follows this logger's level changes
    pub fn timeit(&self, level: impl Into<LevelSpec>, prefix: &str) -> Result<TimedLoggable> {
        let level = resolve_level(level)?;
        let base = self.spawn(Some(&renamed(TimedLoggable::KIND, self.name())));
        Ok(TimedLoggable::new(LockedLoggable::from_rank(base, level), prefix))
    }

    /// Progress tracker locked to `level`; follows this logger's level changes
    pub fn track(
        &self,
        level: impl Into<LevelSpec>,
        total: Option<u64>,
        desc: Option<&str>,
    ) -> Result<ProgressLoggable> {
        let level = resolve_level(level)?;
        let base = self.spawn(Some(&renamed(ProgressLoggable::KIND, self.name())));
        Ok(ProgressLoggable::new(
            LockedLoggable::from_rank(base, level),
            total,
            desc,
        ))
    }

    /// Number of spawned loggers still alive
    #[must_use]
    pub fn live_children(&self) -> usize {
        self.core
            .children
            .lock()
            .iter()
            .filter(|c| c.strong_count() > 0)
            .count()
    }

    fn adopt(&self, child: &Self) {
        let mut children = self.core.children.lock();
        children.retain(|c| c.strong_count() > 0);
        children.push(Arc::downgrade(&child.core));
    }

    pub(crate) fn apply_level(&self, level: u32, traceback_limit: Option<usize>) {
        self.core.apply_level(level, traceback_limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoggableError;
    use crate::testutil::capture;
    use serde_json::json;

    #[test]
    fn test_log_respects_threshold() {
        let (factory, buffer) = capture();
        let log = factory.create("test");

        log.set_level("WARNING").unwrap();
        log.info("hidden").warn("visible").error("also visible");

        let out = buffer.take();
        assert!(!out.contains("hidden"));
        assert!(out.contains("WARNING - test - "));
        assert!(out.contains("visible"));
        assert!(out.contains("ERROR"));
    }

    #[test]
    fn test_every_level_logs_when_enabled() {
        let (factory, buffer) = capture();
        let log = factory.create("test");
        for severity in Severity::ALL {
            log.set_level(severity).unwrap();
            log.log("msg", severity.name().to_lowercase()).unwrap();
            let out = buffer.take();
            assert!(out.contains(severity.name()), "{severity}: {out}");
            assert!(out.contains("msg"));
        }
    }

    #[test]
    fn test_above_critical_silences_everything() {
        let (factory, buffer) = capture();
        let log = factory.create("test");
        log.set_level(Severity::Critical.rank() + 1).unwrap();
        log.critical("nope").error("nope").warn("nope").info("nope").debug("nope");
        assert!(buffer.take().is_empty());
    }

    #[test]
    fn test_unknown_level_is_an_error() {
        let (factory, _) = capture();
        let log = factory.create("test");
        assert!(matches!(
            log.log("x", "loud"),
            Err(LoggableError::UnrecognizedLevel(_))
        ));
        assert!(log.set_level("chatty").is_err());
        assert!(log.is_enabled("nope").is_err());
    }

    #[test]
    fn test_set_verbose() {
        let (factory, _) = capture();
        let log = factory.create("test");
        log.set_verbose(true, 0);
        assert_eq!(log.threshold(), Severity::Info.rank());
        log.set_verbose(false, 0);
        assert_eq!(log.threshold(), Severity::Error.rank());
    }

    #[test]
    fn test_same_name_shares_threshold() {
        let (factory, _) = capture();
        let a = factory.create("shared");
        let b = factory.create("shared");
        a.set_level("DEBUG").unwrap();
        assert!(b.is_enabled("debug").unwrap());
        b.set_level("ERROR").unwrap();
        assert!(!a.is_enabled("warning").unwrap());
    }

    #[test]
    fn test_spawned_child_follows_parent() {
        let (factory, _) = capture();
        let parent = factory.create("parent");
        let child = parent.spawn(Some("child"));

        parent.set_level("DEBUG").unwrap();
        assert!(child.is_enabled("DEBUG").unwrap());

        parent.set_level("CRITICAL").unwrap();
        assert!(!child.is_enabled("ERROR").unwrap());
        assert!(child.is_enabled("CRITICAL").unwrap());
    }

    #[test]
    fn test_child_does_not_propagate_to_parent() {
        let (factory, _) = capture();
        let parent = factory.create("parent");
        parent.set_level("ERROR").unwrap();
        let child = parent.spawn(Some("child"));
        child.set_level("DEBUG").unwrap();
        assert_eq!(parent.threshold(), Severity::Error.rank());
    }

    #[test]
    fn test_propagation_is_transitive() {
        let (factory, _) = capture();
        let root = factory.create("root");
        let mid = root.spawn(Some("mid"));
        let leaf = mid.spawn(Some("leaf"));
        root.set_level("INFO").unwrap();
        assert_eq!(leaf.threshold(), Severity::Info.rank());
    }

    #[test]
    fn test_dropped_child_is_forgotten() {
        let (factory, _) = capture();
        let parent = factory.create("parent");
        let child = parent.spawn(Some("child"));
        assert_eq!(parent.live_children(), 1);
        drop(child);
        assert_eq!(parent.live_children(), 0);
        parent.set_level("INFO").unwrap();
    }

    #[test]
    fn test_dropped_children_do_not_accumulate() {
        let (factory, _) = capture();
        let parent = factory.create("parent");
        for _ in 0..1000 {
            drop(parent.timeit("INFO", "").unwrap());
            drop(parent.track("INFO", None, None).unwrap());
            drop(parent.spawn(Some("child")));
        }
        let kept = parent.spawn(Some("kept"));
        assert_eq!(parent.core.children.lock().len(), 1);
        assert_eq!(parent.live_children(), 1);
        drop(kept);
    }

    #[test]
    fn test_copy_reapplies_threshold_without_linking() {
        let (factory, _) = capture();
        let original = factory.create("original");
        original.set_level("WARNING").unwrap();

        let copy = original.copy(Some("copy"));
        assert_eq!(copy.threshold(), Severity::Warning.rank());
        assert_eq!(original.live_children(), 0);

        original.set_level("DEBUG").unwrap();
        assert_eq!(copy.threshold(), Severity::Warning.rank());
    }

    #[test]
    fn test_copy_with_same_name_shares_handler() {
        let (factory, _) = capture();
        let original = factory.create("same");
        let copy = original.copy(None);
        assert_eq!(copy.name(), "same");
        copy.set_level("DEBUG").unwrap();
        assert_eq!(original.threshold(), Severity::Debug.rank());
    }

    #[test]
    fn test_set_level_with_traceback_propagates_limit() {
        let (factory, buffer) = capture();
        let parent = factory.create("parent");
        let child = parent.spawn(Some("child"));
        parent.set_level_with_traceback("INFO", 3).unwrap();
        assert_eq!(child.traceback_limit(), 3);

        child.info("with stack");
        let out = buffer.take();
        assert!(out.contains("with stack"));
        assert!(out.contains("Stack (most recent call first):"));
    }

    #[test]
    fn test_traceback_skipped_when_filtered() {
        let (factory, buffer) = capture();
        let log = factory.create("quiet");
        log.set_level_with_traceback("ERROR", 5).unwrap();
        log.info("filtered");
        assert!(buffer.take().is_empty());
    }

    #[test]
    fn test_pprint_data_condenses() {
        let (factory, _) = capture();
        let log = factory.create("test");
        let data = json!({"items": (0..50).collect::<Vec<_>>()});
        let text = log.pprint_data(&data, &PrettyOptions::default()).unwrap();
        assert!(text.contains("..."));
        assert!(text.contains("49"));
        assert!(!text.contains("25,"));
    }

    #[test]
    fn test_pprint_logs_block() {
        let (factory, buffer) = capture();
        let log = factory.create("test");
        log.set_level("INFO").unwrap();
        log.pprint(&json!({"a": 1}), "INFO").unwrap();
        assert!(buffer.take().contains(r#"{"a": 1}"#));
    }

    #[test]
    fn test_tqdm_wraps_only_when_enabled() {
        let (factory, _) = capture();
        let log = factory.create("test");
        log.set_level("WARNING").unwrap();

        let plain = log.tqdm(0..10, "INFO", Some("desc")).unwrap();
        assert!(!plain.is_tracked());
        assert_eq!(plain.sum::<i32>(), 45);

        let tracked = log.tqdm(0..10, "ERROR", Some("desc")).unwrap();
        assert!(tracked.is_tracked());
        assert_eq!(tracked.sum::<i32>(), 45);
    }
}
