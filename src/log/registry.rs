//! Handler registry keyed by logger identity
//!
//! Each identity gets at most one managed [`StreamHandler`], created lazily on
//! first lookup and kept for the lifetime of the registry. Every
//! [`Loggable`](crate::Loggable) sharing an identity therefore shares its
//! threshold and formatting.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::handler::{Handler, HandlerSlot, HandlerSpec, Sink, StreamHandler};
use super::Record;

/// Process-wide registry writing to stderr
static GLOBAL: Lazy<HandlerRegistry> = Lazy::new(HandlerRegistry::new);

/// Per-identity logger state
#[derive(Debug)]
struct LoggerEntry {
    /// Pass-through threshold checked before any handler
    level: u32,
    handlers: Vec<HandlerSlot>,
}

impl LoggerEntry {
    const fn new() -> Self {
        Self {
            level: 0,
            handlers: Vec::new(),
        }
    }

    fn managed(&self) -> Option<&Arc<StreamHandler>> {
        self.handlers.iter().find_map(HandlerSlot::managed)
    }
}

/// Registry of loggers and their handlers.
///
/// Cloning is cheap and clones share state. Use [`HandlerRegistry::global`]
/// for the process-wide instance, or build a private one (e.g. with a
/// [`Sink::Buffer`]) to keep tests isolated.
#[derive(Clone)]
pub struct HandlerRegistry {
    loggers: Arc<Mutex<HashMap<String, LoggerEntry>>>,
    sink: Sink,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Empty registry whose handlers write to stderr
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Sink::Stderr)
    }

    /// Empty registry whose handlers write to `sink`
    #[must_use]
    pub fn with_sink(sink: Sink) -> Self {
        Self {
            loggers: Arc::new(Mutex::new(HashMap::new())),
            sink,
        }
    }

    /// The process-wide registry, created on first use
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Where newly created handlers write
    #[must_use]
    pub const fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Managed handler for `identity`, creating it from `spec` on first lookup.
    ///
    /// Later lookups return the existing handler and ignore `spec`.
    pub fn resolve(&self, identity: &str, spec: &HandlerSpec) -> Arc<StreamHandler> {
        let mut loggers = self.loggers.lock();
        let entry = loggers
            .entry(identity.to_string())
            .or_insert_with(LoggerEntry::new);

        if let Some(handler) = entry.managed() {
            return Arc::clone(handler);
        }

        let handler = Arc::new(StreamHandler::new(spec.clone(), self.sink.clone()));
        entry.handlers.push(HandlerSlot::Managed(Arc::clone(&handler)));
        tracing::debug!(identity, "created managed handler");
        handler
    }

    /// Attach an external handler; it receives records and level changes
    /// but is never returned by [`resolve`](Self::resolve).
    pub fn attach(&self, identity: &str, handler: Arc<dyn Handler>) {
        let mut loggers = self.loggers.lock();
        loggers
            .entry(identity.to_string())
            .or_insert_with(LoggerEntry::new)
            .handlers
            .push(HandlerSlot::External(handler));
    }

    /// Set the logger threshold and every handler's threshold. When
    /// `traceback_limit` is given, managed handlers take it too.
    pub fn set_level(&self, identity: &str, level: u32, traceback_limit: Option<usize>) {
        let mut loggers = self.loggers.lock();
        let entry = loggers
            .entry(identity.to_string())
            .or_insert_with(LoggerEntry::new);
        entry.level = level;
        for slot in &entry.handlers {
            slot.handler().set_level(level);
            if let (Some(limit), Some(managed)) = (traceback_limit, slot.managed()) {
                managed.set_traceback_limit(limit);
            }
        }
    }

    /// Hand `record` to every handler of `identity` if the logger passes it.
    ///
    /// The registry lock is released before handlers run.
    pub fn dispatch(&self, identity: &str, record: &Record) {
        let handlers: Vec<HandlerSlot> = {
            let loggers = self.loggers.lock();
            match loggers.get(identity) {
                Some(entry) if record.level >= entry.level => entry.handlers.clone(),
                _ => return,
            }
        };
        for slot in &handlers {
            slot.handler().handle(record);
        }
    }

    /// Logger-level threshold, if the identity is known
    #[must_use]
    pub fn logger_level(&self, identity: &str) -> Option<u32> {
        self.loggers.lock().get(identity).map(|e| e.level)
    }

    /// Threshold of the identity's managed handler, if it has one
    #[must_use]
    pub fn threshold(&self, identity: &str) -> Option<u32> {
        self.loggers
            .lock()
            .get(identity)
            .and_then(LoggerEntry::managed)
            .map(|h| h.level())
    }

    /// Traceback depth of the identity's managed handler, if it has one
    #[must_use]
    pub fn traceback_limit(&self, identity: &str) -> Option<usize> {
        self.loggers
            .lock()
            .get(identity)
            .and_then(LoggerEntry::managed)
            .map(|h| h.traceback_limit())
    }

    /// Number of handlers attached to an identity, of any kind
    #[must_use]
    pub fn handler_count(&self, identity: &str) -> usize {
        self.loggers
            .lock()
            .get(identity)
            .map_or(0, |e| e.handlers.len())
    }

    /// All known identities, sorted
    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("loggers", &self.loggers.lock().len())
            .field("sink", &self.sink)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ColorMap, DEFAULT_FORMAT};
    use crate::log::handler::{SharedBuffer, TracingHandler, DEFAULT_THRESHOLD};

    fn spec(format: &str) -> HandlerSpec {
        HandlerSpec {
            format: format.to_string(),
            colors: ColorMap::default(),
        }
    }

    fn buffered() -> (HandlerRegistry, SharedBuffer) {
        let buffer = SharedBuffer::new();
        (HandlerRegistry::with_sink(Sink::Buffer(buffer.clone())), buffer)
    }

    #[test]
    fn test_resolve_creates_once() {
        let (registry, _) = buffered();
        let first = registry.resolve("a", &spec(DEFAULT_FORMAT));
        let second = registry.resolve("a", &spec("{message}"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.spec().format, DEFAULT_FORMAT);
        assert_eq!(registry.handler_count("a"), 1);
        assert_eq!(registry.logger_level("a"), Some(0));
        assert_eq!(registry.threshold("a"), Some(DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_distinct_identities_get_distinct_handlers() {
        let (registry, _) = buffered();
        let a = registry.resolve("a", &spec(DEFAULT_FORMAT));
        let b = registry.resolve("b", &spec(DEFAULT_FORMAT));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.identities(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_external_handler_is_not_resolved() {
        let (registry, _) = buffered();
        registry.attach("a", Arc::new(TracingHandler::new()));
        let managed = registry.resolve("a", &spec(DEFAULT_FORMAT));
        assert_eq!(registry.handler_count("a"), 2);
        assert!(Arc::ptr_eq(&managed, &registry.resolve("a", &spec("{message}"))));
    }

    #[test]
    fn test_set_level_reaches_every_handler() {
        let (registry, _) = buffered();
        let external = Arc::new(TracingHandler::new());
        registry.attach("a", external.clone());
        let managed = registry.resolve("a", &spec(DEFAULT_FORMAT));

        registry.set_level("a", 20, Some(4));

        assert_eq!(managed.level(), 20);
        assert_eq!(managed.traceback_limit(), 4);
        assert_eq!(external.level(), 20);
        assert_eq!(registry.logger_level("a"), Some(20));
    }

    #[test]
    fn test_set_level_without_traceback_keeps_limit() {
        let (registry, _) = buffered();
        let managed = registry.resolve("a", &spec(DEFAULT_FORMAT));
        registry.set_level("a", 10, Some(2));
        registry.set_level("a", 30, None);
        assert_eq!(managed.traceback_limit(), 2);
        assert_eq!(registry.traceback_limit("a"), Some(2));
        assert_eq!(registry.traceback_limit("b"), None);
        assert_eq!(managed.level(), 30);
    }

    #[test]
    fn test_dispatch_respects_thresholds() {
        let (registry, buffer) = buffered();
        registry.resolve("a", &spec("{LEVEL} {message}"));
        registry.set_level("a", 30, None);

        registry.dispatch("a", &Record::new("a", 20, "quiet"));
        registry.dispatch("a", &Record::new("a", 40, "loud"));
        registry.dispatch("unknown", &Record::new("unknown", 50, "nobody"));

        assert_eq!(buffer.take(), "ERROR loud\n");
    }

    #[test]
    fn test_global_is_shared() {
        let a = HandlerRegistry::global();
        let b = HandlerRegistry::global();
        a.resolve("registry-test-global", &spec(DEFAULT_FORMAT));
        assert!(b.identities().contains(&"registry-test-global".to_string()));
    }
}
