//! Shared test utilities
//!
//! Common helpers used across test modules. Only compiled in test builds.

use std::sync::Arc;

use crate::log::{HandlerRegistry, SharedBuffer, Sink};
use crate::loggable::{LoggableConfig, LoggableFactory};
use crate::progress::HiddenProgress;

/// A factory writing plain text into the returned buffer.
///
/// Uses a private registry, so tests never share logger state, and hidden
/// progress bars, so nothing is drawn.
#[must_use]
pub fn capture() -> (LoggableFactory, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let registry = HandlerRegistry::with_sink(Sink::Buffer(buffer.clone()));
    let config = LoggableConfig::default().with_progress(Arc::new(HiddenProgress));
    (LoggableFactory::with_registry(config, registry), buffer)
}
