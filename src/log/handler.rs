//! Output handlers
//!
//! A [`Handler`] filters records by its own threshold and writes the ones
//! that pass. [`StreamHandler`] is the kind the registry manages; any other
//! implementation can be attached alongside it, e.g. [`TracingHandler`].

use std::backtrace::Backtrace;
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::format::template::{expand_template, record_vars, split_color};
use crate::format::ColorMap;
use crate::level::Severity;
use crate::log::Record;
use crate::progress;

/// Threshold of a freshly created managed handler
pub const DEFAULT_THRESHOLD: u32 = Severity::Error.rank();

/// Receives records for one logger identity
pub trait Handler: Send + Sync {
    /// Current threshold
    fn level(&self) -> u32;

    /// Replace the threshold
    fn set_level(&self, level: u32);

    /// Write a record unconditionally
    fn emit(&self, record: &Record);

    /// Write `record` if it passes this handler's threshold
    fn handle(&self, record: &Record) {
        if record.level >= self.level() {
            self.emit(record);
        }
    }
}

/// In-memory text buffer, shareable between a sink and a reader
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<String>>);

impl SharedBuffer {
    /// Empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    #[must_use]
    pub fn contents(&self) -> String {
        self.0.lock().clone()
    }

    /// Return and clear everything written so far
    #[must_use]
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.0.lock())
    }

    fn push_line(&self, text: &str) {
        let mut buf = self.0.lock();
        buf.push_str(text);
        buf.push('\n');
    }
}

/// Where a managed handler writes
#[derive(Debug, Clone, Default)]
pub enum Sink {
    /// Standard error, interleaved safely with progress bars
    #[default]
    Stderr,
    /// Captured text without colors
    Buffer(SharedBuffer),
}

impl Sink {
    /// Whether lines written here get ANSI colors
    #[must_use]
    pub const fn colorizes(&self) -> bool {
        matches!(self, Self::Stderr)
    }

    /// Write one line (a newline is appended)
    pub fn write_line(&self, text: &str) -> io::Result<()> {
        match self {
            Self::Stderr => progress::suspend(|| {
                let mut stderr = io::stderr().lock();
                writeln!(stderr, "{text}")?;
                stderr.flush()
            }),
            Self::Buffer(buffer) => {
                buffer.push_line(text);
                Ok(())
            }
        }
    }
}

/// Format and colors used when a managed handler is first created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    /// Line template, see [`crate::format::template`]
    pub format: String,
    /// Severity colors
    pub colors: ColorMap,
}

/// The managed handler: renders the template, colors it and writes to a sink
#[derive(Debug)]
pub struct StreamHandler {
    spec: HandlerSpec,
    sink: Sink,
    level: AtomicU32,
    traceback_limit: AtomicUsize,
}

impl StreamHandler {
    /// New handler at [`DEFAULT_THRESHOLD`] with traceback depth 0
    #[must_use]
    pub const fn new(spec: HandlerSpec, sink: Sink) -> Self {
        Self {
            spec,
            sink,
            level: AtomicU32::new(DEFAULT_THRESHOLD),
            traceback_limit: AtomicUsize::new(0),
        }
    }

    /// The format and colors this handler was created with
    #[must_use]
    pub const fn spec(&self) -> &HandlerSpec {
        &self.spec
    }

    /// Number of stack frames written after each emitted record
    #[must_use]
    pub fn traceback_limit(&self) -> usize {
        self.traceback_limit.load(Ordering::Relaxed)
    }

    /// Set the number of stack frames written after each emitted record
    pub fn set_traceback_limit(&self, limit: usize) {
        self.traceback_limit.store(limit, Ordering::Relaxed);
    }

    /// Render a record to a single line
    #[must_use]
    pub fn format(&self, record: &Record) -> String {
        let vars = record_vars(
            &record.name,
            record.level,
            &record.timestamp,
            &record.message,
        );
        let (plain, colored) = split_color(&self.spec.format);
        let mut line = expand_template(plain, &vars);
        if let Some(colored) = colored {
            let body = expand_template(colored, &vars);
            match self.spec.colors.for_rank(record.level) {
                Some(color) if self.sink.colorizes() => {
                    line.push_str(&color.paint(&body).to_string());
                }
                _ => line.push_str(&body),
            }
        }
        line
    }

    /// Write the caller's stack, innermost first, limited to `limit` frames
    pub fn write_traceback(&self, limit: usize) {
        if limit == 0 {
            return;
        }
        let trace = Backtrace::force_capture().to_string();
        let frames = caller_frames(&trace, limit);
        let text = format!("Stack (most recent call first):\n{}", frames.join("\n"));
        self.write(&text);
    }

    fn write(&self, text: &str) {
        if let Err(err) = self.sink.write_line(text) {
            report_write_error(&err);
        }
    }
}

impl Handler for StreamHandler {
    fn level(&self) -> u32 {
        self.level.load(Ordering::Relaxed)
    }

    fn set_level(&self, level: u32) {
        self.level.store(level, Ordering::Relaxed);
    }

    fn emit(&self, record: &Record) {
        let line = self.format(record);
        self.write(&line);
    }
}

/// Best-effort report of a failed write. Never panics.
fn report_write_error(err: &io::Error) {
    let _ = writeln!(io::stderr(), "--- Logging error ---\n{err}");
}

/// Split a rendered backtrace into frames, dropping the capture machinery
/// and this crate's own emission frames, and keep the first `limit`.
fn caller_frames(trace: &str, limit: usize) -> Vec<String> {
    let mut frames: Vec<String> = Vec::new();
    for line in trace.lines() {
        let trimmed = line.trim_start();
        let is_header = trimmed
            .split_once(": ")
            .is_some_and(|(idx, _)| !idx.is_empty() && idx.chars().all(|c| c.is_ascii_digit()));
        if is_header {
            frames.push(line.to_string());
        } else if let Some(last) = frames.last_mut() {
            last.push('\n');
            last.push_str(line);
        }
    }

    frames
        .into_iter()
        .skip_while(|frame| {
            let symbol = frame
                .lines()
                .next()
                .and_then(|l| l.split_once(": "))
                .map_or("", |(_, s)| s);
            symbol.starts_with("std::backtrace")
                || symbol.starts_with("loggable::log::")
                || symbol.starts_with("loggable::loggable::base::")
                || symbol.starts_with("loggable::loggable::scoped::")
        })
        .take(limit)
        .collect()
}

/// Forwards records to the `tracing` facility so a host subscriber sees them
#[derive(Debug, Default)]
pub struct TracingHandler {
    level: AtomicU32,
}

impl TracingHandler {
    /// Forward everything; the host subscriber does its own filtering
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: AtomicU32::new(0),
        }
    }
}

impl Handler for TracingHandler {
    fn level(&self) -> u32 {
        self.level.load(Ordering::Relaxed)
    }

    fn set_level(&self, level: u32) {
        self.level.store(level, Ordering::Relaxed);
    }

    fn emit(&self, record: &Record) {
        let logger = record.name.as_str();
        let message = record.message.as_str();
        match Severity::floor(record.level) {
            Some(Severity::Critical | Severity::Error) => {
                tracing::error!(logger, rank = record.level, "{message}");
            }
            Some(Severity::Warning) => tracing::warn!(logger, "{message}"),
            Some(Severity::Info) => tracing::info!(logger, "{message}"),
            Some(Severity::Debug) => tracing::debug!(logger, "{message}"),
            None => tracing::trace!(logger, rank = record.level, "{message}"),
        }
    }
}

/// A handler attached to a logger identity.
///
/// Only `Managed` handlers are returned by registry lookups; `External`
/// ones still receive every record and every level change.
#[derive(Clone)]
pub enum HandlerSlot {
    /// Created and owned by the registry
    Managed(Arc<StreamHandler>),
    /// Attached by the host program
    External(Arc<dyn Handler>),
}

impl HandlerSlot {
    /// Common handler interface of either kind
    #[must_use]
    pub fn handler(&self) -> &dyn Handler {
        match self {
            Self::Managed(h) => h.as_ref(),
            Self::External(h) => h.as_ref(),
        }
    }

    /// The managed handler, if this slot holds one
    #[must_use]
    pub const fn managed(&self) -> Option<&Arc<StreamHandler>> {
        match self {
            Self::Managed(h) => Some(h),
            Self::External(_) => None,
        }
    }
}

impl fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Managed(h) => f.debug_tuple("Managed").field(h).finish(),
            Self::External(h) => f
                .debug_struct("External")
                .field("level", &h.level())
                .finish_non_exhaustive(),
        }
    }
}
