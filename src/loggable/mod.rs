//! Named logging façades
//!
//! [`Loggable`] is the entry point. It spawns related loggers that follow
//! its level changes: plain children ([`Loggable::spawn`]), timed scopes
//! ([`Loggable::timeit`]) and progress trackers ([`Loggable::track`]).

pub mod base;
pub mod factory;
pub mod scoped;
pub mod timed;
pub mod tracker;

use std::sync::Arc;

pub use base::Loggable;
pub use factory::LoggableFactory;
pub use scoped::{LockedLoggable, ScopeGuard, ScopeState, Scoped};
pub use timed::TimedLoggable;
pub use tracker::ProgressLoggable;

use crate::format::{ColorMap, DEFAULT_FORMAT};
use crate::log::HandlerSpec;
use crate::progress::{ConsoleProgress, ProgressFactory};

/// Configuration shared by a logger and everything it spawns
#[derive(Debug, Clone)]
pub struct LoggableConfig {
    /// Line template for the managed handler
    pub format: String,
    /// Severity colors for the managed handler
    pub colors: ColorMap,
    /// Creates bars for `tqdm` and trackers
    pub progress: Arc<dyn ProgressFactory>,
}

impl Default for LoggableConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            colors: ColorMap::default(),
            progress: Arc::new(ConsoleProgress),
        }
    }
}

impl LoggableConfig {
    /// Replace the line template
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Replace the color mapping
    #[must_use]
    pub fn with_colors(mut self, colors: ColorMap) -> Self {
        self.colors = colors;
        self
    }

    /// Replace the progress bar factory
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressFactory>) -> Self {
        self.progress = progress;
        self
    }

    pub(crate) fn handler_spec(&self) -> HandlerSpec {
        HandlerSpec {
            format: self.format.clone(),
            colors: self.colors.clone(),
        }
    }
}

/// Logger identity for an arbitrary object: `"<TypeName>(id=<address>)"`.
///
/// The same object always yields the same identity; two live objects of
/// non-zero size never share one.
#[must_use]
pub fn identity_of<T: ?Sized>(object: &T) -> String {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    let short = path.rsplit("::").next().unwrap_or(path);
    let address = std::ptr::from_ref(object).cast::<()>() as usize;
    format!("{short}(id={address:#x})")
}

/// Display name of a specialised logger: `Kind(name)`
pub(crate) fn renamed(kind: &str, name: &str) -> String {
    format!("{kind}({name})")
}
