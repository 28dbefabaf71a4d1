//! Progress bar engine
//!
//! All bars are attached to one process-wide [`MultiProgress`], and every
//! console log line is written through [`suspend`] so that log output and
//! active bars do not corrupt each other.

use std::fmt;

use indicatif::{MultiProgress, ProgressBar, ProgressBarIter, ProgressIterator, ProgressStyle};
use once_cell::sync::Lazy;

use crate::level::level_name;

static MULTI: Lazy<MultiProgress> = Lazy::new(MultiProgress::new);

const BAR_TEMPLATE: &str = "{prefix} {wide_bar} {pos}/{len} [{elapsed_precise}<{eta_precise}]";
const SPINNER_TEMPLATE: &str = "{prefix} {spinner} {pos} [{elapsed_precise}]";

/// Run `f` with all active progress bars hidden, then redraw them.
pub fn suspend<F: FnOnce() -> R, R>(f: F) -> R {
    MULTI.suspend(f)
}

/// Progress description prefixed with the level name, right-aligned to 8 columns
#[must_use]
pub fn leveled_description(rank: u32, desc: Option<&str>) -> String {
    let level = level_name(rank);
    match desc {
        Some(desc) if !desc.is_empty() => format!("{level:>8}: {desc}"),
        _ => format!("{level:>8}"),
    }
}

/// Creates progress bars for trackers and wrapped iterables
pub trait ProgressFactory: Send + Sync + fmt::Debug {
    /// Create a bar sized to `total` (a spinner when unknown) labelled `desc`
    fn create(&self, total: Option<u64>, desc: &str) -> ProgressBar;
}

/// Console bars drawn on stderr through the shared [`MultiProgress`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress;

impl ProgressFactory for ConsoleProgress {
    fn create(&self, total: Option<u64>, desc: &str) -> ProgressBar {
        let (bar, template) = match total {
            Some(len) => (ProgressBar::new(len), BAR_TEMPLATE),
            None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE),
        };
        let style = ProgressStyle::with_template(template).unwrap_or_else(|_| {
            if total.is_some() {
                ProgressStyle::default_bar()
            } else {
                ProgressStyle::default_spinner()
            }
        });
        bar.set_style(style);
        bar.set_prefix(desc.to_string());
        MULTI.add(bar)
    }
}

/// Bars that never draw; positions are still tracked
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenProgress;

impl ProgressFactory for HiddenProgress {
    fn create(&self, total: Option<u64>, desc: &str) -> ProgressBar {
        let bar = ProgressBar::hidden();
        if let Some(len) = total {
            bar.set_length(len);
        }
        bar.set_prefix(desc.to_string());
        bar
    }
}

/// An iterable that may or may not be reporting progress.
///
/// Both variants yield exactly the items of the wrapped iterator.
pub enum MaybeProgress<I> {
    /// Untouched iterator
    Plain(I),
    /// Iterator advancing a progress bar
    Tracked(ProgressBarIter<I>),
}

impl<I> MaybeProgress<I> {
    /// Whether a progress bar is attached
    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        matches!(self, Self::Tracked(_))
    }
}

impl<I: Iterator> Iterator for MaybeProgress<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Plain(it) => it.next(),
            Self::Tracked(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Plain(it) => it.size_hint(),
            Self::Tracked(it) => it.size_hint(),
        }
    }
}

impl<I> fmt::Debug for MaybeProgress<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaybeProgress")
            .field("tracked", &self.is_tracked())
            .finish_non_exhaustive()
    }
}

/// Wrap `iterable` in a bar from `factory`, sized from its exact size hint.
pub fn wrap<T: IntoIterator>(
    iterable: T,
    factory: &dyn ProgressFactory,
    desc: &str,
) -> MaybeProgress<T::IntoIter> {
    let iter = iterable.into_iter();
    let total = match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => u64::try_from(upper).ok(),
        _ => None,
    };
    let bar = factory.create(total, desc);
    MaybeProgress::Tracked(iter.progress_with(bar))
}
