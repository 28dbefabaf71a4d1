//! Text formatting
//!
//! Message templates, severity colors and pretty-printing of nested data.

pub mod color;
pub mod pretty;
pub mod template;

pub use color::{ColorMap, ColorSpec};
pub use pretty::{condense_long_lists, pformat, PrettyOptions, CONDENSED_MARKER};
pub use template::{expand_template, DEFAULT_FORMAT};
