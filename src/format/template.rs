//! Message template expansion.
//!
//! Supports `{key}` syntax. Unknown keys are left as-is.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::level::level_name;

/// Default line layout for emitted records
pub const DEFAULT_FORMAT: &str = "{color}{LEVEL} - {name} - {timestamp} - {message}";

/// Key marking where colored output begins
pub const COLOR_KEY: &str = "{color}";

/// Timestamp layout used by the `{timestamp}` key
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Expand `{key}` patterns in a template string.
///
/// Resolution: looks up each `{key}` in `vars`. If found, replaces with
/// the value. If not found, leaves the `{key}` literal in the output.
/// A `{` with no closing brace, or enclosing anything other than letters,
/// digits and underscores, is also left as-is.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn expand_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_key(&after[..close]) => {
                let key = &after[..close];
                if let Some(value) = vars.get(key) {
                    result.push_str(value);
                } else {
                    // Unknown key — leave as-is
                    result.push_str(&rest[open..open + close + 2]);
                }
                rest = &after[close + 1..];
            }
            _ => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);

    result
}

fn is_key(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Build the variable map for one record. `{color}` is handled by the caller.
#[must_use]
pub fn record_vars(
    name: &str,
    rank: u32,
    timestamp: &DateTime<Local>,
    message: &str,
) -> HashMap<&'static str, String> {
    let level = level_name(rank);
    let mut vars = HashMap::with_capacity(7);
    vars.insert("color", String::new());
    vars.insert("level", level.to_lowercase());
    vars.insert("LEVEL", level.into_owned());
    vars.insert("levelno", rank.to_string());
    vars.insert("name", name.to_string());
    vars.insert(
        "timestamp",
        timestamp.format(TIMESTAMP_FORMAT).to_string(),
    );
    vars.insert("message", message.to_string());
    vars
}

/// Split a template at the first `{color}` key into (plain, colored) parts.
///
/// Templates without the key are returned whole as the plain part.
#[must_use]
pub fn split_color(template: &str) -> (&str, Option<&str>) {
    template.find(COLOR_KEY).map_or((template, None), |at| {
        (&template[..at], Some(&template[at + COLOR_KEY.len()..]))
    })
}
