//! A single emitted log record

use std::borrow::Cow;

use chrono::{DateTime, Local};

use crate::level::level_name;

/// What every handler receives for one `log` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Identity of the logger that emitted the record
    pub name: String,
    /// Numeric rank of the record
    pub level: u32,
    /// Message text
    pub message: String,
    /// When the record was created
    pub timestamp: DateTime<Local>,
}

impl Record {
    /// Create a record stamped with the current local time
    #[must_use]
    pub fn new(name: impl Into<String>, level: u32, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level,
            message: message.into(),
            timestamp: Local::now(),
        }
    }

    /// Display name of the record's level
    #[must_use]
    pub fn level_name(&self) -> Cow<'static, str> {
        level_name(self.level)
    }
}
