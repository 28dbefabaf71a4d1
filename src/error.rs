//! Error types for the logging façade

/// Errors raised by level resolution, scoped loggers and data formatting.
///
/// All of these are usage errors and are returned to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum LoggableError {
    /// A level name outside DEBUG/INFO/WARNING/WARN/ERROR/CRITICAL
    #[error("Unrecognized level: '{0}'. Use one of DEBUG, INFO, WARNING, WARN, ERROR, CRITICAL")]
    UnrecognizedLevel(String),

    /// `update` was called on a progress tracker before `enter`
    #[error("{0} has not been started; call enter() before update()")]
    NotStarted(String),

    /// A color spec that `colored` could not parse
    #[error("Invalid color: '{0}'")]
    InvalidColor(String),

    /// Data handed to the pretty-printer could not be serialized
    #[error("Failed to serialize data for display: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T, E = LoggableError> = std::result::Result<T, E>;
