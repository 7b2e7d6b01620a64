//! Error types for market-bell.

use thiserror::Error;

/// Errors surfaced to the operator.
///
/// A missing or malformed alarm time is deliberately not an error: it is
/// represented as an unconfigured slot (`None`).
#[derive(Debug, Error)]
pub enum BellError {
    #[error("unknown time zone '{0}'")]
    InvalidTimezone(String),

    #[error("unknown preset '{0}' (try `presets`)")]
    UnknownPreset(String),

    #[error("alarm is armed; disarm before changing the schedule")]
    ReconfigureWhileArmed,

    #[error("unknown command '{0}' (try `help`)")]
    UnknownCommand(String),

    #[error("invalid argument for '{command}': {reason}")]
    InvalidArgument { command: String, reason: String },

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
