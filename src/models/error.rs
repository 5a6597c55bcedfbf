use thiserror::Error;

/// Reasons a session projection cannot drive the timer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimerInputError {
    #[error("startTime is missing")]
    MissingStartTime,
    #[error("{field} is not a recognised timestamp: '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },
}
