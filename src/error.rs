use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the agent, its table, and table persistence
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("action {action} is not in the configured action set")]
    InvalidAction { action: String },

    #[error("the action set is empty")]
    EmptyActionSet,

    #[error("action {action} appears more than once in the action set")]
    DuplicateAction { action: String },

    #[error("invalid value {value} for `{name}`, must be in the interval [{min}, {max}]")]
    OutOfInterval {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("reward must be finite, got {reward}")]
    NonFiniteReward { reward: f32 },

    #[error("no table found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to encode table: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("corrupt table data: {reason}")]
    CorruptData { reason: String },

    #[error("stored actions {stored} do not match the configured actions {configured}")]
    ActionSetMismatch { stored: String, configured: String },

    #[error("failed to {operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for results using the crate's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_action(action: &impl std::fmt::Debug) -> Self {
        Error::InvalidAction {
            action: format!("{action:?}"),
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Error::CorruptData {
            reason: reason.into(),
        }
    }
}
