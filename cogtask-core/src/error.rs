use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskErrorKind {
    SequenceNotStarted,
    OutOfSequence,
    EmptyResultSet,
    InvalidConfiguration,
}

/// Recoverable failures of the trial engine. None of them invalidate the
/// session they were raised on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("sequence not started")]
    SequenceNotStarted,
    #[error("out of sequence: {0}")]
    OutOfSequence(String),
    #[error("no results")]
    EmptyResultSet,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl TaskError {
    pub fn kind(&self) -> TaskErrorKind {
        match self {
            TaskError::SequenceNotStarted => TaskErrorKind::SequenceNotStarted,
            TaskError::OutOfSequence(_) => TaskErrorKind::OutOfSequence,
            TaskError::EmptyResultSet => TaskErrorKind::EmptyResultSet,
            TaskError::InvalidConfiguration(_) => TaskErrorKind::InvalidConfiguration,
        }
    }

    /// "No data yet" is reported to callers as a state, not a failure.
    pub fn is_benign(&self) -> bool {
        matches!(self, TaskError::EmptyResultSet)
    }
}

pub fn out_of_sequence(message: impl Into<String>) -> TaskError {
    TaskError::OutOfSequence(message.into())
}

pub fn invalid_configuration(message: impl Into<String>) -> TaskError {
    TaskError::InvalidConfiguration(message.into())
}
