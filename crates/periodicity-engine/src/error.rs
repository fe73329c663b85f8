//! Error types for periodicity-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodicityError {
    #[error("Invalid periodicity rule: {0}")]
    InvalidRule(String),

    #[error("Invalid/missing occurrences specified in periodicity rule")]
    MissingOccurrences,

    #[error("Invalid occurrence: {0}")]
    InvalidOccurrence(String),

    #[error("Invalid interval created: '{start}' to '{end}'")]
    InvalidInterval { start: String, end: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Computation error: {0}")]
    Computation(String),
}

impl PeriodicityError {
    /// True for errors caused by the rule itself rather than by the computation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PeriodicityError::InvalidRule(_)
                | PeriodicityError::MissingOccurrences
                | PeriodicityError::InvalidOccurrence(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PeriodicityError>;
