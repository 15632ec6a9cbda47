//! Error types for the roast session engine
//!
//! Missing prerequisites for a metric are not errors: calculators return
//! `None` for those. The types here cover malformed input, rejected
//! checkpoint writes and records that cannot be assembled.

use thiserror::Error;

use crate::types::CheckpointLabel;

/// Failure to read an `MM:SS` time string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Time must be in MM:SS format: {0}")]
    MissingSeparator(String),

    #[error("Invalid minutes: {0}")]
    InvalidMinutes(String),

    #[error("Invalid seconds: {0}")]
    InvalidSeconds(String),

    #[error("Seconds must be between 0 and 59, got {0}")]
    SecondsOutOfRange(u32),
}

/// Failure to read a checkpoint label
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelParseError {
    #[error("Temperature checkpoint must be greater than 0")]
    ZeroDegrees,

    #[error("Unrecognized checkpoint label: {0}")]
    Unrecognized(String),
}

/// Rejected write to the checkpoint store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("Roast already discharged; checkpoint {label} not recorded")]
    Finalized { label: CheckpointLabel },

    #[error("Roast already discharged")]
    AlreadyFinalized,

    #[error("Temperature checkpoint must be greater than 0")]
    ZeroDegrees,
}

/// Failure to turn the current session into a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ko: String,
    },
}

impl AssemblyError {
    /// Field the error refers to
    pub fn field(&self) -> &str {
        match self {
            AssemblyError::Validation { field, .. } => field,
        }
    }
}
