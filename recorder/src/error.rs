//! Error handling for the roast recorder
//!
//! Every error can be turned into a [`UserNotice`] carrying English and
//! Korean wording for the user.

use std::path::PathBuf;

use roastlog_core::{AssemblyError, CheckpointError};
use serde::Serialize;
use thiserror::Error;

/// Failures of a persistence collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Recorder error types
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ko: String,
    },

    #[error("Checkpoint rejected: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl From<AssemblyError> for RecorderError {
    fn from(error: AssemblyError) -> Self {
        match error {
            AssemblyError::Validation {
                field,
                message,
                message_ko,
            } => RecorderError::Validation {
                field,
                message,
                message_ko,
            },
        }
    }
}

/// User-facing description of an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    pub code: String,
    pub message_en: String,
    pub message_ko: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl RecorderError {
    pub fn notice(&self) -> UserNotice {
        match self {
            RecorderError::Validation {
                field,
                message,
                message_ko,
            } => UserNotice {
                code: "VALIDATION_ERROR".to_string(),
                message_en: message.clone(),
                message_ko: message_ko.clone(),
                field: Some(field.clone()),
            },
            RecorderError::Checkpoint(CheckpointError::Finalized { label }) => UserNotice {
                code: "ROAST_DISCHARGED".to_string(),
                message_en: format!("Roast already discharged; {}° was not recorded", label),
                message_ko: format!("이미 배출되었습니다. {}°는 기록되지 않았습니다.", label),
                field: None,
            },
            RecorderError::Checkpoint(CheckpointError::AlreadyFinalized) => UserNotice {
                code: "ROAST_DISCHARGED".to_string(),
                message_en: "Roast already discharged".to_string(),
                message_ko: "이미 배출되었습니다.".to_string(),
                field: None,
            },
            RecorderError::Checkpoint(CheckpointError::ZeroDegrees) => UserNotice {
                code: "INVALID_CHECKPOINT".to_string(),
                message_en: "Temperature must be greater than 0".to_string(),
                message_ko: "온도는 0보다 커야 합니다.".to_string(),
                field: None,
            },
            RecorderError::NotFound(id) => UserNotice {
                code: "NOT_FOUND".to_string(),
                message_en: format!("Record {} not found", id),
                message_ko: format!("기록 {}을(를) 찾을 수 없습니다.", id),
                field: None,
            },
            RecorderError::Persistence(_) => UserNotice {
                code: "PERSISTENCE_ERROR".to_string(),
                message_en: "Could not save. Please try again.".to_string(),
                message_ko: "저장하지 못했습니다. 다시 시도해주세요.".to_string(),
                field: None,
            },
        }
    }
}

/// Result type alias for recorder operations
pub type RecorderResult<T> = Result<T, RecorderError>;
