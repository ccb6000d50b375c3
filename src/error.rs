//! Structured error types for user-facing failures.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,

    // Not found errors
    RecordNotFound,

    // CSV import
    ImportFailed,

    // Internal errors
    DatabaseError,
    InternalError,
}

/// Structured error returned by record operations.
#[derive(Debug, Serialize)]
pub struct RecordError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl RecordError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn not_found(id: i64) -> Self {
        Self::new(
            ErrorCode::RecordNotFound,
            format!("Record not found: {}", id),
        )
    }

    pub fn import_failed(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ImportFailed, format!("Import failed: {}", err))
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RecordError {}

impl From<rusqlite::Error> for RecordError {
    fn from(err: rusqlite::Error) -> Self {
        RecordError::database(err)
    }
}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for RecordError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<RecordError>() {
            Ok(record_err) => record_err,
            Err(err) => match err.downcast::<rusqlite::Error>() {
                Ok(db_err) => RecordError::database(db_err),
                Err(err) => RecordError::internal(err),
            },
        }
    }
}

/// Result type for record operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;
