//! Error types for MEDS schema operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised when loading, validating or exporting MEDS documents
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("{document} does not match its schema: {}", errors.join("; "))]
    Validation { document: String, errors: Vec<String> },

    #[error("Patient {patient_id}: event {index} is earlier than the event before it")]
    UnorderedEvents { patient_id: i64, index: usize },

    #[error("Checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("File not found: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
