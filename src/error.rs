// src/error.rs

//! Unified error handling for the feed generator.

use std::fmt;

use thiserror::Error;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

    /// AWS DynamoDB error
    #[error("DynamoDB error: {0}")]
    Dynamo(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML rendering failed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// CSV rendering failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Per-situation validation error
    #[error("Validation error for situation {situation_number}: {message}")]
    Validation {
        situation_number: String,
        message: String,
    },

    /// Whole-document structural validation error
    #[error("Document validation error: {0}")]
    Document(String),
}

impl AppError {
    /// Create an S3 error from any displayable SDK error.
    pub fn s3(message: impl fmt::Display) -> Self {
        Self::S3(message.to_string())
    }

    /// Create a DynamoDB error from any displayable SDK error.
    pub fn dynamo(message: impl fmt::Display) -> Self {
        Self::Dynamo(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a per-situation validation error.
    pub fn validation(situation_number: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Validation {
            situation_number: situation_number.into(),
            message: message.to_string(),
        }
    }

    /// Create a whole-document validation error.
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document(message.into())
    }
}
