// src/config.rs

//! Invocation configuration.
//!
//! All required parameters come from the environment; a missing parameter
//! fails the run before any record is read.

use crate::error::{AppError, Result};

/// Which source field populates the `LineRef` element for service
/// consequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineRefSource {
    /// Use the service's stable line identifier.
    LineId,
    /// Use the service's public display name.
    #[default]
    LineName,
}

/// Configuration for one generator invocation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// DynamoDB table holding disruption records.
    pub disruptions_table: String,

    /// DynamoDB table holding organisation records.
    pub organisations_table: String,

    /// Bucket receiving the unvalidated SIRI-SX XML.
    pub siri_bucket: String,

    /// Bucket receiving the JSON extract.
    pub json_bucket: String,

    /// Bucket receiving the CSV extract.
    pub csv_bucket: String,

    /// Source field for service line references.
    pub line_ref_source: LineRefSource,
}

impl GeneratorConfig {
    /// Load configuration from the environment.
    ///
    /// Required variables:
    /// - `DISRUPTIONS_TABLE_NAME`
    /// - `ORGANISATIONS_TABLE_NAME`
    /// - `SIRI_SX_UNVALIDATED_BUCKET_NAME`
    /// - `DISRUPTIONS_JSON_BUCKET_NAME`
    /// - `DISRUPTIONS_CSV_BUCKET_NAME`
    ///
    /// Optional:
    /// - `LINE_REF_SOURCE`: `lineId` or `lineName` (default `lineName`)
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            disruptions_table: required_var("DISRUPTIONS_TABLE_NAME")?,
            organisations_table: required_var("ORGANISATIONS_TABLE_NAME")?,
            siri_bucket: required_var("SIRI_SX_UNVALIDATED_BUCKET_NAME")?,
            json_bucket: required_var("DISRUPTIONS_JSON_BUCKET_NAME")?,
            csv_bucket: required_var("DISRUPTIONS_CSV_BUCKET_NAME")?,
            line_ref_source: line_ref_source_from_env()?,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::config(format!("{name} not set"))),
    }
}

fn line_ref_source_from_env() -> Result<LineRefSource> {
    match std::env::var("LINE_REF_SOURCE") {
        Ok(value) if value == "lineId" => Ok(LineRefSource::LineId),
        Ok(value) if value == "lineName" => Ok(LineRefSource::LineName),
        Ok(value) => Err(AppError::config(format!(
            "LINE_REF_SOURCE must be lineId or lineName, got {value}"
        ))),
        Err(_) => Ok(LineRefSource::default()),
    }
}
