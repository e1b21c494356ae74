// src/models/organisation.rs

//! Organisation reference data and the enriched disruption shape.

use serde::{Deserialize, Serialize};

use super::disruption::Disruption;

/// An organisation record from the reference-data store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: String,
    pub name: String,
}

impl Organisation {
    /// The organisation name reduced to the character set permitted for a
    /// SIRI participant reference: `[-._:A-Za-z0-9]`.
    pub fn participant_ref(&self) -> String {
        self.name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
            .collect()
    }
}

/// A disruption joined to its resolved organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDisruption {
    #[serde(flatten)]
    pub disruption: Disruption,
    pub organisation: Organisation,
}
