// src/models/mod.rs

//! Domain models for the feed generator.
//!
//! These mirror the record-store shapes produced by the authoring system,
//! with the reason and consequence unions modelled as tagged enums.

mod consequence;
pub mod dates;
mod disruption;
mod organisation;
mod reason;

// Re-export all public types
pub use consequence::{
    AffectedService, Consequence, ConsequenceDetails, ConsequenceOperator, Direction,
    JourneysConsequence, NetworkWideConsequence, OperatorWideConsequence, ServicesConsequence,
    Severity, Stop, StopsConsequence, VehicleJourney, VehicleMode,
};
pub use disruption::{
    Disruption, DisruptionRepeats, DisruptionType, HistoryEntry, PublishStatus, Validity,
};
pub use organisation::{EnrichedDisruption, Organisation};
pub use reason::{
    EnvironmentReason, EquipmentReason, MiscellaneousReason, PersonnelReason, Reason,
};
