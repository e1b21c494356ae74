// src/models/consequence.rs

//! Consequence records, tagged by `consequenceType`.

use serde::{Deserialize, Serialize};

use super::dates::{minutes_opt, yes_no};

/// Severity of a consequence, from the SIRI code list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Unknown,
    Normal,
    VerySlight,
    Slight,
    Severe,
    VerySevere,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Normal => "normal",
            Self::VerySlight => "verySlight",
            Self::Slight => "slight",
            Self::Severe => "severe",
            Self::VerySevere => "verySevere",
        }
    }
}

/// Vehicle mode affected by a consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VehicleMode {
    Bus,
    Tram,
    FerryService,
    Rail,
    Underground,
}

impl VehicleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bus => "bus",
            Self::Tram => "tram",
            Self::FerryService => "ferryService",
            Self::Rail => "rail",
            Self::Underground => "underground",
        }
    }
}

/// Direction of travel for a service consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    AllDirections,
    Inbound,
    Outbound,
}

/// Fields common to every consequence variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsequenceDetails {
    pub description: String,

    #[serde(with = "yes_no")]
    pub remove_from_journey_planners: bool,

    /// Delay in minutes, when the operator entered one.
    #[serde(default, with = "minutes_opt", skip_serializing_if = "Option::is_none")]
    pub disruption_delay: Option<u32>,

    pub disruption_severity: Severity,

    pub vehicle_mode: VehicleMode,
}

/// An operator affected by an operator-wide consequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsequenceOperator {
    /// National Operator Code.
    pub operator_noc: String,
    pub operator_public_name: String,
}

/// A stop point affected by a stops or services consequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub atco_code: String,
    pub common_name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// A service affected by a services or journeys consequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedService {
    pub id: i64,
    pub line_name: String,
    pub line_id: String,
    pub operator_short_name: String,
    /// National Operator Code.
    pub noc_code: String,
}

/// A vehicle journey affected by a journeys consequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleJourney {
    pub vehicle_journey_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkWideConsequence {
    #[serde(flatten)]
    pub details: ConsequenceDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorWideConsequence {
    #[serde(flatten)]
    pub details: ConsequenceDetails,
    pub consequence_operators: Vec<ConsequenceOperator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopsConsequence {
    #[serde(flatten)]
    pub details: ConsequenceDetails,
    pub stops: Vec<Stop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesConsequence {
    #[serde(flatten)]
    pub details: ConsequenceDetails,
    pub services: Vec<AffectedService>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<Stop>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disruption_direction: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneysConsequence {
    #[serde(flatten)]
    pub details: ConsequenceDetails,
    #[serde(default)]
    pub services: Vec<AffectedService>,
    #[serde(default)]
    pub journeys: Vec<VehicleJourney>,
}

/// One authored impact of a disruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "consequenceType")]
pub enum Consequence {
    #[serde(rename = "networkWide")]
    NetworkWide(NetworkWideConsequence),
    #[serde(rename = "operatorWide")]
    OperatorWide(OperatorWideConsequence),
    #[serde(rename = "stops")]
    Stops(StopsConsequence),
    #[serde(rename = "services")]
    Services(ServicesConsequence),
    #[serde(rename = "journeys")]
    Journeys(JourneysConsequence),
}

impl Consequence {
    /// The fields shared by every variant.
    pub fn details(&self) -> &ConsequenceDetails {
        match self {
            Self::NetworkWide(c) => &c.details,
            Self::OperatorWide(c) => &c.details,
            Self::Stops(c) => &c.details,
            Self::Services(c) => &c.details,
            Self::Journeys(c) => &c.details,
        }
    }
}
