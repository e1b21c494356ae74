// src/siri/mod.rs

//! SIRI-SX wire model.
//!
//! Field order in these structs is the order elements are written to the
//! XML document; the serializer in [`xml`] never reorders.

pub mod xml;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::{Reason, Severity, VehicleMode};

pub const SIRI_VERSION: &str = "2.0";
pub const SIRI_NAMESPACE: &str = "http://www.siri.org.uk/siri";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str =
    "http://www.siri.org.uk/siri http://www.siri.org.uk/schema/2.0/xsd/siri.xsd";
pub const PRODUCER_REF: &str = "DepartmentForTransport";
pub const SOURCE_TYPE_FEED: &str = "feed";
pub const PROGRESS_OPEN: &str = "open";

/// Render a wire timestamp (millisecond precision, `Z` suffix).
pub fn timestamp(datetime: DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A concrete validity or publication period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Provenance of a situation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub source_type: String,
    pub time_of_communication: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLink {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedOperator {
    pub operator_ref: String,
    pub operator_name: Option<String>,
}

/// The `Operators` fragment: either the all-operators marker or an
/// explicit operator list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operators {
    AllOperators,
    Affected(Vec<AffectedOperator>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionRef {
    InboundTowardsTown,
    OutboundFromTown,
}

impl DirectionRef {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InboundTowardsTown => "inboundTowardsTown",
            Self::OutboundFromTown => "outboundFromTown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedLine {
    pub affected_operator: Option<AffectedOperator>,
    pub line_ref: String,
    pub published_line_name: Option<String>,
    pub direction: Option<DirectionRef>,
}

/// Line coverage within an affected network: every line, or a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCoverage {
    AllLines,
    Lines(Vec<AffectedLine>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedNetwork {
    pub vehicle_mode: VehicleMode,
    pub coverage: LineCoverage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffectedStopPoint {
    pub stop_point_ref: String,
    pub stop_point_name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub vehicle_mode: VehicleMode,
}

/// What a consequence targets. Fragments combine; all-absent serializes
/// as an empty `Affects` element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Affects {
    pub operators: Option<Operators>,
    pub networks: Option<AffectedNetwork>,
    pub stop_points: Option<Vec<AffectedStopPoint>>,
}

impl Affects {
    pub fn is_empty(&self) -> bool {
        self.operators.is_none() && self.networks.is_none() && self.stop_points.is_none()
    }
}

/// One mapped consequence within a situation.
#[derive(Debug, Clone, PartialEq)]
pub struct SituationConsequence {
    pub condition: String,
    pub severity: Severity,
    pub affects: Affects,
    /// Rendered as `Advice.Details`.
    pub advice: String,
    /// Rendered as `Blocking.JourneyPlanner`.
    pub journey_planner: bool,
    /// ISO-8601 duration (`PT{n}M`), rendered as `Delays.Delay`.
    pub delay: Option<String>,
}

/// One published disruption event (`PtSituationElement`).
#[derive(Debug, Clone, PartialEq)]
pub struct PtSituationElement {
    pub creation_time: DateTime<Utc>,
    pub participant_ref: String,
    pub situation_number: String,
    pub version: usize,
    pub source: Source,
    pub versioned_at_time: DateTime<Utc>,
    pub progress: String,
    pub validity_period: Vec<Period>,
    pub publication_window: Period,
    pub reason: Reason,
    pub planned: bool,
    pub summary: String,
    pub description: String,
    /// Empty list means the `InfoLinks` element is omitted.
    pub info_links: Vec<InfoLink>,
    /// Empty list means the `Consequences` element is omitted.
    pub consequences: Vec<SituationConsequence>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SituationExchangeDelivery {
    pub response_timestamp: DateTime<Utc>,
    pub situations: Vec<PtSituationElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDelivery {
    pub response_timestamp: DateTime<Utc>,
    pub producer_ref: String,
    pub response_message_identifier: String,
    pub situation_exchange_delivery: SituationExchangeDelivery,
}

/// The complete service-delivery envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Siri {
    pub service_delivery: ServiceDelivery,
}

impl Siri {
    /// Wrap assembled situations into the envelope for one run.
    pub fn new(
        now: DateTime<Utc>,
        response_message_identifier: String,
        situations: Vec<PtSituationElement>,
    ) -> Self {
        Self {
            service_delivery: ServiceDelivery {
                response_timestamp: now,
                producer_ref: PRODUCER_REF.to_string(),
                response_message_identifier,
                situation_exchange_delivery: SituationExchangeDelivery {
                    response_timestamp: now,
                    situations,
                },
            },
        }
    }
}
