// src/models/reason.rs

//! Disruption reason, modelled as a tagged union over the four SIRI
//! reason categories.
//!
//! The record store carries a single bare string drawn from one of four
//! code lists. Values such as `unknown` appear in more than one list, so
//! classification follows a fixed precedence order: miscellaneous,
//! environment, personnel, equipment.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MiscellaneousReason {
    Accident,
    SecurityAlert,
    Congestion,
    RoadClosed,
    Incident,
    RouteDiversion,
    Unknown,
    Vandalism,
    Overcrowded,
    OperatorCeasedTrading,
    Vegetation,
    Roadworks,
    SpecialEvent,
    InsufficientDemand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvironmentReason {
    Unknown,
    Fog,
    RoughSea,
    HeavySnowFall,
    DriftingSnow,
    BlizzardConditions,
    HeavyRain,
    StrongWinds,
    StormConditions,
    StormDamage,
    TidalRestrictions,
    HighTide,
    LowTide,
    Ice,
    Frozen,
    Hail,
    Sleet,
    HighTemperatures,
    Flooding,
    Waterlogged,
    LowWaterLevel,
    HighWaterLevel,
    FallenLeaves,
    FallenTree,
    Landslide,
    UndefinedEnvironmentalProblem,
    LightningStrike,
    SewerOverflow,
    GrassFire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonnelReason {
    Unknown,
    StaffSickness,
    StaffInjury,
    ContractorStaffInjury,
    StaffAbsence,
    StaffInWrongPlace,
    StaffShortage,
    IndustrialAction,
    UnofficialIndustrialAction,
    WorkToRule,
    UndefinedPersonnelProblem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentReason {
    Unknown,
    PointsFailure,
    SignalProblem,
    TrainWarningSystemProblem,
    TrackCircuitProblem,
    SignalFailure,
    Derailment,
    EngineFailure,
    TractionFailure,
    BreakDown,
    TechnicalProblem,
    BrokenRail,
    PoorRailConditions,
    WheelImpactLoad,
    LackOfOperationalStock,
    DefectiveFireAlarmEquipment,
    DefectivePlatformEdgeDoors,
    DefectiveCctv,
    DefectivePublicAnnouncementSystem,
    TicketingSystemNotAvailable,
    RepairWork,
    ConstructionWork,
    MaintenanceWork,
    EmergencyEngineeringWork,
    LateFinishToEngineeringWork,
    PowerProblem,
    FuelProblem,
    SwingBridgeFailure,
    EscalatorFailure,
    LiftFailure,
    GangwayProblem,
    ClosedForMaintenance,
    FuelShortage,
    DeicingWork,
    WheelProblem,
    LuggageCarouselProblem,
    UndefinedEquipmentProblem,
}

/// A disruption's reason: exactly one category, exactly one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Miscellaneous(MiscellaneousReason),
    Environment(EnvironmentReason),
    Personnel(PersonnelReason),
    Equipment(EquipmentReason),
}

impl Reason {
    /// Classify a wire string into a reason category.
    pub fn from_wire(value: &str) -> Option<Self> {
        if let Some(reason) = parse_code(value) {
            return Some(Self::Miscellaneous(reason));
        }
        if let Some(reason) = parse_code(value) {
            return Some(Self::Environment(reason));
        }
        if let Some(reason) = parse_code(value) {
            return Some(Self::Personnel(reason));
        }
        parse_code(value).map(Self::Equipment)
    }

    /// The SIRI element name for this reason category.
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Miscellaneous(_) => "MiscellaneousReason",
            Self::Environment(_) => "EnvironmentReason",
            Self::Personnel(_) => "PersonnelReason",
            Self::Equipment(_) => "EquipmentReason",
        }
    }

    /// The bare wire value, as stored by the authoring system.
    pub fn wire_value(&self) -> String {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(value)) => value,
            _ => String::new(),
        }
    }
}

// The code-list enums serialize as bare strings, so a category parses
// exactly when its list contains the value.
fn parse_code<T: DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(value.to_owned())).ok()
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Miscellaneous(reason) => reason.serialize(serializer),
            Self::Environment(reason) => reason.serialize(serializer),
            Self::Personnel(reason) => reason.serialize(serializer),
            Self::Equipment(reason) => reason.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Reason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_wire(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown disruption reason: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_category() {
        assert_eq!(
            Reason::from_wire("roadworks"),
            Some(Reason::Miscellaneous(MiscellaneousReason::Roadworks))
        );
        assert_eq!(
            Reason::from_wire("grassFire"),
            Some(Reason::Environment(EnvironmentReason::GrassFire))
        );
        assert_eq!(
            Reason::from_wire("staffSickness"),
            Some(Reason::Personnel(PersonnelReason::StaffSickness))
        );
        assert_eq!(
            Reason::from_wire("escalatorFailure"),
            Some(Reason::Equipment(EquipmentReason::EscalatorFailure))
        );
        assert_eq!(Reason::from_wire("notAReason"), None);
    }

    #[test]
    fn ambiguous_values_resolve_by_precedence() {
        // "unknown" appears in all four code lists.
        assert_eq!(
            Reason::from_wire("unknown"),
            Some(Reason::Miscellaneous(MiscellaneousReason::Unknown))
        );
    }

    #[test]
    fn round_trips_through_serde() {
        let reason: Reason = serde_json::from_str("\"heavySnowFall\"").unwrap();
        assert_eq!(reason.element_name(), "EnvironmentReason");
        assert_eq!(serde_json::to_string(&reason).unwrap(), "\"heavySnowFall\"");
        assert_eq!(reason.wire_value(), "heavySnowFall");
    }
}
