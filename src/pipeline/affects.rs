// src/pipeline/affects.rs

//! Mapping of authored consequences into the wire `Affects` structure.

use crate::config::LineRefSource;
use crate::models::{
    AffectedService, Consequence, Direction, ServicesConsequence, Stop, VehicleMode,
};
use crate::siri::{
    AffectedLine, AffectedNetwork, AffectedOperator, AffectedStopPoint, Affects, DirectionRef,
    LineCoverage, Operators, SituationConsequence,
};

const CONDITION_UNKNOWN: &str = "unknown";

/// Map one consequence into its wire form: the `Affects` target structure
/// plus the Advice/Blocking/Delay wrapper.
pub fn map_consequence(
    consequence: &Consequence,
    line_ref_source: LineRefSource,
) -> SituationConsequence {
    let details = consequence.details();

    let affects = match consequence {
        Consequence::NetworkWide(_) => Affects {
            operators: Some(Operators::AllOperators),
            networks: Some(all_lines_network(details.vehicle_mode)),
            stop_points: None,
        },
        Consequence::OperatorWide(operator_wide) => Affects {
            operators: Some(Operators::Affected(
                operator_wide
                    .consequence_operators
                    .iter()
                    .map(|operator| AffectedOperator {
                        operator_ref: operator.operator_noc.clone(),
                        operator_name: Some(operator.operator_public_name.clone()),
                    })
                    .collect(),
            )),
            networks: Some(all_lines_network(details.vehicle_mode)),
            stop_points: None,
        },
        Consequence::Stops(stops) => Affects {
            operators: Some(Operators::AllOperators),
            networks: Some(all_lines_network(details.vehicle_mode)),
            stop_points: affected_stop_points(&stops.stops, details.vehicle_mode),
        },
        Consequence::Services(services) => Affects {
            operators: None,
            networks: Some(AffectedNetwork {
                vehicle_mode: details.vehicle_mode,
                coverage: LineCoverage::Lines(affected_lines(services, line_ref_source)),
            }),
            stop_points: services
                .stops
                .as_deref()
                .and_then(|stops| affected_stop_points(stops, details.vehicle_mode)),
        },
        // Journey consequences carry no target structure on the wire.
        Consequence::Journeys(_) => Affects::default(),
    };

    SituationConsequence {
        condition: CONDITION_UNKNOWN.to_string(),
        severity: details.disruption_severity,
        affects,
        advice: details.description.clone(),
        journey_planner: details.remove_from_journey_planners,
        delay: details.disruption_delay.map(|minutes| format!("PT{minutes}M")),
    }
}

fn all_lines_network(vehicle_mode: VehicleMode) -> AffectedNetwork {
    AffectedNetwork {
        vehicle_mode,
        coverage: LineCoverage::AllLines,
    }
}

fn affected_stop_points(
    stops: &[Stop],
    vehicle_mode: VehicleMode,
) -> Option<Vec<AffectedStopPoint>> {
    if stops.is_empty() {
        return None;
    }

    Some(
        stops
            .iter()
            .map(|stop| AffectedStopPoint {
                stop_point_ref: stop.atco_code.clone(),
                stop_point_name: stop.common_name.clone(),
                longitude: stop.longitude,
                latitude: stop.latitude,
                vehicle_mode,
            })
            .collect(),
    )
}

fn affected_lines(
    services: &ServicesConsequence,
    line_ref_source: LineRefSource,
) -> Vec<AffectedLine> {
    let direction = match services.disruption_direction {
        Some(Direction::Inbound) => Some(DirectionRef::InboundTowardsTown),
        Some(Direction::Outbound) => Some(DirectionRef::OutboundFromTown),
        _ => None,
    };

    services
        .services
        .iter()
        .map(|service| AffectedLine {
            affected_operator: Some(AffectedOperator {
                operator_ref: service.noc_code.clone(),
                operator_name: Some(service.operator_short_name.clone()),
            }),
            line_ref: line_ref(service, line_ref_source),
            published_line_name: Some(collapse_whitespace(&service.line_name)),
            direction,
        })
        .collect()
}

fn line_ref(service: &AffectedService, source: LineRefSource) -> String {
    match source {
        LineRefSource::LineId => collapse_whitespace(&service.line_id),
        LineRefSource::LineName => collapse_whitespace(&service.line_name),
    }
}

/// Line references must not contain whitespace; runs collapse to a single
/// underscore.
fn collapse_whitespace(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_whitespace = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
                in_whitespace = true;
            }
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}
