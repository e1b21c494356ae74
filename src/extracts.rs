// src/extracts.rs

//! JSON and CSV companion extracts of the enriched disruption set.

use std::collections::HashSet;
use std::io;

use chrono::{DateTime, NaiveTime, Utc};

use crate::error::Result;
use crate::models::{Consequence, DisruptionRepeats, EnrichedDisruption, Validity};
use crate::siri::timestamp;

const CSV_HEADERS: [&str; 12] = [
    "Organisation",
    "ID",
    "Validity start",
    "Validity end",
    "Publication start",
    "Publication end",
    "Reason",
    "Planned",
    "Modes affected",
    "Operators affected",
    "Services affected",
    "Stops affected",
];

/// Render the JSON extract: the enriched disruptions as fetched, in
/// input order.
pub fn to_json(disruptions: &[EnrichedDisruption]) -> Result<String> {
    Ok(serde_json::to_string(disruptions)?)
}

/// Render the CSV extract, one summary row per disruption.
pub fn to_csv(disruptions: &[EnrichedDisruption]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for enriched in disruptions {
        let disruption = &enriched.disruption;
        writer.write_record([
            enriched.organisation.name.clone(),
            disruption.id.clone(),
            timestamp(earliest_start(
                &disruption.primary_validity(),
                &disruption.validity,
            )),
            final_end_date(disruption.primary_validity(), &disruption.validity)
                .map(timestamp)
                .unwrap_or_default(),
            timestamp(disruption.publish_start()),
            disruption.publish_end().map(timestamp).unwrap_or_default(),
            disruption.disruption_reason.wire_value(),
            if disruption.is_planned() { "true" } else { "false" }.to_string(),
            affected_modes(&disruption.consequences),
            affected_operators(&disruption.consequences),
            affected_services_count(&disruption.consequences),
            affected_stops_count(&disruption.consequences),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    Ok(String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?)
}

/// The earliest start across every validity window. Additional windows
/// may be declared before the primary one.
fn earliest_start(primary: &Validity, additional: &[Validity]) -> DateTime<Utc> {
    additional
        .iter()
        .map(Validity::start_datetime)
        .fold(primary.start_datetime(), |earliest, start| {
            earliest.min(start)
        })
}

/// The latest effective end across every validity window, or `None` if
/// any window is open-ended. A recurring window effectively ends at the
/// start of its recurrence end date.
fn final_end_date(primary: Validity, additional: &[Validity]) -> Option<DateTime<Utc>> {
    let mut latest: Option<DateTime<Utc>> = None;

    for validity in std::iter::once(&primary).chain(additional) {
        let recurring = matches!(
            validity.disruption_repeats,
            DisruptionRepeats::Daily | DisruptionRepeats::Weekly
        );
        let end = if recurring {
            validity
                .disruption_repeats_end_date
                .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        } else {
            validity.end_datetime()
        };

        let end = end?;
        if latest.is_none_or(|current| end > current) {
            latest = Some(end);
        }
    }

    latest
}

fn affected_modes(consequences: &[Consequence]) -> String {
    let mut seen = HashSet::new();
    let mut modes = Vec::new();
    for consequence in consequences {
        let mode = consequence.details().vehicle_mode;
        if seen.insert(mode) {
            modes.push(mode.as_str());
        }
    }
    modes.join(";")
}

fn affected_operators(consequences: &[Consequence]) -> String {
    let mut seen = HashSet::new();
    let mut nocs = Vec::new();
    for consequence in consequences {
        if let Consequence::OperatorWide(operator_wide) = consequence {
            for operator in &operator_wide.consequence_operators {
                if seen.insert(operator.operator_noc.as_str()) {
                    nocs.push(operator.operator_noc.as_str());
                }
            }
        }
    }
    nocs.join(";")
}

fn affected_services_count(consequences: &[Consequence]) -> String {
    let mut ids = HashSet::new();
    for consequence in consequences {
        if let Consequence::Services(services) = consequence {
            for service in &services.services {
                ids.insert(service.id);
            }
        }
    }
    count_or_empty(ids.len())
}

fn affected_stops_count(consequences: &[Consequence]) -> String {
    let mut atco_codes = HashSet::new();
    for consequence in consequences {
        let stops = match consequence {
            Consequence::Stops(c) => Some(c.stops.as_slice()),
            Consequence::Services(c) => c.stops.as_deref(),
            _ => None,
        };
        for stop in stops.unwrap_or_default() {
            atco_codes.insert(stop.atco_code.as_str());
        }
    }
    count_or_empty(atco_codes.len())
}

// Zero renders as an empty cell.
fn count_or_empty(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Disruption, Organisation};

    fn enriched(value: serde_json::Value) -> EnrichedDisruption {
        let disruption: Disruption = serde_json::from_value(value).unwrap();
        EnrichedDisruption {
            disruption,
            organisation: Organisation {
                id: "org-1".to_string(),
                name: "Test Org".to_string(),
            },
        }
    }

    fn base_json() -> serde_json::Value {
        serde_json::json!({
            "id": "d-1",
            "orgId": "org-1",
            "publishStatus": "PUBLISHED",
            "disruptionType": "planned",
            "summary": "Road closed",
            "description": "Road closed for resurfacing.",
            "disruptionReason": "roadworks",
            "publishStartDate": "01/03/2023",
            "publishStartTime": "0800",
            "disruptionStartDate": "02/03/2023",
            "disruptionStartTime": "0900",
            "disruptionEndDate": "03/03/2023",
            "disruptionEndTime": "1700",
            "consequences": [
                {
                    "consequenceType": "networkWide",
                    "description": "All services disrupted",
                    "removeFromJourneyPlanners": "no",
                    "disruptionSeverity": "severe",
                    "vehicleMode": "bus"
                },
                {
                    "consequenceType": "operatorWide",
                    "description": "No trams",
                    "removeFromJourneyPlanners": "yes",
                    "disruptionSeverity": "severe",
                    "vehicleMode": "tram",
                    "consequenceOperators": [
                        { "operatorNoc": "TRAM", "operatorPublicName": "Tram Co" },
                        { "operatorNoc": "TRAM", "operatorPublicName": "Tram Co" }
                    ]
                }
            ]
        })
    }

    #[test]
    fn json_extract_includes_the_organisation() {
        let json = to_json(&[enriched(base_json())]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["organisation"]["name"], "Test Org");
        assert_eq!(value[0]["id"], "d-1");
    }

    #[test]
    fn csv_extract_has_fixed_headers_and_one_row_per_disruption() {
        let csv = to_csv(&[enriched(base_json())]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Organisation,ID,Validity start,Validity end,Publication start,\
             Publication end,Reason,Planned,Modes affected,Operators affected,\
             Services affected,Stops affected"
        );

        let row = lines.next().unwrap();
        assert!(row.starts_with("Test Org,d-1,2023-03-02T09:00:00.000Z,2023-03-03T17:00:00.000Z"));
        assert!(row.contains("roadworks,true,bus;tram,TRAM"));
        // No services or stops consequences: both counts are empty cells.
        assert!(row.ends_with(",,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn open_ended_validity_leaves_end_empty() {
        let mut json = base_json();
        json["disruptionEndDate"] = serde_json::Value::Null;
        json["disruptionEndTime"] = serde_json::Value::Null;

        let csv = to_csv(&[enriched(json)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("2023-03-02T09:00:00.000Z,,2023-03-01T08:00:00.000Z"));
    }

    #[test]
    fn validity_start_is_the_earliest_across_all_windows() {
        let mut json = base_json();
        json["validity"] = serde_json::json!([{
            "disruptionStartDate": "20/02/2023",
            "disruptionStartTime": "0600",
            "disruptionEndDate": "20/02/2023",
            "disruptionEndTime": "0800"
        }]);

        let csv = to_csv(&[enriched(json)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        // The additional window starts before the primary one.
        assert!(row.starts_with("Test Org,d-1,2023-02-20T06:00:00.000Z"));
    }

    #[test]
    fn recurring_validity_ends_at_the_recurrence_end_date() {
        let mut json = base_json();
        json["disruptionRepeats"] = serde_json::json!("weekly");
        json["disruptionRepeatsEndDate"] = serde_json::json!("31/03/2023");

        let csv = to_csv(&[enriched(json)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("2023-03-31T00:00:00.000Z"));
    }

    #[test]
    fn any_open_ended_window_clears_the_end() {
        let mut json = base_json();
        json["validity"] = serde_json::json!([{
            "disruptionStartDate": "10/03/2023",
            "disruptionStartTime": "0600"
        }]);

        let csv = to_csv(&[enriched(json)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("2023-03-02T09:00:00.000Z,,2023-03-01T08:00:00.000Z"));
    }

    #[test]
    fn stop_counts_deduplicate_by_atco_code() {
        let mut json = base_json();
        json["consequences"] = serde_json::json!([
            {
                "consequenceType": "stops",
                "description": "Stops closed",
                "removeFromJourneyPlanners": "yes",
                "disruptionSeverity": "severe",
                "vehicleMode": "bus",
                "stops": [
                    { "atcoCode": "0100A", "commonName": "High St", "longitude": -1.5, "latitude": 53.8 },
                    { "atcoCode": "0100B", "commonName": "Low St", "longitude": -1.5, "latitude": 53.8 }
                ]
            },
            {
                "consequenceType": "services",
                "description": "Diversion",
                "removeFromJourneyPlanners": "no",
                "disruptionSeverity": "slight",
                "vehicleMode": "bus",
                "services": [{
                    "id": 7,
                    "lineName": "Line 7",
                    "lineId": "L7",
                    "operatorShortName": "Bus Co",
                    "nocCode": "BUSC"
                }],
                "stops": [
                    { "atcoCode": "0100B", "commonName": "Low St", "longitude": -1.5, "latitude": 53.8 }
                ]
            }
        ]);

        let csv = to_csv(&[enriched(json)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(",1,2"));
    }
}
