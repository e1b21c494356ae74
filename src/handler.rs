// src/handler.rs

//! One generator run, end to end: fetch, enrich, assemble, validate,
//! serialize, upload.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::extracts;
use crate::pipeline::{build_situation, enrich_disruptions, validate_document, validate_situations};
use crate::siri::{xml, Siri};
use crate::storage::{DisruptionStore, ObjectSink};

/// Counters reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Disruptions that survived enrichment and eligibility filtering.
    pub eligible_count: usize,
    /// Situations in the published document.
    pub situation_count: usize,
    /// Situations dropped by per-situation validation.
    pub dropped_count: usize,
}

pub async fn run(
    config: &GeneratorConfig,
    store: &dyn DisruptionStore,
    sink: &dyn ObjectSink,
    now: DateTime<Utc>,
    response_message_identifier: String,
) -> Result<RunSummary> {
    let disruptions = store.fetch_published_disruptions().await?;
    let enriched = enrich_disruptions(store, disruptions, now).await?;
    let eligible_count = enriched.len();

    let situations: Vec<_> = enriched
        .iter()
        .map(|disruption| build_situation(disruption, now, config.line_ref_source))
        .collect();
    let assembled_count = situations.len();

    let situations = validate_situations(situations);
    let situation_count = situations.len();
    let dropped_count = assembled_count - situation_count;

    let siri = Siri::new(now, response_message_identifier, situations);
    validate_document(&siri)?;

    let xml_body = xml::to_xml(&siri)?;
    let json_body = extracts::to_json(&enriched)?;
    let csv_body = extracts::to_csv(&enriched)?;

    let xml_key = format!("{}-unvalidated-siri.xml", now.timestamp_millis());

    tokio::try_join!(
        sink.put(
            &config.siri_bucket,
            &xml_key,
            xml_body.into_bytes(),
            "application/xml",
        ),
        sink.put(
            &config.json_bucket,
            "disruptions.json",
            json_body.into_bytes(),
            "application/json",
        ),
        sink.put(
            &config.csv_bucket,
            "disruptions.csv",
            csv_body.into_bytes(),
            "text/csv",
        ),
    )?;

    info!(
        eligible_count,
        situation_count, dropped_count, "generator run complete"
    );

    Ok(RunSummary {
        eligible_count,
        situation_count,
        dropped_count,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::config::LineRefSource;
    use crate::models::{Disruption, Organisation};

    struct FakeStore {
        disruptions: Vec<Disruption>,
        organisations: Vec<Organisation>,
    }

    #[async_trait]
    impl DisruptionStore for FakeStore {
        async fn fetch_published_disruptions(&self) -> Result<Vec<Disruption>> {
            Ok(self.disruptions.clone())
        }

        async fn get_organisation(&self, id: &str) -> Result<Option<Organisation>> {
            Ok(self.organisations.iter().find(|o| o.id == id).cloned())
        }
    }

    #[derive(Default)]
    struct FakeSink {
        objects: Mutex<HashMap<(String, String), (Vec<u8>, String)>>,
    }

    impl FakeSink {
        fn body(&self, bucket: &str, key: &str) -> String {
            let objects = self.objects.lock().unwrap();
            let (body, _) = &objects[&(bucket.to_string(), key.to_string())];
            String::from_utf8(body.clone()).unwrap()
        }
    }

    #[async_trait]
    impl ObjectSink for FakeSink {
        async fn put(
            &self,
            bucket: &str,
            key: &str,
            body: Vec<u8>,
            content_type: &str,
        ) -> Result<()> {
            self.objects.lock().unwrap().insert(
                (bucket.to_string(), key.to_string()),
                (body, content_type.to_string()),
            );
            Ok(())
        }
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            disruptions_table: "disruptions".to_string(),
            organisations_table: "organisations".to_string(),
            siri_bucket: "siri-bucket".to_string(),
            json_bucket: "json-bucket".to_string(),
            csv_bucket: "csv-bucket".to_string(),
            line_ref_source: LineRefSource::LineName,
        }
    }

    fn disruption(id: &str, value: serde_json::Value) -> Disruption {
        let mut value = value;
        value["id"] = serde_json::json!(id);
        serde_json::from_value(value).unwrap()
    }

    fn base_json() -> serde_json::Value {
        serde_json::json!({
            "orgId": "org-1",
            "publishStatus": "PUBLISHED",
            "disruptionType": "unplanned",
            "summary": "Flooding",
            "description": "Flooding on the main road.",
            "disruptionReason": "flooding",
            "publishStartDate": "01/03/2023",
            "publishStartTime": "0800",
            "disruptionStartDate": "02/03/2023",
            "disruptionStartTime": "0900",
            "consequences": [{
                "consequenceType": "networkWide",
                "description": "All bus services disrupted",
                "removeFromJourneyPlanners": "no",
                "disruptionSeverity": "severe",
                "vehicleMode": "bus"
            }]
        })
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, 6, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn run_publishes_all_three_artifacts() {
        let mut expired = base_json();
        expired["publishEndDate"] = serde_json::json!("05/03/2023");
        expired["publishEndTime"] = serde_json::json!("1700");

        let store = FakeStore {
            disruptions: vec![
                disruption("d-1", base_json()),
                disruption("d-2", expired),
            ],
            organisations: vec![Organisation {
                id: "org-1".to_string(),
                name: "Test Org".to_string(),
            }],
        };
        let sink = FakeSink::default();

        let summary = run(&config(), &store, &sink, now(), "message-1".to_string())
            .await
            .unwrap();

        assert_eq!(summary.eligible_count, 1);
        assert_eq!(summary.situation_count, 1);
        assert_eq!(summary.dropped_count, 0);

        let xml_key = format!("{}-unvalidated-siri.xml", now().timestamp_millis());
        let xml = sink.body("siri-bucket", &xml_key);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains("<ResponseMessageIdentifier>message-1</ResponseMessageIdentifier>"));
        assert!(xml.contains("<SituationNumber>d-1</SituationNumber>"));
        assert!(!xml.contains("d-2"));

        let json = sink.body("json-bucket", "disruptions.json");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["organisation"]["name"], "Test Org");

        let csv = sink.body("csv-bucket", "disruptions.csv");
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.lines().nth(1).unwrap().starts_with("Test Org,d-1"));
    }

    // Whitespace-insensitive comparison: indentation varies, content and
    // element order must not.
    fn normalized(xml: &str) -> String {
        xml.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn three_disruption_document_matches_the_reference() {
        let network_wide = serde_json::json!({
            "id": "d-1",
            "orgId": "org-1",
            "publishStatus": "PUBLISHED",
            "disruptionType": "unplanned",
            "summary": "Road closed",
            "description": "The high street is closed for resurfacing.",
            "disruptionReason": "roadworks",
            "publishStartDate": "01/03/2023",
            "publishStartTime": "0800",
            "disruptionStartDate": "02/03/2023",
            "disruptionStartTime": "0900",
            "disruptionEndDate": "03/03/2023",
            "disruptionEndTime": "1700",
            "consequences": [{
                "consequenceType": "networkWide",
                "description": "All bus services are disrupted.",
                "removeFromJourneyPlanners": "no",
                "disruptionSeverity": "severe",
                "vehicleMode": "bus"
            }]
        });

        // Two validity periods, the second without an end time.
        let operator_wide = serde_json::json!({
            "id": "d-2",
            "orgId": "org-1",
            "publishStatus": "PUBLISHED",
            "disruptionType": "planned",
            "summary": "Parade diversions",
            "description": "Trams are diverted for the parade.",
            "disruptionReason": "specialEvent",
            "publishStartDate": "01/03/2023",
            "publishStartTime": "0900",
            "disruptionStartDate": "04/03/2023",
            "disruptionStartTime": "0600",
            "disruptionEndDate": "04/03/2023",
            "disruptionEndTime": "2200",
            "validity": [{
                "disruptionStartDate": "06/03/2023",
                "disruptionStartTime": "0600"
            }],
            "consequences": [{
                "consequenceType": "operatorWide",
                "description": "No trams through the centre.",
                "removeFromJourneyPlanners": "yes",
                "disruptionDelay": "10",
                "disruptionSeverity": "verySevere",
                "vehicleMode": "tram",
                "consequenceOperators": [
                    { "operatorNoc": "TRAM", "operatorPublicName": "Tram Co" }
                ]
            }]
        });

        // Weekly recurrence, no consequences.
        let flooding = serde_json::json!({
            "id": "d-3",
            "orgId": "org-1",
            "publishStatus": "PUBLISHED",
            "disruptionType": "unplanned",
            "summary": "Flooding",
            "description": "Flooding on the riverside road.",
            "disruptionReason": "flooding",
            "publishStartDate": "01/03/2023",
            "publishStartTime": "0700",
            "disruptionStartDate": "05/03/2023",
            "disruptionStartTime": "0800",
            "disruptionEndDate": "05/03/2023",
            "disruptionEndTime": "1200",
            "disruptionRepeats": "weekly",
            "disruptionRepeatsEndDate": "19/03/2023"
        });

        let store = FakeStore {
            disruptions: vec![
                serde_json::from_value(network_wide).unwrap(),
                serde_json::from_value(operator_wide).unwrap(),
                serde_json::from_value(flooding).unwrap(),
            ],
            organisations: vec![Organisation {
                id: "org-1".to_string(),
                name: "Test Org".to_string(),
            }],
        };
        let sink = FakeSink::default();

        let summary = run(&config(), &store, &sink, now(), "message-1".to_string())
            .await
            .unwrap();
        assert_eq!(summary.situation_count, 3);

        let xml_key = format!("{}-unvalidated-siri.xml", now().timestamp_millis());
        let xml = sink.body("siri-bucket", &xml_key);

        let expected = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Siri version="2.0" xmlns="http://www.siri.org.uk/siri" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.siri.org.uk/siri http://www.siri.org.uk/schema/2.0/xsd/siri.xsd">
    <ServiceDelivery>
        <ResponseTimestamp>2023-03-06T12:00:00.000Z</ResponseTimestamp>
        <ProducerRef>DepartmentForTransport</ProducerRef>
        <ResponseMessageIdentifier>message-1</ResponseMessageIdentifier>
        <SituationExchangeDelivery>
            <ResponseTimestamp>2023-03-06T12:00:00.000Z</ResponseTimestamp>
            <Situations>
                <PtSituationElement>
                    <CreationTime>2023-03-06T12:00:00.000Z</CreationTime>
                    <ParticipantRef>TestOrg</ParticipantRef>
                    <SituationNumber>d-1</SituationNumber>
                    <Version>1</Version>
                    <Source>
                        <SourceType>feed</SourceType>
                        <TimeOfCommunication>2023-03-06T12:00:00.000Z</TimeOfCommunication>
                    </Source>
                    <VersionedAtTime>2023-03-06T12:00:00.000Z</VersionedAtTime>
                    <Progress>open</Progress>
                    <ValidityPeriod>
                        <StartTime>2023-03-02T09:00:00.000Z</StartTime>
                        <EndTime>2023-03-03T17:00:00.000Z</EndTime>
                    </ValidityPeriod>
                    <PublicationWindow>
                        <StartTime>2023-03-01T08:00:00.000Z</StartTime>
                    </PublicationWindow>
                    <MiscellaneousReason>roadworks</MiscellaneousReason>
                    <Planned>false</Planned>
                    <Summary>Road closed</Summary>
                    <Description>The high street is closed for resurfacing.</Description>
                    <Consequences>
                        <Consequence>
                            <Condition>unknown</Condition>
                            <Severity>severe</Severity>
                            <Affects>
                                <Operators>
                                    <AllOperators/>
                                </Operators>
                                <Networks>
                                    <AffectedNetwork>
                                        <VehicleMode>bus</VehicleMode>
                                        <AllLines/>
                                    </AffectedNetwork>
                                </Networks>
                            </Affects>
                            <Advice>
                                <Details>All bus services are disrupted.</Details>
                            </Advice>
                            <Blocking>
                                <JourneyPlanner>false</JourneyPlanner>
                            </Blocking>
                        </Consequence>
                    </Consequences>
                </PtSituationElement>
                <PtSituationElement>
                    <CreationTime>2023-03-06T12:00:00.000Z</CreationTime>
                    <ParticipantRef>TestOrg</ParticipantRef>
                    <SituationNumber>d-2</SituationNumber>
                    <Version>1</Version>
                    <Source>
                        <SourceType>feed</SourceType>
                        <TimeOfCommunication>2023-03-06T12:00:00.000Z</TimeOfCommunication>
                    </Source>
                    <VersionedAtTime>2023-03-06T12:00:00.000Z</VersionedAtTime>
                    <Progress>open</Progress>
                    <ValidityPeriod>
                        <StartTime>2023-03-04T06:00:00.000Z</StartTime>
                        <EndTime>2023-03-04T22:00:00.000Z</EndTime>
                    </ValidityPeriod>
                    <ValidityPeriod>
                        <StartTime>2023-03-06T06:00:00.000Z</StartTime>
                    </ValidityPeriod>
                    <PublicationWindow>
                        <StartTime>2023-03-01T09:00:00.000Z</StartTime>
                    </PublicationWindow>
                    <MiscellaneousReason>specialEvent</MiscellaneousReason>
                    <Planned>true</Planned>
                    <Summary>Parade diversions</Summary>
                    <Description>Trams are diverted for the parade.</Description>
                    <Consequences>
                        <Consequence>
                            <Condition>unknown</Condition>
                            <Severity>verySevere</Severity>
                            <Affects>
                                <Operators>
                                    <AffectedOperator>
                                        <OperatorRef>TRAM</OperatorRef>
                                        <OperatorName>Tram Co</OperatorName>
                                    </AffectedOperator>
                                </Operators>
                                <Networks>
                                    <AffectedNetwork>
                                        <VehicleMode>tram</VehicleMode>
                                        <AllLines/>
                                    </AffectedNetwork>
                                </Networks>
                            </Affects>
                            <Advice>
                                <Details>No trams through the centre.</Details>
                            </Advice>
                            <Blocking>
                                <JourneyPlanner>true</JourneyPlanner>
                            </Blocking>
                            <Delays>
                                <Delay>PT10M</Delay>
                            </Delays>
                        </Consequence>
                    </Consequences>
                </PtSituationElement>
                <PtSituationElement>
                    <CreationTime>2023-03-06T12:00:00.000Z</CreationTime>
                    <ParticipantRef>TestOrg</ParticipantRef>
                    <SituationNumber>d-3</SituationNumber>
                    <Version>1</Version>
                    <Source>
                        <SourceType>feed</SourceType>
                        <TimeOfCommunication>2023-03-06T12:00:00.000Z</TimeOfCommunication>
                    </Source>
                    <VersionedAtTime>2023-03-06T12:00:00.000Z</VersionedAtTime>
                    <Progress>open</Progress>
                    <ValidityPeriod>
                        <StartTime>2023-03-05T08:00:00.000Z</StartTime>
                        <EndTime>2023-03-05T12:00:00.000Z</EndTime>
                    </ValidityPeriod>
                    <ValidityPeriod>
                        <StartTime>2023-03-12T08:00:00.000Z</StartTime>
                        <EndTime>2023-03-12T12:00:00.000Z</EndTime>
                    </ValidityPeriod>
                    <ValidityPeriod>
                        <StartTime>2023-03-19T08:00:00.000Z</StartTime>
                        <EndTime>2023-03-19T12:00:00.000Z</EndTime>
                    </ValidityPeriod>
                    <PublicationWindow>
                        <StartTime>2023-03-01T07:00:00.000Z</StartTime>
                    </PublicationWindow>
                    <EnvironmentReason>flooding</EnvironmentReason>
                    <Planned>false</Planned>
                    <Summary>Flooding</Summary>
                    <Description>Flooding on the riverside road.</Description>
                </PtSituationElement>
            </Situations>
        </SituationExchangeDelivery>
    </ServiceDelivery>
</Siri>"#;

        assert_eq!(normalized(&xml), normalized(expected));
    }

    #[tokio::test]
    async fn empty_input_still_publishes_an_empty_document() {
        let store = FakeStore {
            disruptions: Vec::new(),
            organisations: Vec::new(),
        };
        let sink = FakeSink::default();

        let summary = run(&config(), &store, &sink, now(), "message-1".to_string())
            .await
            .unwrap();
        assert_eq!(summary.situation_count, 0);

        let xml_key = format!("{}-unvalidated-siri.xml", now().timestamp_millis());
        let xml = sink.body("siri-bucket", &xml_key);
        assert!(xml.contains("<Situations/>"));
    }

    #[tokio::test]
    async fn invalid_situations_are_dropped_not_fatal() {
        let mut blank_summary = base_json();
        blank_summary["summary"] = serde_json::json!("");

        let store = FakeStore {
            disruptions: vec![
                disruption("d-1", base_json()),
                disruption("d-3", blank_summary),
            ],
            organisations: vec![Organisation {
                id: "org-1".to_string(),
                name: "Test Org".to_string(),
            }],
        };
        let sink = FakeSink::default();

        let summary = run(&config(), &store, &sink, now(), "message-1".to_string())
            .await
            .unwrap();
        assert_eq!(summary.eligible_count, 2);
        assert_eq!(summary.situation_count, 1);
        assert_eq!(summary.dropped_count, 1);
    }

    #[tokio::test]
    async fn duplicate_situation_numbers_fail_the_run() {
        let store = FakeStore {
            disruptions: vec![
                disruption("d-1", base_json()),
                disruption("d-1", base_json()),
            ],
            organisations: vec![Organisation {
                id: "org-1".to_string(),
                name: "Test Org".to_string(),
            }],
        };
        let sink = FakeSink::default();

        let error = run(&config(), &store, &sink, now(), "message-1".to_string())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("duplicate situation number"));
        assert!(sink.objects.lock().unwrap().is_empty());
    }
}
