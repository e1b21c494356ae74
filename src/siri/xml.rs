// src/siri/xml.rs

//! XML rendering of the service-delivery envelope.
//!
//! A pure rendering pass: the envelope is validated before it reaches this
//! module. Output is deterministic — elements follow struct field order,
//! empty elements self-close, and the document carries the fixed SIRI
//! declaration and namespace attributes.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::siri::{
    timestamp, Affects, AffectedNetwork, LineCoverage, Operators, Period, PtSituationElement,
    ServiceDelivery, Siri, SituationConsequence, SCHEMA_LOCATION, SIRI_NAMESPACE, SIRI_VERSION,
    XSI_NAMESPACE,
};

/// Render the envelope to a complete XML document string.
pub fn to_xml(siri: &Siri) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("Siri");
    root.push_attribute(("version", SIRI_VERSION));
    root.push_attribute(("xmlns", SIRI_NAMESPACE));
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    writer.write_event(Event::Start(root))?;

    write_service_delivery(&mut writer, &siri.service_delivery)?;

    writer.write_event(Event::End(BytesEnd::new("Siri")))?;

    let bytes = writer.into_inner();
    String::from_utf8(bytes).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()).into()
    })
}

fn write_service_delivery<W: Write>(
    writer: &mut Writer<W>,
    delivery: &ServiceDelivery,
) -> quick_xml::Result<()> {
    writer
        .create_element("ServiceDelivery")
        .write_inner_content::<_, quick_xml::Error>(|w| {
            text_element(w, "ResponseTimestamp", &timestamp(delivery.response_timestamp))?;
            text_element(w, "ProducerRef", &delivery.producer_ref)?;
            text_element(
                w,
                "ResponseMessageIdentifier",
                &delivery.response_message_identifier,
            )?;
            w.create_element("SituationExchangeDelivery")
                .write_inner_content::<_, quick_xml::Error>(|w| {
                    let exchange = &delivery.situation_exchange_delivery;
                    text_element(
                        w,
                        "ResponseTimestamp",
                        &timestamp(exchange.response_timestamp),
                    )?;
                    if exchange.situations.is_empty() {
                        empty_element(w, "Situations")?;
                    } else {
                        w.create_element("Situations").write_inner_content::<_, quick_xml::Error>(|w| {
                            for situation in &exchange.situations {
                                write_situation(w, situation)?;
                            }
                            Ok(())
                        })?;
                    }
                    Ok(())
                })?;
            Ok(())
        })?;
    Ok(())
}

fn write_situation<W: Write>(
    writer: &mut Writer<W>,
    situation: &PtSituationElement,
) -> quick_xml::Result<()> {
    writer
        .create_element("PtSituationElement")
        .write_inner_content::<_, quick_xml::Error>(|w| {
            text_element(w, "CreationTime", &timestamp(situation.creation_time))?;
            text_element(w, "ParticipantRef", &situation.participant_ref)?;
            text_element(w, "SituationNumber", &situation.situation_number)?;
            text_element(w, "Version", &situation.version.to_string())?;
            w.create_element("Source").write_inner_content::<_, quick_xml::Error>(|w| {
                text_element(w, "SourceType", &situation.source.source_type)?;
                text_element(
                    w,
                    "TimeOfCommunication",
                    &timestamp(situation.source.time_of_communication),
                )?;
                Ok(())
            })?;
            text_element(w, "VersionedAtTime", &timestamp(situation.versioned_at_time))?;
            text_element(w, "Progress", &situation.progress)?;
            for period in &situation.validity_period {
                write_period(w, "ValidityPeriod", period)?;
            }
            write_period(w, "PublicationWindow", &situation.publication_window)?;
            text_element(
                w,
                situation.reason.element_name(),
                &situation.reason.wire_value(),
            )?;
            text_element(w, "Planned", bool_str(situation.planned))?;
            text_element(w, "Summary", &situation.summary)?;
            text_element(w, "Description", &situation.description)?;
            if !situation.info_links.is_empty() {
                w.create_element("InfoLinks").write_inner_content::<_, quick_xml::Error>(|w| {
                    for link in &situation.info_links {
                        w.create_element("InfoLink").write_inner_content::<_, quick_xml::Error>(|w| {
                            text_element(w, "Uri", &link.uri)
                        })?;
                    }
                    Ok(())
                })?;
            }
            if !situation.consequences.is_empty() {
                w.create_element("Consequences").write_inner_content::<_, quick_xml::Error>(|w| {
                    for consequence in &situation.consequences {
                        write_consequence(w, consequence)?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_consequence<W: Write>(
    writer: &mut Writer<W>,
    consequence: &SituationConsequence,
) -> quick_xml::Result<()> {
    writer
        .create_element("Consequence")
        .write_inner_content::<_, quick_xml::Error>(|w| {
            text_element(w, "Condition", &consequence.condition)?;
            text_element(w, "Severity", consequence.severity.as_str())?;
            write_affects(w, &consequence.affects)?;
            w.create_element("Advice").write_inner_content::<_, quick_xml::Error>(|w| {
                text_element(w, "Details", &consequence.advice)
            })?;
            w.create_element("Blocking").write_inner_content::<_, quick_xml::Error>(|w| {
                text_element(w, "JourneyPlanner", bool_str(consequence.journey_planner))
            })?;
            if let Some(delay) = &consequence.delay {
                w.create_element("Delays").write_inner_content::<_, quick_xml::Error>(|w| {
                    text_element(w, "Delay", delay)
                })?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_affects<W: Write>(writer: &mut Writer<W>, affects: &Affects) -> quick_xml::Result<()> {
    if affects.is_empty() {
        return empty_element(writer, "Affects");
    }

    writer.create_element("Affects").write_inner_content::<_, quick_xml::Error>(|w| {
        if let Some(operators) = &affects.operators {
            w.create_element("Operators").write_inner_content::<_, quick_xml::Error>(|w| {
                match operators {
                    Operators::AllOperators => empty_element(w, "AllOperators")?,
                    Operators::Affected(affected) => {
                        for operator in affected {
                            w.create_element("AffectedOperator").write_inner_content::<_, quick_xml::Error>(|w| {
                                text_element(w, "OperatorRef", &operator.operator_ref)?;
                                if let Some(name) = &operator.operator_name {
                                    text_element(w, "OperatorName", name)?;
                                }
                                Ok(())
                            })?;
                        }
                    }
                }
                Ok(())
            })?;
        }
        if let Some(network) = &affects.networks {
            write_network(w, network)?;
        }
        if let Some(stop_points) = &affects.stop_points {
            w.create_element("StopPoints").write_inner_content::<_, quick_xml::Error>(|w| {
                for stop in stop_points {
                    w.create_element("AffectedStopPoint").write_inner_content::<_, quick_xml::Error>(|w| {
                        text_element(w, "StopPointRef", &stop.stop_point_ref)?;
                        text_element(w, "StopPointName", &stop.stop_point_name)?;
                        w.create_element("Location").write_inner_content::<_, quick_xml::Error>(|w| {
                            text_element(w, "Longitude", &stop.longitude.to_string())?;
                            text_element(w, "Latitude", &stop.latitude.to_string())?;
                            Ok(())
                        })?;
                        w.create_element("AffectedModes").write_inner_content::<_, quick_xml::Error>(|w| {
                            w.create_element("Mode").write_inner_content::<_, quick_xml::Error>(|w| {
                                text_element(w, "VehicleMode", stop.vehicle_mode.as_str())
                            })?;
                            Ok(())
                        })?;
                        Ok(())
                    })?;
                }
                Ok(())
            })?;
        }
        Ok(())
    })?;
    Ok(())
}

fn write_network<W: Write>(
    writer: &mut Writer<W>,
    network: &AffectedNetwork,
) -> quick_xml::Result<()> {
    writer.create_element("Networks").write_inner_content::<_, quick_xml::Error>(|w| {
        w.create_element("AffectedNetwork").write_inner_content::<_, quick_xml::Error>(|w| {
            text_element(w, "VehicleMode", network.vehicle_mode.as_str())?;
            match &network.coverage {
                LineCoverage::AllLines => empty_element(w, "AllLines")?,
                LineCoverage::Lines(lines) => {
                    for line in lines {
                        w.create_element("AffectedLine").write_inner_content::<_, quick_xml::Error>(|w| {
                            if let Some(operator) = &line.affected_operator {
                                w.create_element("AffectedOperator").write_inner_content::<_, quick_xml::Error>(
                                    |w| {
                                        text_element(w, "OperatorRef", &operator.operator_ref)?;
                                        if let Some(name) = &operator.operator_name {
                                            text_element(w, "OperatorName", name)?;
                                        }
                                        Ok(())
                                    },
                                )?;
                            }
                            text_element(w, "LineRef", &line.line_ref)?;
                            if let Some(name) = &line.published_line_name {
                                text_element(w, "PublishedLineName", name)?;
                            }
                            if let Some(direction) = &line.direction {
                                w.create_element("Direction").write_inner_content::<_, quick_xml::Error>(|w| {
                                    text_element(w, "DirectionRef", direction.as_str())
                                })?;
                            }
                            Ok(())
                        })?;
                    }
                }
            }
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}

fn write_period<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    period: &Period,
) -> quick_xml::Result<()> {
    writer.create_element(name).write_inner_content::<_, quick_xml::Error>(|w| {
        text_element(w, "StartTime", &timestamp(period.start_time))?;
        if let Some(end_time) = period.end_time {
            text_element(w, "EndTime", &timestamp(end_time))?;
        }
        Ok(())
    })?;
    Ok(())
}

fn text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> quick_xml::Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(value))?;
    Ok(())
}

fn empty_element<W: Write>(writer: &mut Writer<W>, name: &str) -> quick_xml::Result<()> {
    writer.create_element(name).write_empty()?;
    Ok(())
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
