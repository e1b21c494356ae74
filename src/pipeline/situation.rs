// src/pipeline/situation.rs

//! Assembly of one `PtSituationElement` per enriched disruption.

use chrono::{DateTime, Utc};

use crate::config::LineRefSource;
use crate::models::EnrichedDisruption;
use crate::siri::{
    InfoLink, Period, PtSituationElement, Source, PROGRESS_OPEN, SOURCE_TYPE_FEED,
};

use super::affects::map_consequence;
use super::validity::expand_validity;

/// Assemble the situation for one disruption.
///
/// The primary validity window is expanded for recurrence; additional
/// declared windows follow it literally, in declaration order.
pub fn build_situation(
    enriched: &EnrichedDisruption,
    now: DateTime<Utc>,
    line_ref_source: LineRefSource,
) -> PtSituationElement {
    let disruption = &enriched.disruption;
    let created_at = disruption.created_at(now);

    let mut validity_period = expand_validity(&disruption.primary_validity());
    validity_period.extend(disruption.validity.iter().map(|validity| Period {
        start_time: validity.start_datetime(),
        end_time: validity.end_datetime(),
    }));

    let info_links = disruption
        .associated_link
        .iter()
        .filter(|link| !link.is_empty())
        .map(|link| InfoLink { uri: link.clone() })
        .collect();

    let consequences = disruption
        .consequences
        .iter()
        .map(|consequence| map_consequence(consequence, line_ref_source))
        .collect();

    PtSituationElement {
        creation_time: created_at,
        participant_ref: enriched.organisation.participant_ref(),
        situation_number: disruption.id.clone(),
        version: disruption.version(),
        source: Source {
            source_type: SOURCE_TYPE_FEED.to_string(),
            time_of_communication: now,
        },
        versioned_at_time: created_at,
        progress: PROGRESS_OPEN.to_string(),
        validity_period,
        publication_window: Period {
            start_time: disruption.publish_start(),
            end_time: disruption.publish_end(),
        },
        reason: disruption.disruption_reason.clone(),
        planned: disruption.is_planned(),
        summary: disruption.summary.clone(),
        description: disruption.description.clone(),
        info_links,
        consequences,
    }
}
