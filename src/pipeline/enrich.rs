// src/pipeline/enrich.rs

//! Organisation enrichment and eligibility filtering.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::future;
use tracing::warn;

use crate::error::Result;
use crate::models::{Disruption, EnrichedDisruption, PublishStatus};
use crate::storage::DisruptionStore;

/// Eligibility rule for every output artifact: the disruption must be
/// published and its publish window must not have closed.
pub fn include_disruption(disruption: &Disruption, now: DateTime<Utc>) -> bool {
    if disruption.publish_status != PublishStatus::Published {
        return false;
    }

    if let Some(publish_end) = disruption.publish_end() {
        if now > publish_end {
            return false;
        }
    }

    true
}

/// Join disruptions to their organisations and drop ineligible records.
///
/// Each distinct organisation id is resolved once, concurrently. A
/// disruption with no organisation id, an unresolvable organisation, or a
/// failed eligibility check is dropped with a warn log — a data-quality
/// condition, not a pipeline fault. Input order is preserved.
pub async fn enrich_disruptions(
    store: &dyn DisruptionStore,
    disruptions: Vec<Disruption>,
    now: DateTime<Utc>,
) -> Result<Vec<EnrichedDisruption>> {
    let mut org_ids: Vec<&str> = disruptions
        .iter()
        .filter_map(|d| d.org_id.as_deref())
        .filter(|id| !id.is_empty())
        .collect();
    org_ids.sort_unstable();
    org_ids.dedup();

    let lookups = org_ids.iter().map(|id| store.get_organisation(id));
    let resolved = future::join_all(lookups).await;

    let mut organisations = HashMap::new();
    for result in resolved {
        if let Some(organisation) = result? {
            organisations.insert(organisation.id.clone(), organisation);
        }
    }

    let mut enriched = Vec::with_capacity(disruptions.len());
    for disruption in disruptions {
        let Some(org_id) = disruption.org_id.as_deref().filter(|id| !id.is_empty()) else {
            warn!(disruption_id = %disruption.id, "dropping disruption with no organisation id");
            continue;
        };

        let Some(organisation) = organisations.get(org_id) else {
            warn!(
                disruption_id = %disruption.id,
                org_id = %org_id,
                "dropping disruption with unknown organisation"
            );
            continue;
        };

        if !include_disruption(&disruption, now) {
            warn!(disruption_id = %disruption.id, "dropping ineligible disruption");
            continue;
        }

        enriched.push(EnrichedDisruption {
            disruption,
            organisation: organisation.clone(),
        });
    }

    Ok(enriched)
}
