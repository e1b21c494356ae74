// src/models/disruption.rs

//! Disruption records as authored in the management UI.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::consequence::Consequence;
use super::dates::{
    datetime_from_date_and_time, wire_date, wire_date_opt, wire_time, wire_time_opt,
};
use super::reason::Reason;

/// Publish lifecycle state of a disruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishStatus {
    Draft,
    Published,
    Editing,
    PendingApproval,
    Rejected,
    EditPendingApproval,
    PendingEditing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisruptionType {
    Planned,
    Unplanned,
}

/// Recurrence mode of a validity period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisruptionRepeats {
    #[default]
    DoesntRepeat,
    Daily,
    Weekly,
}

/// One declared validity window, possibly recurring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validity {
    #[serde(with = "wire_date")]
    pub disruption_start_date: NaiveDate,

    #[serde(with = "wire_time")]
    pub disruption_start_time: NaiveTime,

    #[serde(default, with = "wire_date_opt", skip_serializing_if = "Option::is_none")]
    pub disruption_end_date: Option<NaiveDate>,

    #[serde(default, with = "wire_time_opt", skip_serializing_if = "Option::is_none")]
    pub disruption_end_time: Option<NaiveTime>,

    #[serde(default)]
    pub disruption_repeats: DisruptionRepeats,

    #[serde(default, with = "wire_date_opt", skip_serializing_if = "Option::is_none")]
    pub disruption_repeats_end_date: Option<NaiveDate>,
}

impl Validity {
    pub fn start_datetime(&self) -> DateTime<Utc> {
        datetime_from_date_and_time(self.disruption_start_date, self.disruption_start_time)
    }

    /// The concrete end instant; requires both an end date and time.
    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        match (self.disruption_end_date, self.disruption_end_time) {
            (Some(date), Some(time)) => Some(datetime_from_date_and_time(date, time)),
            _ => None,
        }
    }
}

/// One entry in a disruption's edit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub datetime: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub history_items: Vec<String>,
}

/// A disruption record as held by the record store.
///
/// Read-only to this pipeline; immutable for the duration of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disruption {
    #[serde(alias = "disruptionId")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    pub publish_status: PublishStatus,

    pub disruption_type: DisruptionType,

    pub summary: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_link: Option<String>,

    pub disruption_reason: Reason,

    // Publication window
    #[serde(with = "wire_date")]
    pub publish_start_date: NaiveDate,
    #[serde(with = "wire_time")]
    pub publish_start_time: NaiveTime,
    #[serde(default, with = "wire_date_opt", skip_serializing_if = "Option::is_none")]
    pub publish_end_date: Option<NaiveDate>,
    #[serde(default, with = "wire_time_opt", skip_serializing_if = "Option::is_none")]
    pub publish_end_time: Option<NaiveTime>,

    // Primary validity
    #[serde(with = "wire_date")]
    pub disruption_start_date: NaiveDate,
    #[serde(with = "wire_time")]
    pub disruption_start_time: NaiveTime,
    #[serde(default, with = "wire_date_opt", skip_serializing_if = "Option::is_none")]
    pub disruption_end_date: Option<NaiveDate>,
    #[serde(default, with = "wire_time_opt", skip_serializing_if = "Option::is_none")]
    pub disruption_end_time: Option<NaiveTime>,
    #[serde(default)]
    pub disruption_repeats: DisruptionRepeats,
    #[serde(default, with = "wire_date_opt", skip_serializing_if = "Option::is_none")]
    pub disruption_repeats_end_date: Option<NaiveDate>,

    /// Additional declared validity periods, beyond the primary one.
    #[serde(default)]
    pub validity: Vec<Validity>,

    #[serde(default)]
    pub consequences: Vec<Consequence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
}

impl Disruption {
    /// The primary validity window carried on the record itself.
    pub fn primary_validity(&self) -> Validity {
        Validity {
            disruption_start_date: self.disruption_start_date,
            disruption_start_time: self.disruption_start_time,
            disruption_end_date: self.disruption_end_date,
            disruption_end_time: self.disruption_end_time,
            disruption_repeats: self.disruption_repeats,
            disruption_repeats_end_date: self.disruption_repeats_end_date,
        }
    }

    pub fn publish_start(&self) -> DateTime<Utc> {
        datetime_from_date_and_time(self.publish_start_date, self.publish_start_time)
    }

    pub fn publish_end(&self) -> Option<DateTime<Utc>> {
        match (self.publish_end_date, self.publish_end_time) {
            (Some(date), Some(time)) => Some(datetime_from_date_and_time(date, time)),
            _ => None,
        }
    }

    pub fn is_planned(&self) -> bool {
        self.disruption_type == DisruptionType::Planned
    }

    /// Creation time: the most recent history entry, falling back to the
    /// direct creation timestamp, falling back to `now`.
    pub fn created_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.history
            .as_ref()
            .and_then(|history| history.last())
            .map(|entry| entry.datetime)
            .or(self.creation_time)
            .unwrap_or(now)
    }

    /// Version number: one per history entry, else 1.
    pub fn version(&self) -> usize {
        match &self.history {
            Some(history) if !history.is_empty() => history.len(),
            _ => 1,
        }
    }
}
