// src/pipeline/validity.rs

//! Recurrence expansion of validity periods.

use chrono::{Days, NaiveTime};

use crate::models::{DisruptionRepeats, Validity};
use crate::siri::Period;

/// Expand one declared validity window into concrete periods, earliest
/// first. The first entry is always the literal base period.
///
/// Recurring windows need both a concrete end datetime (to carry the step)
/// and a recurrence end date. The boundary is the recurrence end date
/// advanced by one day, so repeats falling anywhere on that final day are
/// kept; no emitted period ends on or past the boundary, which also bounds
/// the loop.
pub fn expand_validity(validity: &Validity) -> Vec<Period> {
    let mut periods = vec![Period {
        start_time: validity.start_datetime(),
        end_time: validity.end_datetime(),
    }];

    let step = match validity.disruption_repeats {
        DisruptionRepeats::DoesntRepeat => return periods,
        DisruptionRepeats::Daily => Days::new(1),
        DisruptionRepeats::Weekly => Days::new(7),
    };

    let (Some(repeats_end_date), Some(base_end)) =
        (validity.disruption_repeats_end_date, validity.end_datetime())
    else {
        return periods;
    };

    let boundary = repeats_end_date
        .checked_add_days(Days::new(1))
        .map(|date| date.and_time(NaiveTime::MIN).and_utc());
    let Some(boundary) = boundary else {
        return periods;
    };

    let mut cursor_start = validity.start_datetime() + step;
    let mut cursor_end = base_end + step;

    while cursor_end < boundary {
        periods.push(Period {
            start_time: cursor_start,
            end_time: Some(cursor_end),
        });
        cursor_start = cursor_start + step;
        cursor_end = cursor_end + step;
    }

    periods
}
