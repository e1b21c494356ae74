// src/pipeline/validate.rs

//! Two-tier output validation.
//!
//! The soft tier checks each situation in isolation; failures drop that
//! situation from the document and log a warning. The hard tier checks the
//! assembled document just before serialization and fails the whole run,
//! since emitting a malformed document is worse than emitting none.

use tracing::warn;
use url::Url;

use crate::error::{AppError, Result};
use crate::siri::{Period, PtSituationElement, Siri};

fn is_participant_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':')
}

fn check_period(period: &Period, label: &str) -> std::result::Result<(), String> {
    if let Some(end_time) = period.end_time {
        if end_time < period.start_time {
            return Err(format!("{label} ends before it starts"));
        }
    }
    Ok(())
}

fn check_situation(situation: &PtSituationElement) -> std::result::Result<(), String> {
    if situation.situation_number.is_empty() {
        return Err("missing situation number".to_string());
    }
    if situation.participant_ref.is_empty() {
        return Err("missing participant ref".to_string());
    }
    if !situation.participant_ref.chars().all(is_participant_char) {
        return Err("participant ref contains invalid characters".to_string());
    }
    if situation.summary.is_empty() {
        return Err("missing summary".to_string());
    }
    if situation.description.is_empty() {
        return Err("missing description".to_string());
    }
    if situation.validity_period.is_empty() {
        return Err("no validity periods".to_string());
    }
    for period in &situation.validity_period {
        check_period(period, "validity period")?;
    }
    check_period(&situation.publication_window, "publication window")?;
    for info_link in &situation.info_links {
        if Url::parse(&info_link.uri).is_err() {
            return Err(format!("info link is not a valid url: {}", info_link.uri));
        }
    }
    for consequence in &situation.consequences {
        if consequence.advice.is_empty() {
            return Err("consequence has no advice text".to_string());
        }
    }
    Ok(())
}

/// Soft tier: validate one situation, mapping failures to a
/// [`AppError::Validation`] carrying the situation number.
pub fn validate_situation(situation: &PtSituationElement) -> Result<()> {
    check_situation(situation)
        .map_err(|message| AppError::validation(&situation.situation_number, message))
}

/// Run the soft tier over every assembled situation, keeping the valid
/// ones in order. Invalid situations are dropped with a warning.
pub fn validate_situations(situations: Vec<PtSituationElement>) -> Vec<PtSituationElement> {
    situations
        .into_iter()
        .filter(|situation| match validate_situation(situation) {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    situation_number = %situation.situation_number,
                    %error,
                    "dropping invalid situation"
                );
                false
            }
        })
        .collect()
}

/// Hard tier: validate the assembled document. Any failure here aborts
/// the run before anything is uploaded.
pub fn validate_document(siri: &Siri) -> Result<()> {
    let delivery = &siri.service_delivery;
    if delivery.producer_ref.is_empty() {
        return Err(AppError::document("missing producer ref"));
    }
    if delivery.response_message_identifier.is_empty() {
        return Err(AppError::document("missing response message identifier"));
    }

    let situations = &delivery.situation_exchange_delivery.situations;
    for situation in situations {
        check_situation(situation).map_err(|message| {
            AppError::document(format!(
                "situation {} is invalid: {message}",
                situation.situation_number
            ))
        })?;
    }

    let mut numbers: Vec<&str> = situations
        .iter()
        .map(|s| s.situation_number.as_str())
        .collect();
    numbers.sort_unstable();
    for window in numbers.windows(2) {
        if window[0] == window[1] {
            return Err(AppError::document(format!(
                "duplicate situation number: {}",
                window[0]
            )));
        }
    }

    Ok(())
}
