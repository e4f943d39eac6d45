use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::selection::SelectionState;
use crate::state::StarSession;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select both a start and end date.")]
    MissingDates,
    #[error("{0:?} is not a YYYY-MM-DD date")]
    BadDate(String),
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("session date {0:?} could not be read")]
    BadSessionDate(String),
    #[error("session dated {session} is stale; assignments close after {cutoff}")]
    StaleSession { session: NaiveDate, cutoff: NaiveDate },
    #[error("Select at least one team member.")]
    NothingSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn start_param(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

pub fn parse_input_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let cleaned = raw.trim();
    NaiveDate::parse_from_str(cleaned, DATE_FORMAT)
        .map_err(|_| ValidationError::BadDate(cleaned.to_string()))
}

/// Both inputs present, well formed, and in order.
pub fn check_date_range(start: &str, end: &str) -> Result<DateRange, ValidationError> {
    if start.trim().is_empty() || end.trim().is_empty() {
        return Err(ValidationError::MissingDates);
    }
    let start = parse_input_date(start)?;
    let end = parse_input_date(end)?;
    if start > end {
        return Err(ValidationError::InvertedRange { start, end });
    }
    Ok(DateRange { start, end })
}

/// Session dates come back as plain dates or ISO date-times; only the day counts.
pub fn parse_session_date(raw: &str) -> Option<NaiveDate> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    let trimmed = raw.trim();
    // Offset forms keep the calendar day the service wrote.
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local().date());
    }
    let cleaned = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    if let Ok(date) = NaiveDate::parse_from_str(cleaned, DATE_FORMAT) {
        return Some(date);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// A session dated before yesterday is closed for assignment.
pub fn check_session_fresh(session_date: &str, today: NaiveDate) -> Result<(), ValidationError> {
    let session = parse_session_date(session_date)
        .ok_or_else(|| ValidationError::BadSessionDate(session_date.to_string()))?;
    let cutoff = today - ChronoDuration::days(1);
    if session < cutoff {
        return Err(ValidationError::StaleSession { session, cutoff });
    }
    Ok(())
}

pub fn check_assignment(
    session: &StarSession,
    selection: &SelectionState,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    check_session_fresh(&session.session_date, today)?;
    if selection.selected_count() == 0 {
        return Err(ValidationError::NothingSelected);
    }
    Ok(())
}
