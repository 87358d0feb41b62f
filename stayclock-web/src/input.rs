//! Parsing of form values handed over from the page.
use chrono::NaiveDate;
use stayclock_engine::VisitId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("'{0}' is not a YYYY-MM-DD date")]
    Date(String),
    #[error("'{0}' is not a visit id")]
    VisitId(String),
}

/// Parse an `<input type="date">` value.
///
/// # Errors
///
/// Returns [`InputError::Date`] for anything but an ISO-8601 calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, InputError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| InputError::Date(trimmed.to_string()))
}

/// Parse a visit id rendered into the page as a string.
///
/// # Errors
///
/// Returns [`InputError::VisitId`] when the value is not an unsigned integer.
pub fn parse_visit_id(raw: &str) -> Result<VisitId, InputError> {
    raw.trim()
        .parse()
        .map(VisitId)
        .map_err(|_| InputError::VisitId(raw.to_string()))
}
