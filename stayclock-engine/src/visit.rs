//! Visit records and calendar-day arithmetic
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::constants::DEFAULT_LOCATION;
use crate::error::VisitError;

/// Opaque, stable identifier of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitId(pub u64);

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stay inside the regulated zone.
///
/// The date range is private so that `entry_date <= exit_date` holds for
/// every value of this type, including deserialized ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "VisitRecord")]
pub struct Visit {
    id: VisitId,
    entry_date: NaiveDate,
    exit_date: NaiveDate,
    location: String,
}

/// Wire shape of a visit before the range invariant is checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisitRecord {
    id: VisitId,
    entry_date: NaiveDate,
    exit_date: NaiveDate,
    #[serde(default, deserialize_with = "location_or_default")]
    location: String,
}

fn location_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_location(raw.as_deref().unwrap_or_default()))
}

impl TryFrom<VisitRecord> for Visit {
    type Error = VisitError;

    fn try_from(record: VisitRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.entry_date,
            record.exit_date,
            &record.location,
        )
    }
}

/// Trim a free-text label, substituting the placeholder when blank.
#[must_use]
pub fn normalize_location(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_LOCATION.to_string()
    } else {
        trimmed.to_string()
    }
}

/// The first id that appears more than once, scanning in list order.
#[must_use]
pub fn first_duplicate_id(visits: &[Visit]) -> Option<VisitId> {
    let mut seen = HashSet::with_capacity(visits.len());
    visits
        .iter()
        .map(Visit::id)
        .find(|id| !seen.insert(*id))
}

/// Inclusive number of calendar days in `[start, end]`, or 0 when `start > end`.
#[must_use]
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }
    let span = (end - start).num_days() + 1;
    u32::try_from(span).unwrap_or(u32::MAX)
}

/// Shift a date forward, saturating at the calendar maximum.
#[must_use]
pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Shift a date backward, saturating at the calendar minimum.
#[must_use]
pub fn sub_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

impl Visit {
    /// Build a visit, rejecting ranges where entry falls after exit.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::InvalidRange`] when `entry_date > exit_date`.
    pub fn new(
        id: VisitId,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
        location: &str,
    ) -> Result<Self, VisitError> {
        if entry_date > exit_date {
            return Err(VisitError::InvalidRange {
                entry: entry_date,
                exit: exit_date,
            });
        }
        Ok(Self {
            id,
            entry_date,
            exit_date,
            location: normalize_location(location),
        })
    }

    #[must_use]
    pub const fn id(&self) -> VisitId {
        self.id
    }

    #[must_use]
    pub const fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }

    #[must_use]
    pub const fn exit_date(&self) -> NaiveDate {
        self.exit_date
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Inclusive day count; always at least 1.
    #[must_use]
    pub fn days(&self) -> u32 {
        inclusive_days(self.entry_date, self.exit_date)
    }

    /// Days of this visit falling inside `[start, end]`.
    #[must_use]
    pub fn days_within(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        inclusive_days(self.entry_date.max(start), self.exit_date.min(end))
    }

    pub(crate) const fn reassign_id(&mut self, id: VisitId) {
        self.id = id;
    }

    /// Replace the mutable fields after the range has been validated.
    pub(crate) fn apply(&mut self, fields: VisitFields) {
        self.entry_date = fields.entry_date;
        self.exit_date = fields.exit_date;
        self.location = fields.location;
    }
}

/// The user-editable part of a visit, applied when an edit commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VisitFields {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_is_inclusive() {
        let visit = Visit::new(VisitId(1), date(2024, 3, 1), date(2024, 3, 1), "Paris").unwrap();
        assert_eq!(visit.days(), 1);
        let visit = Visit::new(VisitId(2), date(2024, 2, 27), date(2024, 3, 2), "Rome").unwrap();
        assert_eq!(visit.days(), 5);
    }

    #[test]
    fn new_rejects_reversed_range() {
        let err = Visit::new(VisitId(1), date(2024, 3, 2), date(2024, 3, 1), "Oslo").unwrap_err();
        assert_eq!(
            err,
            VisitError::InvalidRange {
                entry: date(2024, 3, 2),
                exit: date(2024, 3, 1),
            }
        );
    }

    #[test]
    fn blank_location_uses_placeholder() {
        let visit = Visit::new(VisitId(1), date(2024, 1, 1), date(2024, 1, 2), "   ").unwrap();
        assert_eq!(visit.location(), DEFAULT_LOCATION);
        let visit = Visit::new(VisitId(1), date(2024, 1, 1), date(2024, 1, 2), " Lisbon ").unwrap();
        assert_eq!(visit.location(), "Lisbon");
    }

    #[test]
    fn days_within_clips_both_ends() {
        let visit = Visit::new(VisitId(1), date(2024, 1, 1), date(2024, 1, 31), "").unwrap();
        assert_eq!(visit.days_within(date(2024, 1, 10), date(2024, 1, 20)), 11);
        assert_eq!(visit.days_within(date(2024, 2, 1), date(2024, 2, 20)), 0);
    }

    #[test]
    fn first_duplicate_id_reports_repeat() {
        let a = Visit::new(VisitId(1), date(2024, 1, 1), date(2024, 1, 2), "").unwrap();
        let b = Visit::new(VisitId(2), date(2024, 2, 1), date(2024, 2, 2), "").unwrap();
        assert_eq!(first_duplicate_id(&[a.clone(), b.clone()]), None);
        assert_eq!(first_duplicate_id(&[a.clone(), b, a]), Some(VisitId(1)));
    }

    #[test]
    fn serializes_as_camel_case_iso_dates() {
        let visit = Visit::new(VisitId(7), date(2024, 5, 1), date(2024, 5, 3), "Vienna").unwrap();
        let json = serde_json::to_value(&visit).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "entryDate": "2024-05-01",
                "exitDate": "2024-05-03",
                "location": "Vienna",
            })
        );
    }

    #[test]
    fn deserialize_enforces_range_and_defaults_location() {
        let ok: Visit =
            serde_json::from_str(r#"{"id":1,"entryDate":"2024-05-01","exitDate":"2024-05-01"}"#)
                .unwrap();
        assert_eq!(ok.location(), DEFAULT_LOCATION);

        let nulled: Visit = serde_json::from_str(
            r#"{"id":1,"entryDate":"2024-05-01","exitDate":"2024-05-01","location":null}"#,
        )
        .unwrap();
        assert_eq!(nulled.location(), DEFAULT_LOCATION);

        let bad = serde_json::from_str::<Visit>(
            r#"{"id":1,"entryDate":"2024-05-02","exitDate":"2024-05-01","location":"x"}"#,
        );
        assert!(bad.is_err());
    }
}
