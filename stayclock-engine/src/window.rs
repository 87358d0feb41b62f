//! Trailing-window quota accounting.
//!
//! Every call is a pure recomputation over the visit slice it is given;
//! nothing is cached between calls.
use chrono::NaiveDate;
use serde::Serialize;

use crate::rules::WindowRules;
use crate::visit::{Visit, VisitId, add_days, sub_days};

/// Days a single relevant visit contributes to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitContribution {
    pub visit_id: VisitId,
    pub counted_days: u32,
}

/// Quota consumption for one reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingResult {
    pub reference_date: NaiveDate,
    pub window_start: NaiveDate,
    /// Visits whose exit date is on or after `window_start`, in input order.
    pub relevant_visits: Vec<Visit>,
    pub contributions: Vec<VisitContribution>,
    /// In-window days, capped at the quota.
    pub days_used: u32,
    pub days_remaining: u32,
    /// Uncapped in-window days beyond the quota.
    pub overstay_days: u32,
    /// When the earliest counted visit starts leaving the window, if that is
    /// still ahead of the reference date.
    pub reset_date: Option<NaiveDate>,
}

impl AccountingResult {
    #[must_use]
    pub const fn is_compliant(&self) -> bool {
        self.overstay_days == 0
    }

    /// Whole days from the reference date until `reset_date`.
    #[must_use]
    pub fn days_until_reset(&self) -> Option<u32> {
        self.reset_date.map(|reset| {
            let gap = (reset - self.reference_date).num_days();
            u32::try_from(gap).unwrap_or(0)
        })
    }
}

/// Compute quota consumption under the default 90/180 rules.
#[must_use]
pub fn compute_accounting(visits: &[Visit], reference_date: NaiveDate) -> AccountingResult {
    compute_accounting_with(visits, reference_date, &WindowRules::default())
}

/// Compute quota consumption for the window ending at `reference_date`.
#[must_use]
pub fn compute_accounting_with(
    visits: &[Visit],
    reference_date: NaiveDate,
    rules: &WindowRules,
) -> AccountingResult {
    let window_start = sub_days(reference_date, rules.lookback_days());

    let relevant_visits: Vec<Visit> = visits
        .iter()
        .filter(|visit| visit.exit_date() >= window_start)
        .cloned()
        .collect();

    let contributions: Vec<VisitContribution> = relevant_visits
        .iter()
        .map(|visit| VisitContribution {
            visit_id: visit.id(),
            counted_days: visit.days_within(window_start, reference_date),
        })
        .collect();

    // The cap applies to the total: overlapping records must not push the
    // displayed figure past the quota.
    let raw_days = contributions
        .iter()
        .fold(0_u32, |acc, c| acc.saturating_add(c.counted_days));
    let days_used = raw_days.min(rules.quota_days);
    let days_remaining = rules.quota_days - days_used;
    let overstay_days = raw_days.saturating_sub(rules.quota_days);

    let reset_date = relevant_visits
        .iter()
        .min_by_key(|visit| visit.entry_date())
        .map(|earliest| add_days(earliest.exit_date(), rules.reset_offset_days()))
        .filter(|candidate| *candidate > reference_date);

    log::debug!(
        "window {window_start}..={reference_date}: used {days_used}, {} relevant visits",
        relevant_visits.len()
    );

    AccountingResult {
        reference_date,
        window_start,
        relevant_visits,
        contributions,
        days_used,
        days_remaining,
        overstay_days,
        reset_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn visit(id: u64, entry: NaiveDate, exit: NaiveDate) -> Visit {
        Visit::new(VisitId(id), entry, exit, "").unwrap()
    }

    #[test]
    fn window_start_is_179_days_back() {
        let today = date(2024, 6, 30);
        let result = compute_accounting(&[], today);
        assert_eq!(result.window_start, date(2024, 1, 3));
        assert_eq!(result.days_used, 0);
        assert_eq!(result.days_remaining, 90);
        assert_eq!(result.reset_date, None);
        assert!(result.is_compliant());
    }

    #[test]
    fn straddling_visit_counts_only_in_window_part() {
        let today = date(2024, 6, 30);
        let start = date(2024, 1, 3);
        let straddle = visit(1, sub_days(start, 5), add_days(start, 4));
        let result = compute_accounting(&[straddle], today);
        assert_eq!(result.days_used, 5);
        assert_eq!(result.contributions[0].counted_days, 5);
    }

    #[test]
    fn future_visit_is_relevant_but_counts_zero() {
        let today = date(2024, 6, 30);
        let future = visit(1, add_days(today, 3), add_days(today, 9));
        let result = compute_accounting(&[future], today);
        assert_eq!(result.relevant_visits.len(), 1);
        assert_eq!(result.days_used, 0);
        assert_eq!(result.reset_date, Some(add_days(today, 9 + 181)));
    }

    #[test]
    fn overlapping_visits_cap_and_report_overstay() {
        let today = date(2024, 6, 30);
        let a = visit(1, sub_days(today, 59), today);
        let b = visit(2, sub_days(today, 59), today);
        let result = compute_accounting(&[a, b], today);
        assert_eq!(result.days_used, 90);
        assert_eq!(result.days_remaining, 0);
        assert_eq!(result.overstay_days, 30);
        assert!(!result.is_compliant());
    }

    #[test]
    fn reset_date_tracks_earliest_entry() {
        let today = date(2024, 6, 30);
        let early = visit(1, sub_days(today, 100), sub_days(today, 95));
        let late = visit(2, sub_days(today, 20), sub_days(today, 10));
        let result = compute_accounting(&[late, early], today);
        let expected = add_days(sub_days(today, 95), 181);
        assert_eq!(result.reset_date, Some(expected));
        assert_eq!(result.days_until_reset(), Some(86));
    }

    #[test]
    fn visit_ending_on_window_start_still_holds_a_reset() {
        let today = date(2024, 6, 30);
        let edge = visit(1, date(2024, 1, 1), date(2024, 1, 3));
        let result = compute_accounting(&[edge], today);
        assert_eq!(result.relevant_visits.len(), 1);
        assert_eq!(result.days_used, 1);
        assert_eq!(result.reset_date, Some(add_days(today, 2)));
    }

    #[test]
    fn custom_rules_shift_window() {
        let rules = WindowRules {
            quota_days: 10,
            window_length_days: 30,
        };
        let today = date(2024, 6, 30);
        let trip = visit(1, sub_days(today, 40), today);
        let result = compute_accounting_with(&[trip], today, &rules);
        assert_eq!(result.window_start, sub_days(today, 29));
        assert_eq!(result.days_used, 10);
        assert_eq!(result.overstay_days, 20);
    }
}
