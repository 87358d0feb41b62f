//! Balance projection after planned visits.
use chrono::NaiveDate;
use serde::Serialize;

use crate::rules::WindowRules;
use crate::visit::{Visit, VisitId};
use crate::window::compute_accounting_with;

/// Balance as of the exit date of the furthest planned visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub future_days_remaining: u32,
    pub future_days_used: u32,
    pub anchor_visit_id: VisitId,
    pub anchor_date: NaiveDate,
}

/// Visits that have not started yet relative to `today`.
pub fn future_visits(visits: &[Visit], today: NaiveDate) -> impl Iterator<Item = &Visit> {
    visits.iter().filter(move |visit| visit.entry_date() > today)
}

/// Project the balance under the default 90/180 rules.
#[must_use]
pub fn compute_future_impact(visits: &[Visit], today: NaiveDate) -> Option<ProjectionResult> {
    compute_future_impact_with(visits, today, &WindowRules::default())
}

/// Re-anchor the rolling window at the latest planned exit date.
///
/// Returns `None` when no visit starts after `today`.
#[must_use]
pub fn compute_future_impact_with(
    visits: &[Visit],
    today: NaiveDate,
    rules: &WindowRules,
) -> Option<ProjectionResult> {
    let anchor = future_visits(visits, today).max_by_key(|visit| visit.exit_date())?;
    let anchor_date = anchor.exit_date();
    let projected = compute_accounting_with(visits, anchor_date, rules);

    log::debug!(
        "projection anchored on visit {} at {anchor_date}: {} days remaining",
        anchor.id(),
        projected.days_remaining
    );

    Some(ProjectionResult {
        future_days_remaining: projected.days_remaining,
        future_days_used: projected.days_used,
        anchor_visit_id: anchor.id(),
        anchor_date,
    })
}
