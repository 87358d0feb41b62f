use chrono::{Days, NaiveDate};
use stayclock_engine::{
    MemoryVisitStorage, TravelPlanner, Visit, VisitError, VisitId, compute_accounting,
    compute_future_impact,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

fn back(days: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(days)).unwrap()
}

fn ahead(days: u64) -> NaiveDate {
    today().checked_add_days(Days::new(days)).unwrap()
}

fn visit(id: u64, entry: NaiveDate, exit: NaiveDate) -> Visit {
    Visit::new(VisitId(id), entry, exit, "Schengen").unwrap()
}

#[test]
fn scenario_a_no_visits() {
    init_logs();
    let result = compute_accounting(&[], today());
    assert_eq!(result.days_used, 0);
    assert_eq!(result.days_remaining, 90);
    assert_eq!(result.reset_date, None);
    assert!(result.relevant_visits.is_empty());
}

#[test]
fn scenario_b_eleven_days_ending_today() {
    init_logs();
    let result = compute_accounting(&[visit(1, back(10), today())], today());
    assert_eq!(result.days_used, 11);
    assert_eq!(result.days_remaining, 79);
    assert_eq!(result.reset_date, Some(ahead(181)));
}

#[test]
fn scenario_c_ninety_five_day_stay_is_capped() {
    init_logs();
    let long_stay = visit(1, back(120), back(26));
    assert_eq!(long_stay.days(), 95);
    let result = compute_accounting(&[long_stay], today());
    assert_eq!(result.days_used, 90);
    assert_eq!(result.days_remaining, 0);
    assert_eq!(result.overstay_days, 5);
}

#[test]
fn scenario_d_visit_that_left_the_window_is_ignored() {
    init_logs();
    let old = visit(1, back(200), back(181));
    let result = compute_accounting(&[old], today());
    assert!(result.relevant_visits.is_empty());
    assert_eq!(result.days_used, 0);
    assert_eq!(result.days_remaining, 90);
}

#[test]
fn scenario_e_planned_trip_reanchors_window() {
    init_logs();
    let recent = visit(1, back(20), back(11));
    let planned = visit(2, ahead(30), ahead(40));
    let visits = [recent, planned];

    let now = compute_accounting(&visits, today());
    assert_eq!(now.days_used, 10);

    let projection = compute_future_impact(&visits, today()).unwrap();
    assert_eq!(projection.anchor_visit_id, VisitId(2));
    assert_eq!(projection.anchor_date, ahead(40));
    let reanchored = compute_accounting(&visits, ahead(40));
    assert_eq!(projection.future_days_remaining, reanchored.days_remaining);
    assert_eq!(projection.future_days_remaining, 90 - 10 - 11);
}

#[test]
fn scenario_f_invalid_edit_keeps_committed_visit() {
    init_logs();
    let mut planner = TravelPlanner::with_default_rules(MemoryVisitStorage::new());
    let original = planner.add_visit(back(30), back(20), "Ghent").unwrap();
    planner.begin_edit(original.id()).unwrap();

    let err = planner
        .commit_edit(original.id(), back(5), back(25), "Ghent")
        .unwrap_err();
    assert_eq!(
        err,
        VisitError::InvalidRange {
            entry: back(5),
            exit: back(25),
        }
    );
    assert_eq!(planner.visits(), &[original.clone()]);
    assert_eq!(planner.recompute(today()).days_used, 11);

    assert_eq!(planner.cancel_edit(original.id()).unwrap(), original);
}
