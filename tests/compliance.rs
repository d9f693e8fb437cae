#![forbid(unsafe_code)]
use chrono::{Duration, NaiveDate};
use rotaguard::compliance::age_on;
use rotaguard::{
    audit_staff, build_interval, check_daily_rest, check_night_work, check_rolling_average,
    check_young_worker_rules, ComplianceRules, ShiftAssignment, ShiftCode, ShiftWindow, StaffId,
    StaffMember, ViolationKind,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn shift_on(staff: &str, date: NaiveDate, start: &str, end: &str) -> ShiftAssignment {
    let interval = build_interval(&date.to_string(), start, end).unwrap();
    ShiftAssignment::new(StaffId::new(staff), date, interval, ShiftCode::Day12)
}

fn night_window() -> ShiftWindow {
    ShiftWindow::parse("23:00", "06:00").unwrap()
}

#[test]
fn daily_rest_gap_of_nine_hours() {
    let staff = StaffId::new("S1");
    let shifts = vec![
        shift_on("S1", d(2026, 5, 2), "02:00", "10:00"),
        shift_on("S1", d(2026, 5, 1), "09:00", "17:00"),
    ];
    let violations = check_daily_rest(&staff, &shifts, 11);

    assert_eq!(violations.len(), 1);
    let v = &violations[0];
    assert_eq!(v.kind, ViolationKind::DailyRest);
    assert_eq!(v.gap_hours, Some(9.0));
    assert_eq!(v.date, d(2026, 5, 2));
    assert_eq!(v.staff_id, staff);
}

#[test]
fn daily_rest_ignores_other_staff_and_exact_minimum() {
    let shifts = vec![
        shift_on("S1", d(2026, 5, 1), "07:00", "15:00"),
        shift_on("S1", d(2026, 5, 2), "02:00", "10:00"),
        shift_on("S2", d(2026, 5, 1), "07:00", "15:00"),
        shift_on("S2", d(2026, 5, 2), "02:00", "10:00"),
    ];
    assert!(check_daily_rest(&StaffId::new("S1"), &shifts, 11).is_empty());
    assert!(check_daily_rest(&StaffId::new("S3"), &shifts, 11).is_empty());
}

fn daily_shifts(staff: &str, reference: NaiveDate, days: i64, end: &str) -> Vec<ShiftAssignment> {
    (0..days)
        .map(|i| shift_on(staff, reference - Duration::days(i), "08:00", end))
        .collect()
}

#[test]
fn rolling_average_above_limit() {
    let reference = d(2026, 6, 30);
    // 8h par jour sur 17 semaines : 56h/semaine
    let shifts = daily_shifts("S1", reference, 119, "16:00");
    let violations = check_rolling_average(&StaffId::new("S1"), &shifts, false, reference, 17);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::WeeklyAverage);
    let avg = violations[0].hours.unwrap();
    assert!((avg - 56.0).abs() < 1e-9, "{avg}");
}

#[test]
fn rolling_average_within_limit_and_window() {
    let reference = d(2026, 6, 30);
    let shifts = daily_shifts("S1", reference, 119, "14:00");
    assert!(check_rolling_average(&StaffId::new("S1"), &shifts, false, reference, 17).is_empty());

    // au-delà de la fenêtre, rien ne compte
    let old = daily_shifts("S1", reference - Duration::days(200), 119, "20:00");
    assert!(check_rolling_average(&StaffId::new("S1"), &old, false, reference, 17).is_empty());
}

#[test]
fn opt_out_is_exempt() {
    let reference = d(2026, 6, 30);
    let shifts = daily_shifts("S1", reference, 119, "23:00");
    assert!(check_rolling_average(&StaffId::new("S1"), &shifts, true, reference, 17).is_empty());
}

#[test]
fn night_shift_exposure() {
    let shifts = vec![shift_on("S1", d(2026, 5, 1), "22:00", "06:00")];
    let summary = check_night_work(&StaffId::new("S1"), &shifts, night_window());
    assert_eq!(summary.total_night_hours, 7.0);
    assert!(summary.is_night_worker);
}

#[test]
fn early_morning_overlaps_previous_night_window() {
    let shifts = vec![
        shift_on("S1", d(2026, 5, 1), "05:00", "13:00"),
        shift_on("S2", d(2026, 5, 1), "07:00", "19:00"),
    ];
    let s1 = check_night_work(&StaffId::new("S1"), &shifts, night_window());
    assert_eq!(s1.total_night_hours, 1.0);
    let s2 = check_night_work(&StaffId::new("S2"), &shifts, night_window());
    assert_eq!(s2.total_night_hours, 0.0);
    assert!(!s2.is_night_worker);
}

#[test]
fn night_hours_sum_across_shifts() {
    let shifts = vec![
        shift_on("S1", d(2026, 5, 1), "22:00", "06:00"),
        shift_on("S1", d(2026, 5, 2), "22:00", "07:00"),
    ];
    let summary = check_night_work(&StaffId::new("S1"), &shifts, night_window());
    assert_eq!(summary.total_night_hours, 14.0);
}

#[test]
fn age_in_whole_years() {
    assert_eq!(age_on(d(2008, 5, 2), d(2026, 5, 1)), 17);
    assert_eq!(age_on(d(2008, 5, 1), d(2026, 5, 1)), 18);
}

#[test]
fn young_worker_long_shift() {
    let rules = ComplianceRules::default();
    let young = StaffMember::new("Y", "Young").born_on(d(2009, 1, 15));
    let shifts = vec![
        shift_on("Y", d(2026, 5, 1), "07:00", "19:30"),
        shift_on("Y", d(2026, 5, 3), "09:00", "17:00"),
    ];
    let violations = check_young_worker_rules(&young, &shifts, d(2026, 5, 1), &rules);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::YoungWorkerDaily);
    assert_eq!(violations[0].hours, Some(12.5));
}

#[test]
fn young_worker_needs_twelve_hours_rest() {
    let rules = ComplianceRules::default();
    let young = StaffMember::new("Y", "Young").born_on(d(2009, 1, 15));
    let shifts = vec![
        shift_on("Y", d(2026, 5, 1), "14:00", "22:00"),
        shift_on("Y", d(2026, 5, 2), "09:00", "13:00"),
    ];
    let violations = check_young_worker_rules(&young, &shifts, d(2026, 5, 1), &rules);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::YoungWorkerRest);
    // 11h suffit pour un adulte
    assert!(check_daily_rest(&young.id, &shifts, 11).is_empty());
}

#[test]
fn adults_and_unknown_ages_are_not_young_workers() {
    let rules = ComplianceRules::default();
    let shifts = vec![shift_on("A", d(2026, 5, 1), "07:00", "19:30")];
    let adult = StaffMember::new("A", "Adult").born_on(d(2008, 5, 1));
    assert!(check_young_worker_rules(&adult, &shifts, d(2026, 5, 1), &rules).is_empty());
    let unknown = StaffMember::new("A", "Unknown");
    assert!(check_young_worker_rules(&unknown, &shifts, d(2026, 5, 1), &rules).is_empty());
}

#[test]
fn audit_runs_every_check_and_leaves_input_untouched() {
    let rules = ComplianceRules::default();
    let member = StaffMember::new("S1", "Sam");
    let shifts = vec![
        shift_on("S1", d(2026, 5, 1), "14:00", "22:00"),
        shift_on("S1", d(2026, 5, 2), "06:00", "14:00"),
    ];
    let before = shifts.clone();

    let first = audit_staff(&member, &shifts, d(2026, 5, 2), &rules);
    let second = audit_staff(&member, &shifts, d(2026, 5, 2), &rules);

    assert_eq!(shifts, before);
    assert_eq!(first, second);
    assert!(!first.is_compliant());
    assert_eq!(first.violations.len(), 1);
    assert_eq!(first.violations[0].kind, ViolationKind::DailyRest);
    assert!(!first.night_work.is_night_worker);
}

#[cfg(feature = "serde")]
#[test]
fn violation_kinds_serialize_in_screaming_case() {
    let json = serde_json::to_string(&ViolationKind::YoungWorkerDaily).unwrap();
    assert_eq!(json, "\"YOUNG_WORKER_DAILY\"");
    assert_eq!(ViolationKind::DailyRest.to_string(), "DAILY_REST");
}
