//! Contrôles réglementaires du temps de travail.
//!
//! Fonctions pures sur une liste d'affectations, quelle que soit son origine
//! (génération ou saisie manuelle). Chaque contrôle ne retient que les
//! affectations de la personne visée ; l'ordre des appels est indifférent.

use crate::model::{ShiftAssignment, StaffId, StaffMember};
use crate::roster::rest_gap_hours;
use crate::time::{overlap_minutes, ShiftWindow, TimeOfDay};
use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum ViolationKind {
    DailyRest,
    WeeklyAverage,
    YoungWorkerDaily,
    YoungWorkerRest,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::DailyRest => "DAILY_REST",
            ViolationKind::WeeklyAverage => "WEEKLY_AVERAGE",
            ViolationKind::YoungWorkerDaily => "YOUNG_WORKER_DAILY",
            ViolationKind::YoungWorkerRest => "YOUNG_WORKER_REST",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infraction constatée ; résultat dérivé, jamais stocké.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComplianceViolation {
    pub kind: ViolationKind,
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub message: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub gap_hours: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NightWorkSummary {
    pub staff_id: StaffId,
    pub total_night_hours: f64,
    pub is_night_worker: bool,
}

/// Seuils réglementaires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplianceRules {
    pub min_rest_hours: u32,
    pub weekly_limit_hours: f64,
    pub window_weeks: u32,
    pub night_window: ShiftWindow,
    pub young_worker_max_shift_hours: u32,
    pub young_worker_min_rest_hours: u32,
}

impl Default for ComplianceRules {
    fn default() -> Self {
        let hm = |h, m| TimeOfDay::hm(h, m).unwrap_or(TimeOfDay::MIDNIGHT);
        Self {
            min_rest_hours: 11,
            weekly_limit_hours: 48.0,
            window_weeks: 17,
            night_window: ShiftWindow::new(hm(23, 0), hm(6, 0)),
            young_worker_max_shift_hours: 8,
            young_worker_min_rest_hours: 12,
        }
    }
}

fn own_sorted<'a>(
    staff_id: &StaffId,
    assignments: &'a [ShiftAssignment],
) -> Vec<&'a ShiftAssignment> {
    let mut own: Vec<&ShiftAssignment> = assignments
        .iter()
        .filter(|a| &a.staff_id == staff_id)
        .collect();
    own.sort_by_key(|a| a.start);
    own
}

fn rest_gaps(
    staff_id: &StaffId,
    assignments: &[ShiftAssignment],
    min_rest_hours: u32,
    kind: ViolationKind,
) -> Vec<ComplianceViolation> {
    let own = own_sorted(staff_id, assignments);
    own.windows(2)
        .filter_map(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            let gap = rest_gap_hours(prev.end, next.start);
            (gap < f64::from(min_rest_hours)).then(|| ComplianceViolation {
                kind,
                staff_id: staff_id.clone(),
                date: next.date,
                message: format!(
                    "only {gap:.1}h rest before shift on {} (minimum {min_rest_hours}h)",
                    next.date
                ),
                gap_hours: Some(gap),
                hours: None,
            })
        })
        .collect()
}

/// Repos quotidien : écart entre deux shifts consécutifs (triés par début).
pub fn check_daily_rest(
    staff_id: &StaffId,
    assignments: &[ShiftAssignment],
    min_rest_hours: u32,
) -> Vec<ComplianceViolation> {
    rest_gaps(staff_id, assignments, min_rest_hours, ViolationKind::DailyRest)
}

/// Moyenne hebdomadaire sur `window_weeks` semaines finissant à
/// `reference_date` (bornes incluses, par date d'affectation).
pub fn check_rolling_average(
    staff_id: &StaffId,
    assignments: &[ShiftAssignment],
    opt_out_48h: bool,
    reference_date: NaiveDate,
    window_weeks: u32,
) -> Vec<ComplianceViolation> {
    check_rolling_average_with_limit(
        staff_id,
        assignments,
        opt_out_48h,
        reference_date,
        window_weeks,
        48.0,
    )
}

fn check_rolling_average_with_limit(
    staff_id: &StaffId,
    assignments: &[ShiftAssignment],
    opt_out_48h: bool,
    reference_date: NaiveDate,
    window_weeks: u32,
    limit_hours: f64,
) -> Vec<ComplianceViolation> {
    if opt_out_48h || window_weeks == 0 {
        return Vec::new();
    }
    let from = reference_date - Duration::days(i64::from(window_weeks) * 7);
    let total_hours: f64 = assignments
        .iter()
        .filter(|a| &a.staff_id == staff_id && a.date >= from && a.date <= reference_date)
        .map(ShiftAssignment::duration_hours)
        .sum();
    let average = total_hours / f64::from(window_weeks);

    if average <= limit_hours {
        return Vec::new();
    }
    vec![ComplianceViolation {
        kind: ViolationKind::WeeklyAverage,
        staff_id: staff_id.clone(),
        date: reference_date,
        message: format!(
            "average {average:.1}h/week over {window_weeks} weeks exceeds {limit_hours}h"
        ),
        gap_hours: None,
        hours: Some(average),
    }]
}

/// Exposition au travail de nuit. Toute minute dans la fenêtre de nuit
/// classe la personne comme travailleur de nuit.
pub fn check_night_work(
    staff_id: &StaffId,
    assignments: &[ShiftAssignment],
    night_window: ShiftWindow,
) -> NightWorkSummary {
    let minutes: i64 = assignments
        .iter()
        .filter(|a| &a.staff_id == staff_id)
        .map(|a| night_minutes(a, night_window))
        .sum();
    let total_night_hours = minutes as f64 / 60.0;
    NightWorkSummary {
        staff_id: staff_id.clone(),
        total_night_hours,
        is_night_worker: total_night_hours > 0.0,
    }
}

// La fenêtre est instanciée chaque jour touché par le shift, veille comprise
// (une fenêtre 23:00–06:00 de la veille peut mordre sur le matin).
fn night_minutes(assignment: &ShiftAssignment, night_window: ShiftWindow) -> i64 {
    let interval = assignment.interval();
    let first = interval.start.date_naive().pred_opt();
    let last = interval.end.date_naive();

    let mut total = 0;
    let mut day = first.unwrap_or(interval.start.date_naive());
    while day <= last {
        if let Ok(window) = night_window.on(day) {
            total += overlap_minutes(&interval, &window);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    total
}

/// Âge en années révolues à une date donnée.
pub fn age_on(date_of_birth: NaiveDate, reference_date: NaiveDate) -> i32 {
    let mut age = reference_date.year() - date_of_birth.year();
    let birthday = (date_of_birth.month(), date_of_birth.day());
    if (reference_date.month(), reference_date.day()) < birthday {
        age -= 1;
    }
    age
}

/// Règles jeunes travailleurs (< 18 ans) : durée maximale d'un shift et
/// repos quotidien renforcé. Sans date de naissance, rien n'est contrôlé.
pub fn check_young_worker_rules(
    staff: &StaffMember,
    assignments: &[ShiftAssignment],
    reference_date: NaiveDate,
    rules: &ComplianceRules,
) -> Vec<ComplianceViolation> {
    let Some(dob) = staff.date_of_birth else {
        return Vec::new();
    };
    if age_on(dob, reference_date) >= 18 {
        return Vec::new();
    }

    let max_minutes = i64::from(rules.young_worker_max_shift_hours) * 60;
    let mut out: Vec<ComplianceViolation> = own_sorted(&staff.id, assignments)
        .into_iter()
        .filter(|a| a.duration_minutes() > max_minutes)
        .map(|a| ComplianceViolation {
            kind: ViolationKind::YoungWorkerDaily,
            staff_id: staff.id.clone(),
            date: a.date,
            message: format!(
                "young worker shift of {:.1}h on {} exceeds {}h",
                a.duration_hours(),
                a.date,
                rules.young_worker_max_shift_hours
            ),
            gap_hours: None,
            hours: Some(a.duration_hours()),
        })
        .collect();
    out.extend(rest_gaps(
        &staff.id,
        assignments,
        rules.young_worker_min_rest_hours,
        ViolationKind::YoungWorkerRest,
    ));
    out
}

/// Rapport agrégé d'une personne sur une période.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComplianceReport {
    pub staff_id: StaffId,
    pub violations: Vec<ComplianceViolation>,
    pub night_work: NightWorkSummary,
}

impl ComplianceReport {
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Lance les quatre contrôles pour une personne et concatène les résultats.
pub fn audit_staff(
    staff: &StaffMember,
    assignments: &[ShiftAssignment],
    reference_date: NaiveDate,
    rules: &ComplianceRules,
) -> ComplianceReport {
    let mut violations = check_daily_rest(&staff.id, assignments, rules.min_rest_hours);
    violations.extend(check_rolling_average_with_limit(
        &staff.id,
        assignments,
        staff.opt_out_48h,
        reference_date,
        rules.window_weeks,
        rules.weekly_limit_hours,
    ));
    violations.extend(check_young_worker_rules(staff, assignments, reference_date, rules));

    ComplianceReport {
        staff_id: staff.id.clone(),
        violations,
        night_work: check_night_work(&staff.id, assignments, rules.night_window),
    }
}
