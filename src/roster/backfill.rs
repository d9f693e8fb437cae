use super::{rest, RosterEngine, BACKFILL};
use crate::codes::ShiftCode;
use crate::model::{DateRange, ShiftAssignment, StaffId, StaffMember};
use crate::time::{ShiftInterval, ShiftWindow, TimeError};
use chrono::{DateTime, NaiveDate, Utc};

/// Créneau à pourvoir (absence, besoin ponctuel).
#[derive(Debug, Clone, PartialEq)]
pub struct VacantSlot {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub shift_code: ShiftCode,
}

impl VacantSlot {
    pub fn new(
        date: NaiveDate,
        window: ShiftWindow,
        shift_code: ShiftCode,
    ) -> Result<Self, TimeError> {
        let interval = window.on(date)?;
        Ok(Self {
            date,
            start: interval.start,
            end: interval.end,
            shift_code,
        })
    }

    /// Libère le créneau d'une affectation existante (absence).
    pub fn from_assignment(assignment: &ShiftAssignment) -> Self {
        Self {
            date: assignment.date,
            start: assignment.start,
            end: assignment.end,
            shift_code: assignment.shift_code.clone(),
        }
    }

    pub fn interval(&self) -> ShiftInterval {
        ShiftInterval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Paramètres d'une recherche de remplaçant. Le coût d'un candidat est son
/// nombre d'affectations dans `window` (toutes si `None`).
#[derive(Debug, Clone, Copy)]
pub struct BackfillQuery<'a> {
    pub slot: &'a VacantSlot,
    pub exclude: &'a [StaffId],
    pub staff: &'a [StaffMember],
    pub assignments: &'a [ShiftAssignment],
    pub window: Option<DateRange>,
}

impl<'a> BackfillQuery<'a> {
    pub fn new(
        slot: &'a VacantSlot,
        staff: &'a [StaffMember],
        assignments: &'a [ShiftAssignment],
    ) -> Self {
        Self {
            slot,
            exclude: &[],
            staff,
            assignments,
            window: None,
        }
    }

    pub fn excluding(mut self, exclude: &'a [StaffId]) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn within(mut self, window: DateRange) -> Self {
        self.window = Some(window);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disqualification {
    /// Déjà en poste sur un intervalle qui chevauche le créneau.
    Overlap,
    /// Repos insuffisant depuis le shift précédent.
    RestBefore,
    /// Repos insuffisant avant le shift suivant.
    RestAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    Eligible { cost: u32 },
    Disqualified(Disqualification),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateScore {
    pub staff_id: StaffId,
    pub outcome: CandidateOutcome,
}

impl CandidateScore {
    pub fn cost(&self) -> Option<u32> {
        match self.outcome {
            CandidateOutcome::Eligible { cost } => Some(cost),
            CandidateOutcome::Disqualified(_) => None,
        }
    }
}

pub(super) fn score_candidate(
    engine: &RosterEngine,
    query: &BackfillQuery<'_>,
    member: &StaffMember,
) -> CandidateScore {
    let id = &member.id;
    let own: Vec<ShiftInterval> = query
        .assignments
        .iter()
        .filter(|a| &a.staff_id == id)
        .map(ShiftAssignment::interval)
        .collect();

    let outcome = match rest::placement_conflict(&own, &query.slot.interval(), &engine.rules) {
        Some(reason) => CandidateOutcome::Disqualified(reason),
        None => {
            let cost = query
                .assignments
                .iter()
                .filter(|a| &a.staff_id == id)
                .filter(|a| query.window.map_or(true, |w| w.contains(a.date)))
                .count();
            CandidateOutcome::Eligible {
                cost: u32::try_from(cost).unwrap_or(u32::MAX),
            }
        }
    };

    CandidateScore {
        staff_id: id.clone(),
        outcome,
    }
}

pub(super) fn rank_candidates(
    engine: &RosterEngine,
    query: &BackfillQuery<'_>,
) -> Vec<CandidateScore> {
    let mut scores: Vec<CandidateScore> = query
        .staff
        .iter()
        .filter(|m| !query.exclude.contains(&m.id))
        .map(|m| score_candidate(engine, query, m))
        .collect();
    // tri stable : l'ordre fourni départage les égalités
    scores.sort_by_key(|s| match s.outcome {
        CandidateOutcome::Eligible { cost } => (0u8, cost),
        CandidateOutcome::Disqualified(_) => (1u8, 0),
    });
    scores
}

pub(super) fn find_best_candidate<'a>(
    engine: &RosterEngine,
    query: &BackfillQuery<'a>,
) -> Option<&'a StaffMember> {
    let staff: &'a [StaffMember] = query.staff;
    staff
        .iter()
        .filter(|m| !query.exclude.contains(&m.id))
        .filter_map(|m| score_candidate(engine, query, m).cost().map(|cost| (m, cost)))
        .min_by_key(|(_, cost)| *cost)
        .map(|(m, _)| m)
}

pub(super) fn fill_vacancy(
    engine: &RosterEngine,
    slot: &VacantSlot,
    member: &StaffMember,
) -> ShiftAssignment {
    let assignment = ShiftAssignment::new(
        member.id.clone(),
        slot.date,
        slot.interval(),
        slot.shift_code.clone(),
    )
    .forced(BACKFILL);
    engine.stamp(assignment)
}
