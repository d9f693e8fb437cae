use super::{Disqualification, RestRules};
use crate::time::ShiftInterval;
use chrono::{DateTime, Utc};

/// Écart en heures entre la fin d'un shift et le début du suivant.
pub fn rest_gap_hours(last_end: DateTime<Utc>, next_start: DateTime<Utc>) -> f64 {
    (next_start - last_end).num_minutes() as f64 / 60.0
}

/// Un placement est sûr s'il n'existe aucun shift antérieur, ou si le repos
/// depuis la dernière fin atteint `min_rest_hours`. Seule règle utilisée par
/// la génération comme par le remplacement.
pub fn is_rest_safe(
    last_end: Option<DateTime<Utc>>,
    candidate_start: DateTime<Utc>,
    rules: &RestRules,
) -> bool {
    match last_end {
        None => true,
        Some(end) => {
            (candidate_start - end).num_minutes() >= i64::from(rules.min_rest_hours) * 60
        }
    }
}

/// Motif de refus de `candidate` face aux shifts connus d'une personne
/// (`own`, dans n'importe quel ordre) ; `None` si le placement est possible.
pub(super) fn placement_conflict(
    own: &[ShiftInterval],
    candidate: &ShiftInterval,
    rules: &RestRules,
) -> Option<Disqualification> {
    if own.iter().any(|s| s.overlaps(candidate)) {
        return Some(Disqualification::Overlap);
    }
    let last_end = own
        .iter()
        .filter(|s| s.start < candidate.start)
        .map(|s| s.end)
        .max();
    if !is_rest_safe(last_end, candidate.start, rules) {
        return Some(Disqualification::RestBefore);
    }
    let next_start = own
        .iter()
        .filter(|s| s.start >= candidate.start)
        .map(|s| s.start)
        .min();
    if next_start.is_some_and(|next| !is_rest_safe(Some(candidate.end), next, rules)) {
        return Some(Disqualification::RestAfter);
    }
    None
}
