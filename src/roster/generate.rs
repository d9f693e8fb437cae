use super::{rest, RestRules, RosterEngine, RosterError, GAP_FILL};
use crate::codes::ShiftCode;
use crate::config::{ConfigError, PatternConfig};
use crate::model::{DateRange, ShiftAssignment, Shortfall, ShortfallReason, StaffId, StaffMember};
use crate::roster::Generation;
use crate::time::{ShiftInterval, TimeError};
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};

/// Personne disponible pour le comblement, avec son index dans le cycle.
struct Queued<'a> {
    member: &'a StaffMember,
    index: usize,
}

/// Compteurs du jour : (code, cible, affectés).
struct DayTally {
    rows: Vec<(ShiftCode, u32, u32)>,
}

impl DayTally {
    fn new(targets: &[(ShiftCode, u32)]) -> Self {
        Self {
            rows: targets.iter().map(|(c, n)| (c.clone(), *n, 0)).collect(),
        }
    }

    fn missing(&self, code: &ShiftCode) -> u32 {
        self.rows
            .iter()
            .find(|(c, _, _)| c == code)
            .map_or(0, |(_, target, done)| target.saturating_sub(*done))
    }

    fn filled(&mut self, code: &ShiftCode) {
        if let Some(row) = self.rows.iter_mut().find(|(c, _, _)| c == code) {
            row.2 += 1;
        }
    }
}

/// Shifts déjà connus de chaque personne (historique et génération en cours).
#[derive(Default)]
struct Known {
    by_staff: HashMap<StaffId, Vec<ShiftInterval>>,
}

impl Known {
    fn push(&mut self, staff: &StaffId, interval: ShiftInterval) {
        self.by_staff.entry(staff.clone()).or_default().push(interval);
    }

    fn allows(&self, staff: &StaffId, candidate: &ShiftInterval, rules: &RestRules) -> bool {
        let own = self.by_staff.get(staff).map(Vec::as_slice).unwrap_or_default();
        rest::placement_conflict(own, candidate, rules).is_none()
    }
}

pub(super) fn generate(
    engine: &RosterEngine,
    config: &PatternConfig,
    staff: &[StaffMember],
    range: DateRange,
    prior: &[ShiftAssignment],
) -> Result<Generation, RosterError> {
    if range.end < range.start {
        return Err(RosterError::InvalidDateRange);
    }
    config.validate()?;

    // shifts connus par personne : tout l'historique fourni, puis chaque
    // affectation générée ; même contrôle que pour un remplacement
    let mut known = Known::default();
    for a in prior {
        known.push(&a.staff_id, a.interval());
    }

    let targets = config.daily_targets();
    let mut out = Generation::default();
    let mut date = range.start;
    let mut day_offset = 0i64;

    loop {
        debug_event!(%date, day_offset, "generating day");
        let mut tally = DayTally::new(&targets);
        let mut queue: VecDeque<Queued> = VecDeque::new();

        // passe 1 : rotation naturelle, dans l'ordre fourni
        for member in staff {
            let index = config.pattern_index(&member.id, day_offset);
            let code = &config.pattern_sequence[index];

            if *code == ShiftCode::Rest {
                queue.push_back(Queued { member, index });
                continue;
            }
            if !code.is_working() {
                continue;
            }
            if tally.missing(code) == 0 {
                queue.push_back(Queued { member, index });
                continue;
            }

            let interval = interval_for(config, index, code, date)?;
            if known.allows(&member.id, &interval, &engine.rules) {
                let assignment =
                    ShiftAssignment::new(member.id.clone(), date, interval, code.clone());
                out.assignments.push(engine.stamp(assignment));
                known.push(&member.id, interval);
                tally.filled(code);
            } else {
                debug_event!(%date, staff = %member.id, %code, "natural shift blocked");
                out.shortfalls.push(Shortfall {
                    date,
                    target_shift_code: code.clone(),
                    reason: ShortfallReason::InsufficientRest,
                });
            }
        }

        // passe 2 : comblement FIFO, codes dans l'ordre du pattern
        for (code, _) in &targets {
            let mut rest_blocked = false;
            while tally.missing(code) > 0 {
                let mut chosen: Option<(usize, ShiftInterval)> = None;
                for (pos, q) in queue.iter().enumerate() {
                    let interval = interval_for(config, q.index, code, date)?;
                    if known.allows(&q.member.id, &interval, &engine.rules) {
                        chosen = Some((pos, interval));
                        break;
                    }
                    rest_blocked = true;
                }
                let Some((pos, interval)) = chosen else { break };
                let Some(q) = queue.remove(pos) else { break };

                debug_event!(%date, staff = %q.member.id, %code, "gap fill");
                let assignment =
                    ShiftAssignment::new(q.member.id.clone(), date, interval, code.clone())
                        .forced(GAP_FILL);
                out.assignments.push(engine.stamp(assignment));
                known.push(&q.member.id, interval);
                tally.filled(code);
            }

            let missing = tally.missing(code);
            if missing > 0 {
                let reason = if rest_blocked {
                    ShortfallReason::InsufficientRest
                } else {
                    ShortfallReason::NoAvailableStaff
                };
                debug_event!(%date, %code, missing, %reason, "shortfall");
                out.shortfalls.extend((0..missing).map(|_| Shortfall {
                    date,
                    target_shift_code: code.clone(),
                    reason,
                }));
            }
        }

        if date >= range.end {
            break;
        }
        date = date.succ_opt().ok_or(TimeError::DateOverflow)?;
        day_offset += 1;
    }

    Ok(out)
}

fn interval_for(
    config: &PatternConfig,
    index: usize,
    code: &ShiftCode,
    date: NaiveDate,
) -> Result<ShiftInterval, RosterError> {
    let window = config
        .window_for(index, code)
        .ok_or_else(|| ConfigError::MissingShiftTimes(code.clone()))?;
    Ok(window.on(date)?)
}
