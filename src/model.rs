use crate::codes::ShiftCode;
use crate::time::ShiftInterval;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use uuid::Uuid;

/// Identifiant fort pour StaffMember
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaffId(String);

impl StaffId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Membre du personnel. Le moteur ne lit que la date de naissance et
/// l'opt-out 48h ; le reste appartient à l'appelant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaffMember {
    pub id: StaffId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub date_of_birth: Option<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub opt_out_48h: bool,
}

impl StaffMember {
    pub fn new<I: AsRef<str>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: StaffId::new(id),
            name: name.into(),
            date_of_birth: None,
            opt_out_48h: false,
        }
    }

    pub fn born_on(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }

    pub fn opted_out(mut self) -> Self {
        self.opt_out_48h = true;
        self
    }
}

/// Identifiant fort pour ShiftAssignment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentId(String);

impl AssignmentId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Shift affecté à une personne (UTC). `is_forced == false` signifie que
/// l'affectation vient de la rotation naturelle du pattern.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShiftAssignment {
    pub id: AssignmentId,
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub shift_code: ShiftCode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_forced: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub forced_reason: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub version_id: String,
}

impl ShiftAssignment {
    /// Affectation naturelle (non forcée) sur un intervalle déjà construit.
    pub fn new(
        staff_id: StaffId,
        date: NaiveDate,
        interval: ShiftInterval,
        shift_code: ShiftCode,
    ) -> Self {
        Self {
            id: AssignmentId::random(),
            staff_id,
            date,
            start: interval.start,
            end: interval.end,
            shift_code,
            is_forced: false,
            forced_reason: None,
            version_id: String::new(),
        }
    }

    pub fn forced<R: Into<String>>(mut self, reason: R) -> Self {
        self.is_forced = true;
        self.forced_reason = Some(reason.into());
        self
    }

    pub fn interval(&self) -> ShiftInterval {
        ShiftInterval {
            start: self.start,
            end: self.end,
        }
    }

    /// Durée en minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }
}

/// Raison d'un créneau non couvert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShortfallReason {
    InsufficientRest,
    NoAvailableStaff,
}

impl fmt::Display for ShortfallReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShortfallReason::InsufficientRest => "Insufficient rest",
            ShortfallReason::NoAvailableStaff => "No available staff",
        })
    }
}

/// Besoin de couverture non satisfait pour un (jour, code). Jamais persisté
/// comme un shift.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shortfall {
    pub date: NaiveDate,
    pub target_shift_code: ShiftCode,
    pub reason: ShortfallReason,
}

/// Période de dates inclusive [start, end].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err("end date must not be before start date".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
