//! Arithmétique horaire : HH:MM, intervalles de shift (passage de minuit), durées.
//!
//! Une seule règle gouverne les shifts de nuit : si l'heure de fin est
//! inférieure ou égale à l'heure de début, la fin tombe le lendemain.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minutes dans une journée ; `24:00` vaut exactement cette valeur.
pub const MINUTES_PER_DAY: u16 = 1440;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid time format: {0:?} (expected HH:MM)")]
    InvalidTimeFormat(String),
    #[error("invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("date out of range")]
    DateOverflow,
}

/// Parse `H:MM` / `HH:MM` (24h) en minutes depuis minuit.
///
/// `24:00` est accepté, `24:01`..`24:59` ne le sont pas. Aucune tolérance :
/// espaces, secondes ou minutes sur un chiffre sont rejetés.
pub fn parse_minutes(hhmm: &str) -> Result<u16, TimeError> {
    let invalid = || TimeError::InvalidTimeFormat(hhmm.to_string());

    let (h, m) = hhmm.split_once(':').ok_or_else(invalid)?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(h) || h.len() > 2 || !digits(m) || m.len() != 2 {
        return Err(invalid());
    }

    let hour: u16 = h.parse().map_err(|_| invalid())?;
    let minute: u16 = m.parse().map_err(|_| invalid())?;
    if minute > 59 || hour > 24 || (hour == 24 && minute != 0) {
        return Err(invalid());
    }
    Ok(hour * 60 + minute)
}

/// Heure murale à la minute, de `00:00` à `24:00` inclus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn hm(hour: u16, minute: u16) -> Option<Self> {
        if minute > 59 {
            return None;
        }
        Self::from_minutes(hour.checked_mul(60)?.checked_add(minute)?)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Durée jusqu'à `end`, en repassant minuit si besoin.
    pub fn minutes_until(self, end: TimeOfDay) -> u32 {
        let raw = i32::from(end.0) - i32::from(self.0);
        if raw <= 0 {
            (raw + i32::from(MINUTES_PER_DAY)) as u32
        } else {
            raw as u32
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_minutes(s).map(TimeOfDay)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Couple (début, fin) d'heures murales : horaires par défaut d'un code,
/// surcharge d'un index de pattern, ou fenêtre de nuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShiftWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl ShiftWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, TimeError> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    pub fn duration_minutes(&self) -> u32 {
        self.start.minutes_until(self.end)
    }

    /// Instancie la fenêtre sur un jour calendaire.
    pub fn on(&self, date: NaiveDate) -> Result<ShiftInterval, TimeError> {
        ShiftInterval::on(date, self.start, self.end)
    }
}

/// Intervalle concret [start, end) en UTC. Toujours de durée > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ShiftInterval {
    pub fn on(date: NaiveDate, start: TimeOfDay, end: TimeOfDay) -> Result<Self, TimeError> {
        let end_date = if end <= start {
            date.succ_opt().ok_or(TimeError::DateOverflow)?
        } else {
            date
        };
        Ok(Self {
            start: at_minutes(date, start)?,
            end: at_minutes(end_date, end)?,
        })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &ShiftInterval) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

/// Construit l'intervalle d'un shift à partir de chaînes (`YYYY-MM-DD`, `HH:MM`).
pub fn build_interval(date_iso: &str, start: &str, end: &str) -> Result<ShiftInterval, TimeError> {
    let date = parse_date(date_iso)?;
    ShiftInterval::on(date, start.parse()?, end.parse()?)
}

/// Durée en minutes entre deux heures murales (passage de minuit inclus).
pub fn duration_minutes(start: &str, end: &str) -> Result<u32, TimeError> {
    let start: TimeOfDay = start.parse()?;
    Ok(start.minutes_until(end.parse()?))
}

pub fn parse_date(date_iso: &str) -> Result<NaiveDate, TimeError> {
    NaiveDate::parse_from_str(date_iso.trim(), "%Y-%m-%d")
        .map_err(|_| TimeError::InvalidDate(date_iso.to_string()))
}

pub fn midnight(date: NaiveDate) -> Result<DateTime<Utc>, TimeError> {
    let naive = date.and_hms_opt(0, 0, 0).ok_or(TimeError::DateOverflow)?;
    Ok(Utc.from_utc_datetime(&naive))
}

fn at_minutes(date: NaiveDate, time: TimeOfDay) -> Result<DateTime<Utc>, TimeError> {
    Ok(midnight(date)? + Duration::minutes(i64::from(time.minutes())))
}

pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Minutes communes à deux intervalles (0 si disjoints).
pub fn overlap_minutes(a: &ShiftInterval, b: &ShiftInterval) -> i64 {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    (end - start).num_minutes().max(0)
}
