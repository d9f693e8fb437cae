#![forbid(unsafe_code)]
//! Rotaguard : génération de plannings par rotation et contrôles du temps de travail.
//!
//! - Rotation par pattern, comblement des trous (FIFO), rapport des manques.
//! - Repos minimal partagé entre génération et remplacement ponctuel.
//! - Contrôles : repos quotidien, moyenne glissante 17 semaines, travail de
//!   nuit, jeunes travailleurs.
//! - Détection de cycle dans un historique bruité.
//! - Cœur pur : aucune I/O, tout en UTC ; fichiers JSON/CSV en dehors (`io`).

// Événements `debug` uniquement avec la feature `logging`.
macro_rules! debug_event {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        tracing::debug!($($arg)*);
    };
}

pub mod codes;
pub mod compliance;
pub mod config;
#[cfg(feature = "serde")]
pub mod io;
pub mod model;
pub mod pattern;
pub mod roster;
pub mod time;

pub use codes::{to_code, to_logical, ShiftCode};
pub use compliance::{
    audit_staff, check_daily_rest, check_night_work, check_rolling_average,
    check_young_worker_rules, ComplianceReport, ComplianceRules, ComplianceViolation,
    NightWorkSummary, ViolationKind,
};
pub use config::{ConfigError, PatternConfig};
pub use model::{
    AssignmentId, DateRange, ShiftAssignment, Shortfall, ShortfallReason, StaffId, StaffMember,
};
pub use pattern::{align_history, detect_pattern, Alignment, DetectedPattern};
pub use roster::{
    is_rest_safe, rest_gap_hours, BackfillQuery, CandidateOutcome, CandidateScore,
    Disqualification, Generation, RestRules, RosterEngine, RosterError, VacantSlot,
};
pub use time::{
    build_interval, duration_minutes, parse_minutes, ShiftInterval, ShiftWindow, TimeError,
    TimeOfDay,
};
