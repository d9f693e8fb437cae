mod backfill;
mod generate;
mod rest;
mod types;

pub use backfill::{BackfillQuery, CandidateOutcome, CandidateScore, Disqualification, VacantSlot};
pub use rest::{is_rest_safe, rest_gap_hours};
pub use types::{Generation, RestRules, RosterError};

use crate::config::PatternConfig;
use crate::model::{DateRange, ShiftAssignment, StaffMember};
use uuid::Uuid;

/// Motif des affectations créées par comblement de trou.
pub const GAP_FILL: &str = "Gap Fill";
/// Motif des affectations créées par remplacement ponctuel.
pub const BACKFILL: &str = "Backfill";

/// Moteur de roster : ne garde que ses règles et l'identifiant de version
/// apposé sur les affectations qu'il crée. Aucun état entre deux appels.
#[derive(Debug, Clone)]
pub struct RosterEngine {
    rules: RestRules,
    version_id: String,
}

impl Default for RosterEngine {
    fn default() -> Self {
        Self::new(RestRules::default())
    }
}

impl RosterEngine {
    pub fn new(rules: RestRules) -> Self {
        Self {
            rules,
            version_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_version<V: Into<String>>(mut self, version_id: V) -> Self {
        self.version_id = version_id.into();
        self
    }

    pub fn rules(&self) -> &RestRules {
        &self.rules
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    /// Génère les affectations d'une période inclusive ; les manques sont
    /// rapportés, jamais résolus par retour arrière.
    pub fn generate(
        &self,
        config: &PatternConfig,
        staff: &[StaffMember],
        range: DateRange,
        prior: &[ShiftAssignment],
    ) -> Result<Generation, RosterError> {
        generate::generate(self, config, staff, range, prior)
    }

    pub fn score_candidate(
        &self,
        query: &BackfillQuery<'_>,
        member: &StaffMember,
    ) -> CandidateScore {
        backfill::score_candidate(self, query, member)
    }

    /// Candidats éligibles par coût croissant, puis disqualifiés.
    pub fn rank_candidates(&self, query: &BackfillQuery<'_>) -> Vec<CandidateScore> {
        backfill::rank_candidates(self, query)
    }

    pub fn find_best_candidate<'a>(&self, query: &BackfillQuery<'a>) -> Option<&'a StaffMember> {
        backfill::find_best_candidate(self, query)
    }

    /// Construit l'affectation forcée d'un remplaçant ; l'appelant la persiste.
    pub fn fill_vacancy(&self, slot: &VacantSlot, member: &StaffMember) -> ShiftAssignment {
        backfill::fill_vacancy(self, slot, member)
    }

    fn stamp(&self, mut assignment: ShiftAssignment) -> ShiftAssignment {
        assignment.version_id.clone_from(&self.version_id);
        assignment
    }
}
