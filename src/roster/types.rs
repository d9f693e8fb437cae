use crate::config::ConfigError;
use crate::model::{ShiftAssignment, Shortfall};
use crate::time::TimeError;
use thiserror::Error;

/// Règles de repos appliquées à chaque placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestRules {
    pub min_rest_hours: u32,
}

impl Default for RestRules {
    fn default() -> Self {
        Self { min_rest_hours: 11 }
    }
}

/// Résultat d'une génération : les deux collections sont complémentaires.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Generation {
    pub assignments: Vec<ShiftAssignment>,
    pub shortfalls: Vec<Shortfall>,
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("invalid date range: end must not be before start")]
    InvalidDateRange,
    #[error("invalid pattern config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error(transparent)]
    Time(#[from] TimeError),
}
