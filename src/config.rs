use crate::codes::ShiftCode;
use crate::model::StaffId;
use crate::time::{ShiftWindow, TimeOfDay};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pattern sequence cannot be empty")]
    EmptyPattern,
    #[error("custom shift times for index {index} outside pattern of length {len}")]
    CustomIndexOutOfRange { index: usize, len: usize },
    #[error("custom shift times for index {0} target a non-working code")]
    CustomTimesOnNonWorking(usize),
    #[error("no shift times for working code {0}")]
    MissingShiftTimes(ShiftCode),
}

/// Configuration de rotation, immuable pour un appel de génération.
///
/// `requirements` donne l'effectif requis par code et par jour ;
/// `initial_offsets` le point de départ de chaque personne dans le cycle
/// (pris modulo la longueur, une personne absente démarre à 0) ;
/// `custom_shift_times` surcharge les horaires d'un index du pattern ;
/// `shift_times` donne les horaires par défaut de chaque code travaillé.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternConfig {
    pub pattern_sequence: Vec<ShiftCode>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requirements: BTreeMap<ShiftCode, u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial_offsets: HashMap<StaffId, i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub custom_shift_times: BTreeMap<usize, ShiftWindow>,
    #[cfg_attr(feature = "serde", serde(default = "default_shift_times"))]
    pub shift_times: BTreeMap<ShiftCode, ShiftWindow>,
}

impl PatternConfig {
    pub fn new(pattern_sequence: Vec<ShiftCode>) -> Self {
        Self {
            pattern_sequence,
            requirements: BTreeMap::new(),
            initial_offsets: HashMap::new(),
            custom_shift_times: BTreeMap::new(),
            shift_times: default_shift_times(),
        }
    }

    pub fn require(mut self, code: ShiftCode, headcount: u32) -> Self {
        self.requirements.insert(code, headcount);
        self
    }

    pub fn offset<S: AsRef<str>>(mut self, staff: S, offset: i64) -> Self {
        self.initial_offsets.insert(StaffId::new(staff), offset);
        self
    }

    pub fn custom_times(mut self, index: usize, window: ShiftWindow) -> Self {
        self.custom_shift_times.insert(index, window);
        self
    }

    pub fn cycle_length(&self) -> usize {
        self.pattern_sequence.len()
    }

    /// Index dans le cycle d'une personne pour un jour donné (0 = début de période).
    pub fn pattern_index(&self, staff: &StaffId, day_offset: i64) -> usize {
        let len = self.cycle_length().max(1) as i64;
        let offset = self.initial_offsets.get(staff).copied().unwrap_or(0);
        // réduction préalable : offsets arbitraires sans débordement
        (day_offset.rem_euclid(len) + offset.rem_euclid(len)).rem_euclid(len) as usize
    }

    /// Effectifs cibles par jour : seuls les codes travaillés présents dans
    /// le pattern comptent, dans leur ordre de première apparition.
    pub fn daily_targets(&self) -> Vec<(ShiftCode, u32)> {
        let mut out: Vec<(ShiftCode, u32)> = Vec::new();
        for code in &self.pattern_sequence {
            if !code.is_working() || out.iter().any(|(c, _)| c == code) {
                continue;
            }
            if let Some(&n) = self.requirements.get(code) {
                out.push((code.clone(), n));
            }
        }
        out
    }

    /// Horaires d'un shift : surcharge de l'index si celui-ci porte bien ce
    /// code, sinon horaires par défaut du code.
    pub fn window_for(&self, index: usize, code: &ShiftCode) -> Option<ShiftWindow> {
        let custom = self
            .custom_shift_times
            .get(&index)
            .filter(|_| self.pattern_sequence.get(index) == Some(code));
        custom.or_else(|| self.shift_times.get(code)).copied()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pattern_sequence.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }
        let len = self.cycle_length();
        for &index in self.custom_shift_times.keys() {
            match self.pattern_sequence.get(index) {
                None => return Err(ConfigError::CustomIndexOutOfRange { index, len }),
                Some(code) if !code.is_working() => {
                    return Err(ConfigError::CustomTimesOnNonWorking(index))
                }
                Some(_) => {}
            }
        }
        for (index, code) in self.pattern_sequence.iter().enumerate() {
            if code.is_working() && self.window_for(index, code).is_none() {
                return Err(ConfigError::MissingShiftTimes(code.clone()));
            }
        }
        Ok(())
    }
}

/// Horaires par défaut : E 07:00–15:00, L 14:00–22:00, N 22:00–07:00,
/// D 07:00–19:30.
pub fn default_shift_times() -> BTreeMap<ShiftCode, ShiftWindow> {
    let hm = |h, m| TimeOfDay::hm(h, m).unwrap_or(TimeOfDay::MIDNIGHT);
    BTreeMap::from([
        (ShiftCode::Early, ShiftWindow::new(hm(7, 0), hm(15, 0))),
        (ShiftCode::Late, ShiftWindow::new(hm(14, 0), hm(22, 0))),
        (ShiftCode::Night, ShiftWindow::new(hm(22, 0), hm(7, 0))),
        (ShiftCode::Day12, ShiftWindow::new(hm(7, 0), hm(19, 30))),
    ])
}

#[cfg(feature = "serde")]
mod files {
    use super::PatternConfig;
    use anyhow::{Context, Result};
    use std::fs;
    use std::path::Path;

    /// Charge et valide une configuration JSON.
    pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<PatternConfig> {
        let path = path.as_ref();
        let data =
            fs::read(path).with_context(|| format!("reading pattern config {}", path.display()))?;
        let config: PatternConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing pattern config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn export_config_json<P: AsRef<Path>>(path: P, config: &PatternConfig) -> Result<()> {
        config.validate()?;
        crate::io::write_json_atomic(path, config)
    }
}

#[cfg(feature = "serde")]
pub use files::{export_config_json, load_config_from_file};
