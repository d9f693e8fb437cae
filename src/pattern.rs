//! Détection du cycle le plus court dans un historique de codes, tolérante au bruit.

use crate::codes::ShiftCode;
use crate::config::PatternConfig;
use crate::time::ShiftWindow;
use std::collections::BTreeMap;

/// Score minimal pour accepter un cycle imparfait.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectedPattern {
    pub cycle_length: usize,
    pub pattern: Vec<ShiftCode>,
    /// Part des positions conformes au cycle, dans [0, 1].
    pub confidence: f64,
}

impl DetectedPattern {
    /// Amorce une configuration de génération à partir du cycle détecté.
    pub fn into_config(
        self,
        requirements: BTreeMap<ShiftCode, u32>,
        shift_times: BTreeMap<ShiftCode, ShiftWindow>,
    ) -> PatternConfig {
        let mut config = PatternConfig::new(self.pattern);
        config.requirements = requirements;
        config.shift_times.extend(shift_times);
        config
    }
}

fn match_score(codes: &[ShiftCode], len: usize) -> f64 {
    let hits = codes
        .iter()
        .enumerate()
        .filter(|(i, c)| *c == &codes[i % len])
        .count();
    hits as f64 / codes.len() as f64
}

/// Cherche la plus petite longueur `L` dans `1..=n/2` : d'abord un cycle
/// parfait, sinon le premier au-dessus de [`ACCEPTANCE_THRESHOLD`], sinon le
/// meilleur score. `None` pour une séquence vide.
pub fn detect_pattern(codes: &[ShiftCode]) -> Option<DetectedPattern> {
    if codes.is_empty() {
        return None;
    }
    let scores: Vec<(usize, f64)> = (1..=codes.len() / 2)
        .map(|len| (len, match_score(codes, len)))
        .collect();

    let best = scores
        .iter()
        .find(|(_, s)| *s >= 1.0)
        .or_else(|| scores.iter().find(|(_, s)| *s >= ACCEPTANCE_THRESHOLD))
        .or_else(|| {
            // max_by renvoie le dernier maximum : on veut le plus petit L
            scores
                .iter()
                .rev()
                .max_by(|a, b| a.1.total_cmp(&b.1))
        })
        .copied();

    let (cycle_length, confidence) = best.unwrap_or((codes.len(), 1.0));
    debug_event!(cycle_length, confidence, n = codes.len(), "pattern detected");
    Some(DetectedPattern {
        cycle_length,
        pattern: codes[..cycle_length].to_vec(),
        confidence,
    })
}

/// Calage d'un historique individuel sur un cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Index du cycle correspondant au premier jour de l'historique.
    pub offset: usize,
    /// Index du cycle pour le jour qui suit l'historique : l'offset initial
    /// d'une génération qui prend le relais.
    pub next_offset: usize,
    pub confidence: f64,
}

/// Meilleure rotation de `pattern` contre `history` (plus petit offset en
/// cas d'égalité). `None` si l'un des deux est vide.
pub fn align_history(pattern: &[ShiftCode], history: &[ShiftCode]) -> Option<Alignment> {
    if pattern.is_empty() || history.is_empty() {
        return None;
    }
    let len = pattern.len();
    let (offset, hits) = (0..len)
        .map(|offset| {
            let hits = history
                .iter()
                .enumerate()
                .filter(|(i, c)| *c == &pattern[(i + offset) % len])
                .count();
            (offset, hits)
        })
        .rev()
        .max_by_key(|(_, hits)| *hits)?;

    Some(Alignment {
        offset,
        next_offset: (offset + history.len()) % len,
        confidence: hits as f64 / history.len() as f64,
    })
}
