//! Codes de shift canoniques et normalisation des libellés libres.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Code de shift. `Unrecognized` conserve le libellé (majuscules) d'une
/// donnée importée qui ne correspond à aucun code connu : il ne compte
/// jamais pour la couverture.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum ShiftCode {
    Early,
    Late,
    Night,
    Day12,
    Rest,
    Sick,
    Leave,
    Unrecognized(String),
}

impl ShiftCode {
    /// Codes connus, dans l'ordre d'affichage.
    pub const KNOWN: [ShiftCode; 7] = [
        ShiftCode::Early,
        ShiftCode::Late,
        ShiftCode::Night,
        ShiftCode::Day12,
        ShiftCode::Rest,
        ShiftCode::Sick,
        ShiftCode::Leave,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ShiftCode::Early => "E",
            ShiftCode::Late => "L",
            ShiftCode::Night => "N",
            ShiftCode::Day12 => "D",
            ShiftCode::Rest => "R",
            ShiftCode::Sick => "S",
            ShiftCode::Leave => "A",
            ShiftCode::Unrecognized(raw) => raw,
        }
    }

    /// Shift effectivement travaillé (éligible à la couverture).
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            ShiftCode::Early | ShiftCode::Late | ShiftCode::Night | ShiftCode::Day12
        )
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ShiftCode::Unrecognized(_))
    }
}

/// Normalise un libellé libre ou historique vers un code. N'échoue jamais.
pub fn to_code(text: &str) -> ShiftCode {
    let upper = text.trim().to_uppercase();

    if let Some(code) = ShiftCode::KNOWN
        .iter()
        .find(|c| c.as_str() == upper || to_logical(c).to_uppercase() == upper)
    {
        return code.clone();
    }
    if upper == "DAY12" || upper == "LD" {
        return ShiftCode::Day12;
    }

    // l'ordre compte : "DAY OFF" est un repos, "HOLIDAY" un congé
    let has = |needle: &str| upper.contains(needle);
    if has("NIGHT") {
        ShiftCode::Night
    } else if has("EARLY") {
        ShiftCode::Early
    } else if has("LATE") {
        ShiftCode::Late
    } else if has("SICK") {
        ShiftCode::Sick
    } else if has("REST") || has("OFF") {
        ShiftCode::Rest
    } else if has("LEAVE") || has("HOLIDAY") || has("ANNUAL") {
        ShiftCode::Leave
    } else if has("DAY") {
        ShiftCode::Day12
    } else {
        ShiftCode::Unrecognized(upper)
    }
}

/// Libellé lisible d'un code.
pub fn to_logical(code: &ShiftCode) -> &'static str {
    match code {
        ShiftCode::Early => "Early",
        ShiftCode::Late => "Late",
        ShiftCode::Night => "Night",
        ShiftCode::Day12 => "Long Day",
        ShiftCode::Rest => "Rest",
        ShiftCode::Sick => "Sick",
        ShiftCode::Leave => "Leave",
        ShiftCode::Unrecognized(_) => "Unknown",
    }
}

impl FromStr for ShiftCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(to_code(s))
    }
}

impl From<String> for ShiftCode {
    fn from(value: String) -> Self {
        to_code(&value)
    }
}

impl From<&str> for ShiftCode {
    fn from(value: &str) -> Self {
        to_code(value)
    }
}

impl From<ShiftCode> for String {
    fn from(value: ShiftCode) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ShiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
