use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::numeric::{require_percentage, ValidationError};

/// Eight-step letter scale. Variants are declared lowest first so `Ord` follows rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LetterGrade {
    Ff,
    Dd,
    Dc,
    Cc,
    Cb,
    Bb,
    Ba,
    Aa,
}

/// Lower bound (inclusive) of each band, highest first. Anything below the last bound is FF.
///
/// | Letter | Range     |
/// |--------|-----------|
/// | AA     | >= 90     |
/// | BA     | [85, 90)  |
/// | BB     | [80, 85)  |
/// | CB     | [75, 80)  |
/// | CC     | [70, 75)  |
/// | DC     | [65, 70)  |
/// | DD     | [60, 65)  |
/// | FF     | < 60      |
const BANDS: [(u8, LetterGrade); 7] = [
    (90, LetterGrade::Aa),
    (85, LetterGrade::Ba),
    (80, LetterGrade::Bb),
    (75, LetterGrade::Cb),
    (70, LetterGrade::Cc),
    (65, LetterGrade::Dc),
    (60, LetterGrade::Dd),
];

impl LetterGrade {
    pub const fn as_str(self) -> &'static str {
        match self {
            LetterGrade::Aa => "AA",
            LetterGrade::Ba => "BA",
            LetterGrade::Bb => "BB",
            LetterGrade::Cb => "CB",
            LetterGrade::Cc => "CC",
            LetterGrade::Dc => "DC",
            LetterGrade::Dd => "DD",
            LetterGrade::Ff => "FF",
        }
    }

    /// Maps a grade in [0, 100] onto the scale. Out-of-range grades are rejected.
    pub fn band(numeric_grade: Decimal) -> Result<Self, ValidationError> {
        let grade = require_percentage("numeric_grade", numeric_grade)?;

        let letter = BANDS
            .iter()
            .find(|(floor, _)| grade >= Decimal::from(*floor))
            .map(|(_, letter)| *letter)
            .unwrap_or(LetterGrade::Ff);

        Ok(letter)
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Null-propagating form of [`LetterGrade::band`].
pub fn band(numeric_grade: Option<Decimal>) -> Result<Option<LetterGrade>, ValidationError> {
    numeric_grade.map(LetterGrade::band).transpose()
}
