use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::workflows::grading::{AssessmentId, ScoreEntry, StudentId};

#[derive(Debug)]
pub enum ScoreImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidScore { line: u64, value: String },
}

impl std::fmt::Display for ScoreImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreImportError::Io(err) => write!(f, "failed to read score export: {}", err),
            ScoreImportError::Csv(err) => write!(f, "invalid score CSV data: {}", err),
            ScoreImportError::InvalidScore { line, value } => {
                write!(f, "line {}: '{}' is not a decimal score", line, value)
            }
        }
    }
}

impl std::error::Error for ScoreImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoreImportError::Io(err) => Some(err),
            ScoreImportError::Csv(err) => Some(err),
            ScoreImportError::InvalidScore { .. } => None,
        }
    }
}

impl From<std::io::Error> for ScoreImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ScoreImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads `assessment_id,student_id,score` rows into score entries.
///
/// Bounds are not checked here; the score-entry workflow validates each entry.
pub struct ScoreCsvImporter;

impl ScoreCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ScoreEntry>, ScoreImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ScoreEntry>, ScoreImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries = Vec::new();

        for record in csv_reader.deserialize::<ScoreRow>() {
            let row = record?;
            // Header is line 1.
            let line = entries.len() as u64 + 2;
            // Parsed from text so no value passes through binary floating point.
            let score = Decimal::from_str(&row.score).map_err(|_| ScoreImportError::InvalidScore {
                line,
                value: row.score.clone(),
            })?;

            entries.push(ScoreEntry {
                assessment_id: AssessmentId(row.assessment_id),
                student_id: StudentId(row.student_id),
                score,
            });
        }

        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    assessment_id: String,
    student_id: String,
    score: String,
}
