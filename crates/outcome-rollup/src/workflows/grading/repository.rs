use rust_decimal::Decimal;

use super::banding::LetterGrade;
use super::domain::{
    Assessment, AssessmentId, AssessmentLoContribution, Course, CourseId,
    DepartmentLoPoContribution, DepartmentOutcomeId, DepartmentProgramOutcome, LearningOutcome,
    LearningOutcomeId, LoPoMapping, ProgramOutcome, ProgramOutcomeId, Score, StudentId,
};

/// Read-only view over the gradebook the rollup engine consumes.
///
/// Implementations are expected to serve a consistent snapshot for the duration of one
/// rollup; the engine re-reads on every call and caches nothing. Where the backing store
/// should hold at most one record for a pair, the first one returned is used.
pub trait GradebookRepository: Send + Sync {
    fn course(&self, id: &CourseId) -> Result<Option<Course>, RepositoryError>;
    fn assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError>;
    fn learning_outcome(
        &self,
        id: &LearningOutcomeId,
    ) -> Result<Option<LearningOutcome>, RepositoryError>;
    fn program_outcome(
        &self,
        id: &ProgramOutcomeId,
    ) -> Result<Option<ProgramOutcome>, RepositoryError>;
    fn department_program_outcome(
        &self,
        id: &DepartmentOutcomeId,
    ) -> Result<Option<DepartmentProgramOutcome>, RepositoryError>;

    /// Assessments of a course in display order.
    fn assessments(&self, course: &CourseId) -> Result<Vec<Assessment>, RepositoryError>;
    fn learning_outcomes(&self, course: &CourseId)
        -> Result<Vec<LearningOutcome>, RepositoryError>;
    fn program_outcomes(&self, course: &CourseId) -> Result<Vec<ProgramOutcome>, RepositoryError>;
    fn department_program_outcomes(&self)
        -> Result<Vec<DepartmentProgramOutcome>, RepositoryError>;

    fn score(
        &self,
        assessment: &AssessmentId,
        student: &StudentId,
    ) -> Result<Option<Score>, RepositoryError>;
    /// Contribution edges into `lo` whose assessment belongs to `course`.
    fn contributions_for_lo(
        &self,
        lo: &LearningOutcomeId,
        course: &CourseId,
    ) -> Result<Vec<AssessmentLoContribution>, RepositoryError>;
    /// LO → PO mappings for `po` whose LO belongs to `course`.
    fn lo_po_mappings(
        &self,
        po: &ProgramOutcomeId,
        course: &CourseId,
    ) -> Result<Vec<LoPoMapping>, RepositoryError>;
    fn department_contributions(
        &self,
        outcome: &DepartmentOutcomeId,
    ) -> Result<Vec<DepartmentLoPoContribution>, RepositoryError>;
    fn is_enrolled(&self, student: &StudentId, course: &CourseId) -> Result<bool, RepositoryError>;
    fn enrolled_courses(&self, student: &StudentId) -> Result<Vec<Course>, RepositoryError>;
}

/// The single mutation: a score and its letter grade are persisted together or not at all.
pub trait ScoreWriter: Send + Sync {
    fn write_score(
        &self,
        assessment: &AssessmentId,
        student: &StudentId,
        value: Decimal,
        letter_grade: LetterGrade,
    ) -> Result<Score, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("write rejected: {0}")]
    WriteRejected(String),
}
