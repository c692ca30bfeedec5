//! Assessment scores rolled up into learning-outcome, program-outcome, and course grade
//! achievement, plus the score-entry workflow that keeps letter grades in step with values.

pub mod banding;
pub mod domain;
pub mod numeric;
pub mod report;
pub mod repository;
pub mod rollup;
pub mod router;
pub mod service;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use banding::{band, LetterGrade};
pub use domain::{
    Assessment, AssessmentId, AssessmentKind, AssessmentLoContribution, ContributionWeight,
    Course, CourseId, DepartmentLoPoContribution, DepartmentOutcomeId, DepartmentProgramOutcome,
    Enrollment, EntityKind, LearningOutcome, LearningOutcomeId, LoPoMapping, ProgramOutcome,
    ProgramOutcomeId, Score, ScoreEntry, StudentId,
};
pub use numeric::{round_half_up, ValidationError};
pub use report::{
    AssessmentResult, CourseSummary, DepartmentOutcomeView, LoCoverageView, StudentCourseReport,
};
pub use repository::{GradebookRepository, RepositoryError, ScoreWriter};
pub use rollup::{GradingPolicy, LoFormula, RollupEngine, UnknownLoFormula};
pub use router::grading_router;
pub use service::{GradingError, GradingService, RejectedScore, ScoreBatchOutcome};
pub use snapshot::{GradebookSnapshot, SharedGradebook, SnapshotError};
