//! Score → LO → PO rollups and the course grade.
//!
//! Every calculation is a pure function of what the repository returns at call time.
//! "Undefined" results (incomplete contribution data, nothing graded yet) come back as
//! `None`; only repository failures are errors.

mod course;
mod department;
mod learning;
mod policy;

pub use policy::{GradingPolicy, LoFormula, UnknownLoFormula};

use rust_decimal::Decimal;

use super::domain::{CourseId, DepartmentOutcomeId, LearningOutcomeId, ProgramOutcomeId, StudentId};
use super::repository::{GradebookRepository, RepositoryError};

/// Stateless evaluator that applies the grading policy to repository data.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollupEngine {
    policy: GradingPolicy,
}

impl RollupEngine {
    pub fn new(policy: GradingPolicy) -> Self {
        Self { policy }
    }

    /// Achievement of one learning outcome, or `None` when it is undefined for the
    /// configured formula.
    pub fn lo_achievement<R>(
        &self,
        repository: &R,
        student: &StudentId,
        course: &CourseId,
        lo: &LearningOutcomeId,
    ) -> Result<Option<Decimal>, RepositoryError>
    where
        R: GradebookRepository + ?Sized,
    {
        match self.policy.lo_formula {
            LoFormula::ContributionGated => learning::contribution_gated(repository, student, course, lo),
            LoFormula::LegacyNormalized => learning::legacy_normalized(repository, student, course, lo),
        }
    }

    /// Weighted course grade over graded assessments, renormalized to a 0–100 scale.
    pub fn course_grade<R>(
        &self,
        repository: &R,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<Option<Decimal>, RepositoryError>
    where
        R: GradebookRepository + ?Sized,
    {
        course::course_grade(repository, student, course)
    }

    /// Ordinal-weighted average of the LOs mapped to a course PO. Always defined.
    pub fn course_po_achievement<R>(
        &self,
        repository: &R,
        student: &StudentId,
        course: &CourseId,
        po: &ProgramOutcomeId,
    ) -> Result<Decimal, RepositoryError>
    where
        R: GradebookRepository + ?Sized,
    {
        course::course_po_achievement(self, repository, student, course, po)
    }

    /// Additive share of every qualifying LO across the student's enrolled courses.
    pub fn department_po_achievement<R>(
        &self,
        repository: &R,
        student: &StudentId,
        outcome: &DepartmentOutcomeId,
    ) -> Result<Option<Decimal>, RepositoryError>
    where
        R: GradebookRepository + ?Sized,
    {
        department::department_po_achievement(self, repository, student, outcome)
    }
}
