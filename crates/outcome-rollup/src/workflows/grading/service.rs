use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::banding::LetterGrade;
use super::domain::{
    Assessment, AssessmentId, Course, CourseId, DepartmentOutcomeId, EntityKind, LearningOutcome,
    LearningOutcomeId, ProgramOutcomeId, Score, ScoreEntry, StudentId,
};
use super::numeric::{require_percentage, round_half_up, ValidationError};
use super::report::{self, DepartmentOutcomeView, LoCoverageView, StudentCourseReport};
use super::repository::{GradebookRepository, RepositoryError, ScoreWriter};
use super::rollup::{GradingPolicy, RollupEngine};

/// Service composing the gradebook repository with the rollup engine.
pub struct GradingService<R> {
    repository: Arc<R>,
    engine: Arc<RollupEngine>,
}

impl<R> GradingService<R>
where
    R: GradebookRepository + ScoreWriter + 'static,
{
    pub fn new(repository: Arc<R>, policy: GradingPolicy) -> Self {
        Self {
            repository,
            engine: Arc::new(RollupEngine::new(policy)),
        }
    }

    /// Validate, band, and persist one score. Value and letter are written in a single call.
    pub fn enter_score(&self, entry: ScoreEntry) -> Result<Score, GradingError> {
        let ScoreEntry {
            assessment_id,
            student_id,
            score,
        } = entry;

        let value = round_half_up(require_percentage("score", score)?);
        let assessment = self.require_assessment(&assessment_id)?;

        if !self
            .repository
            .is_enrolled(&student_id, &assessment.course_id)?
        {
            return Err(GradingError::NotEnrolled {
                student: student_id,
                course: assessment.course_id,
            });
        }

        let letter_grade = LetterGrade::band(value)?;
        let stored =
            self.repository
                .write_score(&assessment.id, &student_id, value, letter_grade)?;

        info!(
            assessment = %stored.assessment_id,
            student = %stored.student_id,
            value = %stored.value,
            letter = %letter_grade,
            "score recorded"
        );

        Ok(stored)
    }

    /// Batch score entry. Each entry succeeds or fails on its own.
    pub fn enter_scores(&self, entries: Vec<ScoreEntry>) -> ScoreBatchOutcome {
        let mut outcome = ScoreBatchOutcome::default();

        for entry in entries {
            let assessment_id = entry.assessment_id.clone();
            let student_id = entry.student_id.clone();
            match self.enter_score(entry) {
                Ok(score) => outcome.saved.push(score),
                Err(err) => {
                    warn!(assessment = %assessment_id, student = %student_id, error = %err, "score rejected");
                    outcome.rejected.push(RejectedScore {
                        assessment_id,
                        student_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        outcome
    }

    pub fn lo_achievement(
        &self,
        student: &StudentId,
        course: &CourseId,
        lo: &LearningOutcomeId,
    ) -> Result<Option<Decimal>, GradingError> {
        let course = self.require_course(course)?;
        let lo = self.require_learning_outcome(&course.id, lo)?;
        Ok(self
            .engine
            .lo_achievement(self.repository.as_ref(), student, &course.id, &lo.id)?)
    }

    pub fn course_grade(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<Option<Decimal>, GradingError> {
        let course = self.require_course(course)?;
        Ok(self
            .engine
            .course_grade(self.repository.as_ref(), student, &course.id)?)
    }

    pub fn course_po_achievement(
        &self,
        student: &StudentId,
        course: &CourseId,
        po: &ProgramOutcomeId,
    ) -> Result<Decimal, GradingError> {
        let course = self.require_course(course)?;
        let po = self
            .repository
            .program_outcome(po)?
            .filter(|outcome| outcome.course_id == course.id)
            .ok_or_else(|| GradingError::not_found(EntityKind::ProgramOutcome, po.as_str()))?;
        Ok(self
            .engine
            .course_po_achievement(self.repository.as_ref(), student, &course.id, &po.id)?)
    }

    pub fn department_po_achievement(
        &self,
        student: &StudentId,
        outcome: &DepartmentOutcomeId,
    ) -> Result<Option<Decimal>, GradingError> {
        let outcome = self
            .repository
            .department_program_outcome(outcome)?
            .ok_or_else(|| {
                GradingError::not_found(EntityKind::DepartmentProgramOutcome, outcome.as_str())
            })?;
        Ok(self
            .engine
            .department_po_achievement(self.repository.as_ref(), student, &outcome.id)?)
    }

    pub fn course_report(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<StudentCourseReport, GradingError> {
        let course = self.require_course(course)?;
        Ok(self
            .engine
            .build_report(self.repository.as_ref(), student, &course)?)
    }

    /// Reports for every course the student is enrolled in.
    pub fn student_overview(
        &self,
        student: &StudentId,
    ) -> Result<Vec<StudentCourseReport>, GradingError> {
        let mut reports = Vec::new();
        for course in self.repository.enrolled_courses(student)? {
            reports.push(
                self.engine
                    .build_report(self.repository.as_ref(), student, &course)?,
            );
        }
        Ok(reports)
    }

    pub fn department_outcomes(
        &self,
        student: &StudentId,
    ) -> Result<Vec<DepartmentOutcomeView>, GradingError> {
        Ok(self
            .engine
            .department_outcomes(self.repository.as_ref(), student)?)
    }

    /// Contribution configuration status for each LO of a course.
    pub fn lo_coverage(&self, course: &CourseId) -> Result<Vec<LoCoverageView>, GradingError> {
        let course = self.require_course(course)?;
        let mut coverage = Vec::new();
        for lo in self.repository.learning_outcomes(&course.id)? {
            coverage.push(report::lo_coverage(
                self.repository.as_ref(),
                &course.id,
                lo,
            )?);
        }
        Ok(coverage)
    }

    fn require_course(&self, id: &CourseId) -> Result<Course, GradingError> {
        self.repository
            .course(id)?
            .ok_or_else(|| GradingError::not_found(EntityKind::Course, id.as_str()))
    }

    fn require_assessment(&self, id: &AssessmentId) -> Result<Assessment, GradingError> {
        self.repository
            .assessment(id)?
            .ok_or_else(|| GradingError::not_found(EntityKind::Assessment, id.as_str()))
    }

    fn require_learning_outcome(
        &self,
        course: &CourseId,
        id: &LearningOutcomeId,
    ) -> Result<LearningOutcome, GradingError> {
        self.repository
            .learning_outcome(id)?
            .filter(|lo| &lo.course_id == course)
            .ok_or_else(|| GradingError::not_found(EntityKind::LearningOutcome, id.as_str()))
    }
}

/// Result of a batch score entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreBatchOutcome {
    pub saved: Vec<Score>,
    pub rejected: Vec<RejectedScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedScore {
    pub assessment_id: AssessmentId,
    pub student_id: StudentId,
    pub reason: String,
}

/// Error raised by the grading service.
#[derive(Debug, thiserror::Error)]
pub enum GradingError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("student '{student}' is not enrolled in course '{course}'")]
    NotEnrolled { student: StudentId, course: CourseId },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl GradingError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}
