use std::collections::HashSet;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::banding::LetterGrade;
use super::domain::{
    Assessment, AssessmentId, AssessmentLoContribution, Course, CourseId,
    DepartmentLoPoContribution, DepartmentOutcomeId, DepartmentProgramOutcome, Enrollment,
    LearningOutcome, LearningOutcomeId, LoPoMapping, ProgramOutcome, ProgramOutcomeId, Score,
    StudentId,
};
use super::repository::{GradebookRepository, RepositoryError, ScoreWriter};

/// Plain in-memory copy of every entity collection the rollup reads.
///
/// Serves as the JSON interchange format for the service binary and as the backing data of
/// in-memory repositories. Collections keep insertion order; lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradebookSnapshot {
    pub courses: Vec<Course>,
    pub assessments: Vec<Assessment>,
    pub learning_outcomes: Vec<LearningOutcome>,
    pub program_outcomes: Vec<ProgramOutcome>,
    pub lo_contributions: Vec<AssessmentLoContribution>,
    pub lo_po_mappings: Vec<LoPoMapping>,
    pub department_outcomes: Vec<DepartmentProgramOutcome>,
    pub department_contributions: Vec<DepartmentLoPoContribution>,
    pub enrollments: Vec<Enrollment>,
    pub scores: Vec<Score>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read gradebook snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid gradebook snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl GradebookSnapshot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes the snapshot as pretty-printed JSON, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let mut writer = BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Replaces the value and letter grade of an existing score, or appends a new one.
    pub fn upsert_score(
        &mut self,
        assessment: &AssessmentId,
        student: &StudentId,
        value: Decimal,
        letter_grade: LetterGrade,
    ) -> Score {
        let updated_at = Some(Utc::now());

        if let Some(existing) = self
            .scores
            .iter_mut()
            .find(|score| &score.assessment_id == assessment && &score.student_id == student)
        {
            existing.value = value;
            existing.letter_grade = Some(letter_grade);
            existing.updated_at = updated_at;
            return existing.clone();
        }

        let score = Score {
            assessment_id: assessment.clone(),
            student_id: student.clone(),
            value,
            letter_grade: Some(letter_grade),
            updated_at,
        };
        self.scores.push(score.clone());
        score
    }

    /// Drops the enrollment for a pair, returning whether one existed.
    pub fn withdraw(&mut self, student: &StudentId, course: &CourseId) -> bool {
        let before = self.enrollments.len();
        self.enrollments.retain(|enrollment| {
            !(&enrollment.student_id == student && &enrollment.course_id == course)
        });
        before != self.enrollments.len()
    }

    fn course_assessment_ids(&self, course: &CourseId) -> HashSet<&AssessmentId> {
        self.assessments
            .iter()
            .filter(|assessment| &assessment.course_id == course)
            .map(|assessment| &assessment.id)
            .collect()
    }

    fn course_outcome_ids(&self, course: &CourseId) -> HashSet<&LearningOutcomeId> {
        self.learning_outcomes
            .iter()
            .filter(|outcome| &outcome.course_id == course)
            .map(|outcome| &outcome.id)
            .collect()
    }
}

impl GradebookRepository for GradebookSnapshot {
    fn course(&self, id: &CourseId) -> Result<Option<Course>, RepositoryError> {
        Ok(self.courses.iter().find(|course| &course.id == id).cloned())
    }

    fn assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        Ok(self
            .assessments
            .iter()
            .find(|assessment| &assessment.id == id)
            .cloned())
    }

    fn learning_outcome(
        &self,
        id: &LearningOutcomeId,
    ) -> Result<Option<LearningOutcome>, RepositoryError> {
        Ok(self
            .learning_outcomes
            .iter()
            .find(|outcome| &outcome.id == id)
            .cloned())
    }

    fn program_outcome(
        &self,
        id: &ProgramOutcomeId,
    ) -> Result<Option<ProgramOutcome>, RepositoryError> {
        Ok(self
            .program_outcomes
            .iter()
            .find(|outcome| &outcome.id == id)
            .cloned())
    }

    fn department_program_outcome(
        &self,
        id: &DepartmentOutcomeId,
    ) -> Result<Option<DepartmentProgramOutcome>, RepositoryError> {
        Ok(self
            .department_outcomes
            .iter()
            .find(|outcome| &outcome.id == id)
            .cloned())
    }

    fn assessments(&self, course: &CourseId) -> Result<Vec<Assessment>, RepositoryError> {
        Ok(self
            .assessments
            .iter()
            .filter(|assessment| &assessment.course_id == course)
            .cloned()
            .collect())
    }

    fn learning_outcomes(
        &self,
        course: &CourseId,
    ) -> Result<Vec<LearningOutcome>, RepositoryError> {
        let mut outcomes: Vec<_> = self
            .learning_outcomes
            .iter()
            .filter(|outcome| &outcome.course_id == course)
            .cloned()
            .collect();
        outcomes.sort_by(|a, b| (a.order, &a.code).cmp(&(b.order, &b.code)));
        Ok(outcomes)
    }

    fn program_outcomes(&self, course: &CourseId) -> Result<Vec<ProgramOutcome>, RepositoryError> {
        let mut outcomes: Vec<_> = self
            .program_outcomes
            .iter()
            .filter(|outcome| &outcome.course_id == course)
            .cloned()
            .collect();
        outcomes.sort_by(|a, b| (a.order, &a.code).cmp(&(b.order, &b.code)));
        Ok(outcomes)
    }

    fn department_program_outcomes(
        &self,
    ) -> Result<Vec<DepartmentProgramOutcome>, RepositoryError> {
        let mut outcomes = self.department_outcomes.clone();
        outcomes.sort_by(|a, b| (a.order, &a.code).cmp(&(b.order, &b.code)));
        Ok(outcomes)
    }

    fn score(
        &self,
        assessment: &AssessmentId,
        student: &StudentId,
    ) -> Result<Option<Score>, RepositoryError> {
        Ok(self
            .scores
            .iter()
            .find(|score| &score.assessment_id == assessment && &score.student_id == student)
            .cloned())
    }

    fn contributions_for_lo(
        &self,
        lo: &LearningOutcomeId,
        course: &CourseId,
    ) -> Result<Vec<AssessmentLoContribution>, RepositoryError> {
        let assessments = self.course_assessment_ids(course);
        Ok(self
            .lo_contributions
            .iter()
            .filter(|edge| &edge.learning_outcome_id == lo)
            .filter(|edge| assessments.contains(&edge.assessment_id))
            .cloned()
            .collect())
    }

    fn lo_po_mappings(
        &self,
        po: &ProgramOutcomeId,
        course: &CourseId,
    ) -> Result<Vec<LoPoMapping>, RepositoryError> {
        let outcomes = self.course_outcome_ids(course);
        Ok(self
            .lo_po_mappings
            .iter()
            .filter(|mapping| &mapping.program_outcome_id == po)
            .filter(|mapping| outcomes.contains(&mapping.learning_outcome_id))
            .cloned()
            .collect())
    }

    fn department_contributions(
        &self,
        outcome: &DepartmentOutcomeId,
    ) -> Result<Vec<DepartmentLoPoContribution>, RepositoryError> {
        Ok(self
            .department_contributions
            .iter()
            .filter(|edge| &edge.department_outcome_id == outcome)
            .cloned()
            .collect())
    }

    fn is_enrolled(&self, student: &StudentId, course: &CourseId) -> Result<bool, RepositoryError> {
        Ok(self
            .enrollments
            .iter()
            .any(|enrollment| &enrollment.student_id == student && &enrollment.course_id == course))
    }

    fn enrolled_courses(&self, student: &StudentId) -> Result<Vec<Course>, RepositoryError> {
        let enrolled: HashSet<&CourseId> = self
            .enrollments
            .iter()
            .filter(|enrollment| &enrollment.student_id == student)
            .map(|enrollment| &enrollment.course_id)
            .collect();

        let mut courses: Vec<_> = self
            .courses
            .iter()
            .filter(|course| enrolled.contains(&course.id))
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(courses)
    }
}

/// Thread-safe gradebook for a single process. Score writes take the write lock, so a
/// reader never observes a value without its letter grade.
#[derive(Debug, Default)]
pub struct SharedGradebook {
    inner: RwLock<GradebookSnapshot>,
}

impl SharedGradebook {
    pub fn new(snapshot: GradebookSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// Copy of the current state, e.g. for persisting back to disk.
    pub fn snapshot(&self) -> Result<GradebookSnapshot, RepositoryError> {
        Ok(self.read()?.clone())
    }

    /// Applies an out-of-band change such as an enrollment update.
    pub fn update<T>(&self, change: impl FnOnce(&mut GradebookSnapshot) -> T) -> Result<T, RepositoryError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| RepositoryError::Unavailable("gradebook lock poisoned".to_string()))?;
        Ok(change(&mut guard))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GradebookSnapshot>, RepositoryError> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::Unavailable("gradebook lock poisoned".to_string()))
    }
}

impl GradebookRepository for SharedGradebook {
    fn course(&self, id: &CourseId) -> Result<Option<Course>, RepositoryError> {
        self.read()?.course(id)
    }

    fn assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        self.read()?.assessment(id)
    }

    fn learning_outcome(
        &self,
        id: &LearningOutcomeId,
    ) -> Result<Option<LearningOutcome>, RepositoryError> {
        self.read()?.learning_outcome(id)
    }

    fn program_outcome(
        &self,
        id: &ProgramOutcomeId,
    ) -> Result<Option<ProgramOutcome>, RepositoryError> {
        self.read()?.program_outcome(id)
    }

    fn department_program_outcome(
        &self,
        id: &DepartmentOutcomeId,
    ) -> Result<Option<DepartmentProgramOutcome>, RepositoryError> {
        self.read()?.department_program_outcome(id)
    }

    fn assessments(&self, course: &CourseId) -> Result<Vec<Assessment>, RepositoryError> {
        self.read()?.assessments(course)
    }

    fn learning_outcomes(
        &self,
        course: &CourseId,
    ) -> Result<Vec<LearningOutcome>, RepositoryError> {
        self.read()?.learning_outcomes(course)
    }

    fn program_outcomes(&self, course: &CourseId) -> Result<Vec<ProgramOutcome>, RepositoryError> {
        self.read()?.program_outcomes(course)
    }

    fn department_program_outcomes(
        &self,
    ) -> Result<Vec<DepartmentProgramOutcome>, RepositoryError> {
        self.read()?.department_program_outcomes()
    }

    fn score(
        &self,
        assessment: &AssessmentId,
        student: &StudentId,
    ) -> Result<Option<Score>, RepositoryError> {
        self.read()?.score(assessment, student)
    }

    fn contributions_for_lo(
        &self,
        lo: &LearningOutcomeId,
        course: &CourseId,
    ) -> Result<Vec<AssessmentLoContribution>, RepositoryError> {
        self.read()?.contributions_for_lo(lo, course)
    }

    fn lo_po_mappings(
        &self,
        po: &ProgramOutcomeId,
        course: &CourseId,
    ) -> Result<Vec<LoPoMapping>, RepositoryError> {
        self.read()?.lo_po_mappings(po, course)
    }

    fn department_contributions(
        &self,
        outcome: &DepartmentOutcomeId,
    ) -> Result<Vec<DepartmentLoPoContribution>, RepositoryError> {
        self.read()?.department_contributions(outcome)
    }

    fn is_enrolled(&self, student: &StudentId, course: &CourseId) -> Result<bool, RepositoryError> {
        self.read()?.is_enrolled(student, course)
    }

    fn enrolled_courses(&self, student: &StudentId) -> Result<Vec<Course>, RepositoryError> {
        self.read()?.enrolled_courses(student)
    }
}

impl ScoreWriter for SharedGradebook {
    fn write_score(
        &self,
        assessment: &AssessmentId,
        student: &StudentId,
        value: Decimal,
        letter_grade: LetterGrade,
    ) -> Result<Score, RepositoryError> {
        self.update(|snapshot| snapshot.upsert_score(assessment, student, value, letter_grade))
    }
}
