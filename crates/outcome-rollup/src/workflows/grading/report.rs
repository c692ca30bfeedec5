use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::banding::{band, LetterGrade};
use super::domain::{
    Assessment, AssessmentId, AssessmentKind, Course, CourseId, DepartmentOutcomeId,
    DepartmentProgramOutcome, LearningOutcome, StudentId,
};
use super::numeric::{clamp_percentage, partitions_hundred, round_half_up};
use super::repository::{GradebookRepository, RepositoryError};
use super::rollup::RollupEngine;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub id: CourseId,
    pub code: String,
    pub name: String,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            code: course.code.clone(),
            name: course.name.clone(),
        }
    }
}

/// One assessment row; score fields are `None` while ungraded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub assessment_id: AssessmentId,
    pub name: String,
    pub kind: AssessmentKind,
    pub weight_percentage: Decimal,
    pub score: Option<Decimal>,
    pub letter_grade: Option<LetterGrade>,
}

/// Everything presentation needs for one student in one course.
///
/// `lo_achievements` only holds defined LOs; `po_achievements` holds every course PO.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentCourseReport {
    pub student_id: StudentId,
    pub course: CourseSummary,
    pub assessments: Vec<AssessmentResult>,
    pub total_grade: Option<Decimal>,
    pub letter_grade: Option<LetterGrade>,
    pub lo_achievements: BTreeMap<String, Decimal>,
    pub po_achievements: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentOutcomeView {
    pub outcome_id: DepartmentOutcomeId,
    pub code: String,
    pub description: String,
    pub order: u32,
    pub achievement: Option<Decimal>,
}

/// Configuration status of one LO's assessment contributions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoCoverageView {
    pub code: String,
    pub description: String,
    pub contribution_count: usize,
    pub total_percentage: Decimal,
    pub complete: bool,
}

impl RollupEngine {
    pub fn build_report<R>(
        &self,
        repository: &R,
        student: &StudentId,
        course: &Course,
    ) -> Result<StudentCourseReport, RepositoryError>
    where
        R: GradebookRepository + ?Sized,
    {
        let assessments = repository
            .assessments(&course.id)?
            .iter()
            .map(|assessment| assessment_result(repository, student, assessment))
            .collect::<Result<Vec<_>, _>>()?;

        let total_grade = self.course_grade(repository, student, &course.id)?;
        // The course grade is already clamped, so banding cannot fail here.
        let letter_grade = band(total_grade).ok().flatten();

        let mut lo_achievements = BTreeMap::new();
        for lo in repository.learning_outcomes(&course.id)? {
            if let Some(value) = self.lo_achievement(repository, student, &course.id, &lo.id)? {
                lo_achievements.insert(lo.code, value);
            }
        }

        let mut po_achievements = BTreeMap::new();
        for po in repository.program_outcomes(&course.id)? {
            let value = self.course_po_achievement(repository, student, &course.id, &po.id)?;
            po_achievements.insert(po.code, value);
        }

        Ok(StudentCourseReport {
            student_id: student.clone(),
            course: CourseSummary::from(course),
            assessments,
            total_grade,
            letter_grade,
            lo_achievements,
            po_achievements,
        })
    }

    pub fn department_outcomes<R>(
        &self,
        repository: &R,
        student: &StudentId,
    ) -> Result<Vec<DepartmentOutcomeView>, RepositoryError>
    where
        R: GradebookRepository + ?Sized,
    {
        let mut views = Vec::new();
        for outcome in repository.department_program_outcomes()? {
            let achievement = self.department_po_achievement(repository, student, &outcome.id)?;
            views.push(department_view(outcome, achievement));
        }
        Ok(views)
    }
}

fn assessment_result<R>(
    repository: &R,
    student: &StudentId,
    assessment: &Assessment,
) -> Result<AssessmentResult, RepositoryError>
where
    R: GradebookRepository + ?Sized,
{
    let score = repository.score(&assessment.id, student)?;

    // The stored letter is a projection of the value; recompute rather than trust it.
    let letter_grade = score.as_ref().map(|score| {
        let projected = LetterGrade::band(clamp_percentage(score.value)).unwrap_or(LetterGrade::Ff);
        if score.letter_grade.is_some_and(|stored| stored != projected) {
            warn!(
                assessment = %assessment.id,
                %student,
                "stored letter grade disagrees with score; using recomputed band"
            );
        }
        projected
    });

    Ok(AssessmentResult {
        assessment_id: assessment.id.clone(),
        name: assessment.name.clone(),
        kind: assessment.kind,
        weight_percentage: assessment.weight_percentage,
        score: score.map(|score| score.value),
        letter_grade,
    })
}

fn department_view(
    outcome: DepartmentProgramOutcome,
    achievement: Option<Decimal>,
) -> DepartmentOutcomeView {
    DepartmentOutcomeView {
        outcome_id: outcome.id,
        code: outcome.code,
        description: outcome.description,
        order: outcome.order,
        achievement,
    }
}

pub(crate) fn lo_coverage<R>(
    repository: &R,
    course: &CourseId,
    lo: LearningOutcome,
) -> Result<LoCoverageView, RepositoryError>
where
    R: GradebookRepository + ?Sized,
{
    let contributions = repository.contributions_for_lo(&lo.id, course)?;
    let total: Decimal = contributions
        .iter()
        .map(|edge| edge.contribution_percentage)
        .sum();

    Ok(LoCoverageView {
        code: lo.code,
        description: lo.description,
        contribution_count: contributions.len(),
        total_percentage: round_half_up(total),
        complete: !contributions.is_empty() && partitions_hundred(total),
    })
}
