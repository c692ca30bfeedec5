use rust_decimal::Decimal;
use tracing::debug;

use super::super::domain::{CourseId, ProgramOutcomeId, StudentId};
use super::super::numeric::{bounded, settle, share};
use super::super::repository::{GradebookRepository, RepositoryError};
use super::RollupEngine;

pub(super) fn course_grade<R>(
    repository: &R,
    student: &StudentId,
    course: &CourseId,
) -> Result<Option<Decimal>, RepositoryError>
where
    R: GradebookRepository + ?Sized,
{
    let assessments = repository.assessments(course)?;
    if assessments.is_empty() {
        return Ok(None);
    }

    let mut total_grade = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;

    for assessment in &assessments {
        let Some(score) = repository.score(&assessment.id, student)? else {
            continue;
        };

        let weight = bounded("weight_percentage", assessment.weight_percentage);
        total_grade += share(bounded("score", score.value), weight);
        total_weight += weight;
    }

    if total_weight.is_zero() {
        debug!(%student, %course, "no graded assessments; course grade undefined");
        return Ok(None);
    }

    if total_weight != Decimal::ONE_HUNDRED {
        total_grade = total_grade * Decimal::ONE_HUNDRED / total_weight;
    }

    Ok(Some(settle(total_grade)))
}

pub(super) fn course_po_achievement<R>(
    engine: &RollupEngine,
    repository: &R,
    student: &StudentId,
    course: &CourseId,
    po: &ProgramOutcomeId,
) -> Result<Decimal, RepositoryError>
where
    R: GradebookRepository + ?Sized,
{
    let mappings = repository.lo_po_mappings(po, course)?;

    let mut weighted_total = Decimal::ZERO;
    let mut weight_total = Decimal::ZERO;

    for mapping in &mappings {
        let Some(achievement) =
            engine.lo_achievement(repository, student, course, &mapping.learning_outcome_id)?
        else {
            continue;
        };

        let weight = Decimal::from(mapping.contribution_weight);
        weighted_total += achievement * weight;
        weight_total += weight;
    }

    if weight_total.is_zero() {
        return Ok(settle(Decimal::ZERO));
    }

    Ok(settle(weighted_total / weight_total))
}
