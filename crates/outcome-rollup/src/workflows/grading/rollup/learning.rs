use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use super::super::domain::{CourseId, LearningOutcomeId, StudentId};
use super::super::numeric::{bounded, partitions_hundred, settle, share};
use super::super::repository::{GradebookRepository, RepositoryError};

pub(super) fn contribution_gated<R>(
    repository: &R,
    student: &StudentId,
    course: &CourseId,
    lo: &LearningOutcomeId,
) -> Result<Option<Decimal>, RepositoryError>
where
    R: GradebookRepository + ?Sized,
{
    let contributions = repository.contributions_for_lo(lo, course)?;
    if contributions.is_empty() {
        debug!(%lo, %course, "no assessment contributions defined for learning outcome");
        return Ok(None);
    }

    // The gate runs over the full edge set, scored or not, on the raw percentages.
    let total_contribution: Decimal = contributions
        .iter()
        .map(|edge| edge.contribution_percentage)
        .sum();

    if !partitions_hundred(total_contribution) {
        debug!(
            %lo,
            %course,
            %total_contribution,
            "learning outcome contributions do not sum to 100; achievement undefined"
        );
        return Ok(None);
    }

    let mut value = Decimal::ZERO;
    for edge in &contributions {
        // Ungraded components contribute zero.
        let Some(score) = repository.score(&edge.assessment_id, student)? else {
            continue;
        };

        value += share(
            bounded("score", score.value),
            bounded("contribution_percentage", edge.contribution_percentage),
        );
    }

    Ok(Some(settle(value)))
}

pub(super) fn legacy_normalized<R>(
    repository: &R,
    student: &StudentId,
    course: &CourseId,
    lo: &LearningOutcomeId,
) -> Result<Option<Decimal>, RepositoryError>
where
    R: GradebookRepository + ?Sized,
{
    let contributions = repository.contributions_for_lo(lo, course)?;
    if contributions.is_empty() {
        return Ok(None);
    }

    let weights: HashMap<_, _> = repository
        .assessments(course)?
        .into_iter()
        .map(|assessment| (assessment.id, assessment.weight_percentage))
        .collect();

    let mut weighted_total = Decimal::ZERO;
    let mut factor_total = Decimal::ZERO;

    for edge in &contributions {
        let Some(score) = repository.score(&edge.assessment_id, student)? else {
            continue;
        };
        let Some(weight) = weights.get(&edge.assessment_id) else {
            continue;
        };

        let factor = bounded("weight_percentage", *weight)
            * bounded("contribution_percentage", edge.contribution_percentage);
        weighted_total += bounded("score", score.value) * factor;
        factor_total += factor;
    }

    if factor_total.is_zero() {
        debug!(%lo, %course, "no weighted scores for learning outcome under legacy formula");
        return Ok(None);
    }

    Ok(Some(settle(weighted_total / factor_total)))
}
