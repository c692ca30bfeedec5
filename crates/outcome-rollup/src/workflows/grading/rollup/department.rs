use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::super::domain::{DepartmentOutcomeId, StudentId};
use super::super::numeric::{bounded, settle, share};
use super::super::repository::{GradebookRepository, RepositoryError};
use super::RollupEngine;

pub(super) fn department_po_achievement<R>(
    engine: &RollupEngine,
    repository: &R,
    student: &StudentId,
    outcome: &DepartmentOutcomeId,
) -> Result<Option<Decimal>, RepositoryError>
where
    R: GradebookRepository + ?Sized,
{
    let contributions = repository.department_contributions(outcome)?;
    if contributions.is_empty() {
        return Ok(None);
    }

    let mut total = Decimal::ZERO;
    let mut qualified = 0usize;

    for edge in &contributions {
        let Some(lo) = repository.learning_outcome(&edge.learning_outcome_id)? else {
            warn!(
                lo = %edge.learning_outcome_id,
                %outcome,
                "department contribution references unknown learning outcome"
            );
            continue;
        };

        // Enrollment is re-checked on every call.
        if !repository.is_enrolled(student, &lo.course_id)? {
            continue;
        }

        let Some(achievement) = engine.lo_achievement(repository, student, &lo.course_id, &lo.id)?
        else {
            continue;
        };

        total += share(
            achievement,
            bounded("contribution_percentage", edge.contribution_percentage),
        );
        qualified += 1;
    }

    if qualified == 0 {
        debug!(%student, %outcome, "no qualifying learning outcomes for department outcome");
        return Ok(None);
    }

    // Additive: shares of skipped LOs are omitted, not redistributed.
    Ok(Some(settle(total)))
}
