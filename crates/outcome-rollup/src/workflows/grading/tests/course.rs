use super::common::*;
use crate::workflows::grading::banding::{band, LetterGrade};
use crate::workflows::grading::domain::CourseId;
use crate::workflows::grading::{GradebookSnapshot, GradingPolicy, LoFormula, RollupEngine};

fn reweight(book: &mut GradebookSnapshot, midterm: &str, final_exam: &str) {
    for assessment in &mut book.assessments {
        match assessment.id.as_str() {
            "a-mid" => assessment.weight_percentage = dec(midterm),
            "a-final" => assessment.weight_percentage = dec(final_exam),
            _ => {}
        }
    }
}

#[test]
fn course_grade_weights_graded_assessments() {
    let book = gradebook();
    let grade = RollupEngine::default()
        .course_grade(&book, &student(), &programming())
        .expect("repository available");

    assert_eq!(grade, Some(dec("74.00")));
    assert_eq!(band(grade), Ok(Some(LetterGrade::Cc)));
}

#[test]
fn course_grade_renormalizes_when_weights_do_not_sum_to_hundred() {
    let engine = RollupEngine::default();

    let mut over = gradebook();
    reweight(&mut over, "60", "90");
    assert_eq!(
        engine
            .course_grade(&over, &student(), &programming())
            .expect("repository available"),
        Some(dec("74.00"))
    );

    let mut under = gradebook();
    reweight(&mut under, "40", "20");
    assert_eq!(
        engine
            .course_grade(&under, &student(), &programming())
            .expect("repository available"),
        Some(dec("76.67"))
    );
}

#[test]
fn course_grade_scales_partial_grading_to_graded_weight() {
    let mut book = gradebook();
    book.scores
        .retain(|score| score.assessment_id != assessment_id("a-final"));

    let grade = RollupEngine::default()
        .course_grade(&book, &student(), &programming())
        .expect("repository available");

    assert_eq!(grade, Some(dec("80.00")));
}

#[test]
fn course_grade_is_null_until_something_is_graded() {
    let book = gradebook();
    let engine = RollupEngine::default();

    assert_eq!(
        engine
            .course_grade(&book, &other_student(), &programming())
            .expect("repository available"),
        None
    );
    assert_eq!(
        engine
            .course_grade(&book, &student(), &CourseId::new("empty"))
            .expect("repository available"),
        None
    );
}

#[test]
fn course_po_uses_ordinal_weights_over_defined_outcomes() {
    let book = gradebook();
    let engine = RollupEngine::default();

    // (74 × 3 + 80 × 1) / 4
    let po1 = engine
        .course_po_achievement(&book, &student(), &programming(), &po("po-1"))
        .expect("repository available");
    assert_eq!(po1, dec("75.50"));

    let only_undefined = engine
        .course_po_achievement(&book, &student(), &programming(), &po("po-2"))
        .expect("repository available");
    assert_eq!(only_undefined.to_string(), "0.00");

    let unmapped = engine
        .course_po_achievement(&book, &student(), &programming(), &po("po-9"))
        .expect("repository available");
    assert_eq!(unmapped, dec("0"));
}

#[test]
fn course_po_follows_configured_lo_formula() {
    let book = gradebook();
    let engine = RollupEngine::new(GradingPolicy::new(LoFormula::LegacyNormalized));

    // (73.08 × 3 + 80 × 1) / 4
    let po1 = engine
        .course_po_achievement(&book, &student(), &programming(), &po("po-1"))
        .expect("repository available");
    assert_eq!(po1, dec("74.81"));
}
