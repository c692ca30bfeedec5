use std::str::FromStr;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::workflows::grading::banding::LetterGrade;
use crate::workflows::grading::domain::{
    Assessment, AssessmentId, AssessmentKind, AssessmentLoContribution, ContributionWeight,
    Course, CourseId, DepartmentLoPoContribution, DepartmentOutcomeId, DepartmentProgramOutcome,
    Enrollment, LearningOutcome, LearningOutcomeId, LoPoMapping, ProgramOutcome,
    ProgramOutcomeId, Score, StudentId,
};
use crate::workflows::grading::repository::{GradebookRepository, RepositoryError, ScoreWriter};
use crate::workflows::grading::{
    GradebookSnapshot, GradingPolicy, GradingService, LoFormula, SharedGradebook,
};

pub(super) fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("valid decimal literal")
}

pub(super) fn student() -> StudentId {
    StudentId::new("s-1001")
}

pub(super) fn other_student() -> StudentId {
    StudentId::new("s-2002")
}

pub(super) fn programming() -> CourseId {
    CourseId::new("ceng-101")
}

pub(super) fn algorithms() -> CourseId {
    CourseId::new("ceng-213")
}

pub(super) fn lo(id: &str) -> LearningOutcomeId {
    LearningOutcomeId::new(id)
}

pub(super) fn po(id: &str) -> ProgramOutcomeId {
    ProgramOutcomeId::new(id)
}

pub(super) fn dpo(id: &str) -> DepartmentOutcomeId {
    DepartmentOutcomeId::new(id)
}

pub(super) fn assessment_id(id: &str) -> AssessmentId {
    AssessmentId::new(id)
}

pub(super) fn assessment(
    id: &str,
    course: &CourseId,
    kind: AssessmentKind,
    weight: &str,
) -> Assessment {
    Assessment {
        id: assessment_id(id),
        course_id: course.clone(),
        name: kind.label().to_string(),
        kind,
        weight_percentage: dec(weight),
    }
}

pub(super) fn learning_outcome(id: &str, course: &CourseId, code: &str, order: u32) -> LearningOutcome {
    LearningOutcome {
        id: lo(id),
        course_id: course.clone(),
        code: code.to_string(),
        description: format!("{code} description"),
        order,
    }
}

pub(super) fn edge(assessment: &str, outcome: &str, percentage: &str) -> AssessmentLoContribution {
    AssessmentLoContribution {
        assessment_id: assessment_id(assessment),
        learning_outcome_id: lo(outcome),
        contribution_percentage: dec(percentage),
    }
}

pub(super) fn mapping(outcome: &str, program: &str, weight: ContributionWeight) -> LoPoMapping {
    LoPoMapping {
        learning_outcome_id: lo(outcome),
        program_outcome_id: po(program),
        contribution_weight: weight,
    }
}

pub(super) fn department_edge(
    outcome: &str,
    department: &str,
    percentage: &str,
) -> DepartmentLoPoContribution {
    DepartmentLoPoContribution {
        learning_outcome_id: lo(outcome),
        department_outcome_id: dpo(department),
        contribution_percentage: dec(percentage),
    }
}

pub(super) fn scored(assessment: &str, student: &StudentId, value: &str) -> Score {
    let value = dec(value);
    Score {
        assessment_id: assessment_id(assessment),
        student_id: student.clone(),
        value,
        letter_grade: LetterGrade::band(value).ok(),
        updated_at: None,
    }
}

/// Two courses, one student enrolled in both.
///
/// - ceng-101: midterm 40%, final 60%; scores 80 and 70.
///   - LO1 ← midterm 40 / final 60 (complete)
///   - LO2 ← midterm 50 (incomplete)
///   - LO4 ← midterm 100 (complete)
///   - LO5 has no contributions
///   - PO1 ← LO1 (high), LO4 (low); PO2 ← LO2
/// - ceng-213: project 100%; score 90. LO3 ← project 100.
/// - DPO1 ← LO4 40, LO2 30, LO3 30.
pub(super) fn gradebook() -> GradebookSnapshot {
    let programming = programming();
    let algorithms = algorithms();

    GradebookSnapshot {
        courses: vec![
            Course {
                id: programming.clone(),
                code: "CENG101".to_string(),
                name: "Introduction to Programming".to_string(),
            },
            Course {
                id: algorithms.clone(),
                code: "CENG213".to_string(),
                name: "Data Structures".to_string(),
            },
        ],
        assessments: vec![
            assessment("a-mid", &programming, AssessmentKind::Midterm, "40"),
            assessment("a-final", &programming, AssessmentKind::Final, "60"),
            assessment("b-project", &algorithms, AssessmentKind::Project, "100"),
        ],
        learning_outcomes: vec![
            learning_outcome("lo-5", &programming, "LO5", 5),
            learning_outcome("lo-1", &programming, "LO1", 1),
            learning_outcome("lo-2", &programming, "LO2", 2),
            learning_outcome("lo-4", &programming, "LO4", 4),
            learning_outcome("lo-3", &algorithms, "LO1", 1),
        ],
        program_outcomes: vec![
            ProgramOutcome {
                id: po("po-1"),
                course_id: programming.clone(),
                code: "PO1".to_string(),
                description: "Problem solving".to_string(),
                order: 1,
            },
            ProgramOutcome {
                id: po("po-2"),
                course_id: programming.clone(),
                code: "PO2".to_string(),
                description: "Communication".to_string(),
                order: 2,
            },
        ],
        lo_contributions: vec![
            edge("a-mid", "lo-1", "40"),
            edge("a-final", "lo-1", "60"),
            edge("a-mid", "lo-2", "50"),
            edge("a-mid", "lo-4", "100"),
            edge("b-project", "lo-3", "100"),
        ],
        lo_po_mappings: vec![
            mapping("lo-1", "po-1", ContributionWeight::High),
            mapping("lo-4", "po-1", ContributionWeight::Low),
            mapping("lo-2", "po-2", ContributionWeight::Medium),
        ],
        department_outcomes: vec![
            DepartmentProgramOutcome {
                id: dpo("dpo-2"),
                code: "DPO2".to_string(),
                description: "Teamwork".to_string(),
                order: 2,
            },
            DepartmentProgramOutcome {
                id: dpo("dpo-1"),
                code: "DPO1".to_string(),
                description: "Engineering knowledge".to_string(),
                order: 1,
            },
        ],
        department_contributions: vec![
            department_edge("lo-4", "dpo-1", "40"),
            department_edge("lo-2", "dpo-1", "30"),
            department_edge("lo-3", "dpo-1", "30"),
        ],
        enrollments: vec![
            Enrollment {
                student_id: student(),
                course_id: programming.clone(),
                enrolled_at: None,
            },
            Enrollment {
                student_id: student(),
                course_id: algorithms,
                enrolled_at: None,
            },
            Enrollment {
                student_id: other_student(),
                course_id: programming,
                enrolled_at: None,
            },
        ],
        scores: vec![
            scored("a-mid", &student(), "80"),
            scored("a-final", &student(), "70"),
            scored("b-project", &student(), "90"),
        ],
    }
}

pub(super) fn build_service(
    formula: LoFormula,
) -> (Arc<GradingService<SharedGradebook>>, Arc<SharedGradebook>) {
    let repository = Arc::new(SharedGradebook::new(gradebook()));
    let service = Arc::new(GradingService::new(
        repository.clone(),
        GradingPolicy::new(formula),
    ));
    (service, repository)
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Repository whose backing store is unreachable.
pub(super) struct UnavailableGradebook;

fn unavailable<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("gradebook offline".to_string()))
}

impl GradebookRepository for UnavailableGradebook {
    fn course(&self, _id: &CourseId) -> Result<Option<Course>, RepositoryError> {
        unavailable()
    }

    fn assessment(&self, _id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        unavailable()
    }

    fn learning_outcome(
        &self,
        _id: &LearningOutcomeId,
    ) -> Result<Option<LearningOutcome>, RepositoryError> {
        unavailable()
    }

    fn program_outcome(
        &self,
        _id: &ProgramOutcomeId,
    ) -> Result<Option<ProgramOutcome>, RepositoryError> {
        unavailable()
    }

    fn department_program_outcome(
        &self,
        _id: &DepartmentOutcomeId,
    ) -> Result<Option<DepartmentProgramOutcome>, RepositoryError> {
        unavailable()
    }

    fn assessments(&self, _course: &CourseId) -> Result<Vec<Assessment>, RepositoryError> {
        unavailable()
    }

    fn learning_outcomes(
        &self,
        _course: &CourseId,
    ) -> Result<Vec<LearningOutcome>, RepositoryError> {
        unavailable()
    }

    fn program_outcomes(
        &self,
        _course: &CourseId,
    ) -> Result<Vec<ProgramOutcome>, RepositoryError> {
        unavailable()
    }

    fn department_program_outcomes(
        &self,
    ) -> Result<Vec<DepartmentProgramOutcome>, RepositoryError> {
        unavailable()
    }

    fn score(
        &self,
        _assessment: &AssessmentId,
        _student: &StudentId,
    ) -> Result<Option<Score>, RepositoryError> {
        unavailable()
    }

    fn contributions_for_lo(
        &self,
        _lo: &LearningOutcomeId,
        _course: &CourseId,
    ) -> Result<Vec<AssessmentLoContribution>, RepositoryError> {
        unavailable()
    }

    fn lo_po_mappings(
        &self,
        _po: &ProgramOutcomeId,
        _course: &CourseId,
    ) -> Result<Vec<LoPoMapping>, RepositoryError> {
        unavailable()
    }

    fn department_contributions(
        &self,
        _outcome: &DepartmentOutcomeId,
    ) -> Result<Vec<DepartmentLoPoContribution>, RepositoryError> {
        unavailable()
    }

    fn is_enrolled(&self, _student: &StudentId, _course: &CourseId) -> Result<bool, RepositoryError> {
        unavailable()
    }

    fn enrolled_courses(&self, _student: &StudentId) -> Result<Vec<Course>, RepositoryError> {
        unavailable()
    }
}

impl ScoreWriter for UnavailableGradebook {
    fn write_score(
        &self,
        _assessment: &AssessmentId,
        _student: &StudentId,
        _value: Decimal,
        _letter_grade: LetterGrade,
    ) -> Result<Score, RepositoryError> {
        Err(RepositoryError::WriteRejected("gradebook is read-only".to_string()))
    }
}
