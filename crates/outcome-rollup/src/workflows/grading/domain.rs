use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::banding::LetterGrade;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Opaque student key; the engine knows nothing else about a student.
    StudentId
);
identifier!(CourseId);
identifier!(AssessmentId);
identifier!(LearningOutcomeId);
identifier!(ProgramOutcomeId);
identifier!(
    /// Key of a department-wide program outcome, independent of any course.
    DepartmentOutcomeId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Midterm,
    Final,
    Quiz,
    Assignment,
    Project,
    #[default]
    Other,
}

impl AssessmentKind {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentKind::Midterm => "Midterm",
            AssessmentKind::Final => "Final",
            AssessmentKind::Quiz => "Quiz",
            AssessmentKind::Assignment => "Assignment",
            AssessmentKind::Project => "Project",
            AssessmentKind::Other => "Other",
        }
    }
}

/// Graded component of a course. Weights across a course are renormalized at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub course_id: CourseId,
    pub name: String,
    #[serde(default)]
    pub kind: AssessmentKind,
    pub weight_percentage: Decimal,
}

/// A student's result on one assessment. `letter_grade` is a projection of `value`
/// written together with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub assessment_id: AssessmentId,
    pub student_id: StudentId,
    pub value: Decimal,
    #[serde(default)]
    pub letter_grade: Option<LetterGrade>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentLoContribution {
    pub assessment_id: AssessmentId,
    pub learning_outcome_id: LearningOutcomeId,
    pub contribution_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningOutcome {
    pub id: LearningOutcomeId,
    pub course_id: CourseId,
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramOutcome {
    pub id: ProgramOutcomeId,
    pub course_id: CourseId,
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: u32,
}

/// Ordinal strength of an LO → course PO link.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum ContributionWeight {
    Low,
    #[default]
    Medium,
    High,
}

impl ContributionWeight {
    pub const fn value(self) -> u8 {
        match self {
            ContributionWeight::Low => 1,
            ContributionWeight::Medium => 2,
            ContributionWeight::High => 3,
        }
    }
}

impl TryFrom<u8> for ContributionWeight {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ContributionWeight::Low),
            2 => Ok(ContributionWeight::Medium),
            3 => Ok(ContributionWeight::High),
            other => Err(format!("contribution weight must be 1, 2 or 3 (found {other})")),
        }
    }
}

impl From<ContributionWeight> for u8 {
    fn from(weight: ContributionWeight) -> Self {
        weight.value()
    }
}

impl From<ContributionWeight> for Decimal {
    fn from(weight: ContributionWeight) -> Self {
        Decimal::from(weight.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoPoMapping {
    pub learning_outcome_id: LearningOutcomeId,
    pub program_outcome_id: ProgramOutcomeId,
    #[serde(default)]
    pub contribution_weight: ContributionWeight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentProgramOutcome {
    pub id: DepartmentOutcomeId,
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: u32,
}

/// LO → department PO edge. These are not required to sum to 100 per department PO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentLoPoContribution {
    pub learning_outcome_id: LearningOutcomeId,
    pub department_outcome_id: DepartmentOutcomeId,
    pub contribution_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub course_id: CourseId,
    #[serde(default)]
    pub enrolled_at: Option<DateTime<Utc>>,
}

/// Raw score submitted by the score-entry workflow, before validation and banding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub assessment_id: AssessmentId,
    pub student_id: StudentId,
    pub score: Decimal,
}

/// Entity families that can be reported missing to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Course,
    Assessment,
    LearningOutcome,
    ProgramOutcome,
    DepartmentProgramOutcome,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Course => "course",
            EntityKind::Assessment => "assessment",
            EntityKind::LearningOutcome => "learning outcome",
            EntityKind::ProgramOutcome => "program outcome",
            EntityKind::DepartmentProgramOutcome => "department program outcome",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
