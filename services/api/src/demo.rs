use crate::infra::{
    build_service, demo_gradebook, display_value, load_gradebook, parse_formula, DEMO_SCORES,
};
use clap::Args;
use outcome_rollup::config::AppConfig;
use outcome_rollup::error::AppError;
use outcome_rollup::workflows::grading::{
    CourseId, DepartmentOutcomeView, GradingError, GradingPolicy, LoFormula, ScoreBatchOutcome,
    StudentCourseReport, StudentId,
};
use outcome_rollup::workflows::score_import::ScoreCsvImporter;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Student identifier
    #[arg(long)]
    pub(crate) student: String,
    /// Course identifier
    #[arg(long)]
    pub(crate) course: String,
    /// Gradebook snapshot (JSON). Defaults to APP_GRADEBOOK_PATH, then the demo gradebook.
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Override the configured LO formula (contribution_gated | legacy_normalized)
    #[arg(long, value_parser = parse_formula)]
    pub(crate) lo_formula: Option<LoFormula>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreImportArgs {
    /// CSV export with `assessment_id,student_id,score` columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Gradebook snapshot (JSON) to enter scores into
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Write the updated gradebook to this path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Student whose reports are printed
    #[arg(long, default_value = "s-1001")]
    pub(crate) student: String,
    /// LO formula used for the demo rollups
    #[arg(long, value_parser = parse_formula)]
    pub(crate) lo_formula: Option<LoFormula>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        student,
        course,
        snapshot,
        lo_formula,
    } = args;

    let config = AppConfig::load()?;
    let path = snapshot.or(config.grading.gradebook_path);
    let policy = lo_formula
        .map(GradingPolicy::new)
        .unwrap_or(config.grading.policy);

    let (service, _) = build_service(load_gradebook(path.as_deref())?, policy);
    let report = service.course_report(&StudentId::new(student), &CourseId::new(course))?;

    for line in render_course_report(&report) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn run_score_import(args: ScoreImportArgs) -> Result<(), AppError> {
    let ScoreImportArgs {
        csv,
        snapshot,
        output,
    } = args;

    let config = AppConfig::load()?;
    let path = snapshot.or(config.grading.gradebook_path);
    let (service, repository) =
        build_service(load_gradebook(path.as_deref())?, config.grading.policy);

    let entries = ScoreCsvImporter::from_path(&csv)?;
    println!("Importing {} score rows from {}", entries.len(), csv.display());
    let outcome = service.enter_scores(entries);
    for line in render_batch(&outcome) {
        println!("{line}");
    }

    if let Some(output) = output {
        let updated = repository.snapshot().map_err(GradingError::from)?;
        updated.save(&output)?;
        println!("Updated gradebook written to {}", output.display());
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        student,
        lo_formula,
    } = args;

    let policy = GradingPolicy::new(lo_formula.unwrap_or_default());
    let (service, _) = build_service(demo_gradebook()?, policy);
    let student = StudentId::new(student);

    println!("Outcome rollup demo ({} LO formula)", policy.lo_formula);

    let entries = ScoreCsvImporter::from_reader(DEMO_SCORES.as_bytes())?;
    println!("\nScore entry ({} rows)", entries.len());
    for line in render_batch(&service.enter_scores(entries)) {
        println!("{line}");
    }

    let reports = service.student_overview(&student)?;
    if reports.is_empty() {
        println!("\nStudent {student} is not enrolled in any course");
        return Ok(());
    }

    for report in &reports {
        println!();
        for line in render_course_report(report) {
            println!("{line}");
        }
    }

    println!("\nDepartment program outcomes");
    for line in render_department_outcomes(&service.department_outcomes(&student)?) {
        println!("{line}");
    }

    Ok(())
}

pub(crate) fn render_course_report(report: &StudentCourseReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} | student {}",
        report.course.code, report.course.name, report.student_id
    )];

    lines.push("Assessments:".to_string());
    for row in &report.assessments {
        let letter = row
            .letter_grade
            .map(|letter| letter.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "  - {} ({}, weight {:.2}%): {} [{}]",
            row.name,
            row.kind.label(),
            row.weight_percentage,
            display_value(row.score),
            letter
        ));
    }

    let letter = report
        .letter_grade
        .map(|letter| format!(" ({letter})"))
        .unwrap_or_default();
    lines.push(format!(
        "Course grade: {}{}",
        display_value(report.total_grade),
        letter
    ));

    if report.lo_achievements.is_empty() {
        lines.push("Learning outcomes: not yet available".to_string());
    } else {
        lines.push("Learning outcomes:".to_string());
        for (code, value) in &report.lo_achievements {
            lines.push(format!("  - {code}: {value:.2}"));
        }
    }

    if !report.po_achievements.is_empty() {
        lines.push("Program outcomes:".to_string());
        for (code, value) in &report.po_achievements {
            lines.push(format!("  - {code}: {value:.2}"));
        }
    }

    lines
}

pub(crate) fn render_department_outcomes(views: &[DepartmentOutcomeView]) -> Vec<String> {
    views
        .iter()
        .map(|view| {
            format!(
                "  - {} {}: {}",
                view.code,
                view.description,
                display_value(view.achievement)
            )
        })
        .collect()
}

pub(crate) fn render_batch(outcome: &ScoreBatchOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "- {} saved | {} rejected",
        outcome.saved.len(),
        outcome.rejected.len()
    )];
    for rejection in &outcome.rejected {
        lines.push(format!(
            "  - {} / {}: {}",
            rejection.assessment_id, rejection.student_id, rejection.reason
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_reports() -> (Vec<StudentCourseReport>, Vec<DepartmentOutcomeView>) {
        let (service, _) =
            build_service(demo_gradebook().expect("demo gradebook"), GradingPolicy::default());
        let entries = ScoreCsvImporter::from_reader(DEMO_SCORES.as_bytes()).expect("demo scores");
        service.enter_scores(entries);

        let student = StudentId::new("s-1001");
        (
            service.student_overview(&student).expect("overview"),
            service.department_outcomes(&student).expect("department outcomes"),
        )
    }

    #[test]
    fn course_report_lists_grade_and_outcomes() {
        let (reports, _) = demo_reports();
        let lines = render_course_report(&reports[0]);

        assert_eq!(lines[0], "CENG101 Introduction to Programming | student s-1001");
        assert!(lines.contains(&"  - Midterm Exam (Midterm, weight 40.00%): 80.00 [BB]".to_string()));
        assert!(lines.contains(&"Course grade: 74.00 (CC)".to_string()));
        assert!(lines.contains(&"  - PO1: 75.50".to_string()));
        assert!(!lines.iter().any(|line| line.contains("LO2")));
    }

    #[test]
    fn ungraded_values_render_as_pending() {
        let (reports, departments) = demo_reports();
        let lines = render_course_report(&reports[1]);

        assert!(lines.contains(&"  - Final Exam (Final, weight 50.00%): not yet available [-]".to_string()));
        assert_eq!(
            render_department_outcomes(&departments),
            vec![
                "  - DPO1 Engineering knowledge: 59.00".to_string(),
                "  - DPO2 Teamwork: not yet available".to_string(),
            ]
        );
    }

    #[test]
    fn batch_summary_lists_rejections() {
        let (service, _) =
            build_service(demo_gradebook().expect("demo gradebook"), GradingPolicy::default());
        let entries = ScoreCsvImporter::from_reader(DEMO_SCORES.as_bytes()).expect("demo scores");
        let lines = render_batch(&service.enter_scores(entries));

        assert_eq!(lines[0], "- 2 saved | 2 rejected");
        assert!(lines[1].starts_with("  - ceng-101-final / s-2002: score must be between 0 and 100"));
    }
}
