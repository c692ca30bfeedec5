use metrics_exporter_prometheus::PrometheusHandle;
use outcome_rollup::error::AppError;
use outcome_rollup::workflows::grading::{
    GradebookSnapshot, GradingPolicy, GradingService, LoFormula, SharedGradebook,
};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

const DEMO_GRADEBOOK: &str =
    include_str!("../../../crates/outcome-rollup/fixtures/demo_gradebook.json");

pub(crate) const DEMO_SCORES: &str =
    include_str!("../../../crates/outcome-rollup/fixtures/demo_scores.csv");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type GradebookService = GradingService<SharedGradebook>;

pub(crate) fn demo_gradebook() -> Result<GradebookSnapshot, AppError> {
    Ok(GradebookSnapshot::from_reader(DEMO_GRADEBOOK.as_bytes())?)
}

/// Reads the snapshot at `path`, falling back to the bundled demo gradebook.
pub(crate) fn load_gradebook(path: Option<&Path>) -> Result<GradebookSnapshot, AppError> {
    match path {
        Some(path) => {
            let snapshot = GradebookSnapshot::from_path(path)?;
            info!(path = %path.display(), courses = snapshot.courses.len(), "gradebook loaded");
            Ok(snapshot)
        }
        None => {
            info!("no gradebook configured; serving the demo gradebook");
            demo_gradebook()
        }
    }
}

pub(crate) fn build_service(
    snapshot: GradebookSnapshot,
    policy: GradingPolicy,
) -> (Arc<GradebookService>, Arc<SharedGradebook>) {
    let repository = Arc::new(SharedGradebook::new(snapshot));
    let service = Arc::new(GradingService::new(repository.clone(), policy));
    (service, repository)
}

pub(crate) fn parse_formula(raw: &str) -> Result<LoFormula, String> {
    raw.parse::<LoFormula>().map_err(|err| err.to_string())
}

/// Two-decimal rendering with null shown as pending.
pub(crate) fn display_value(value: Option<Decimal>) -> String {
    match value {
        Some(value) => format!("{value:.2}"),
        None => "not yet available".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_gradebook_parses() {
        let snapshot = demo_gradebook().expect("demo gradebook parses");
        assert_eq!(snapshot.courses.len(), 2);
        assert!(!snapshot.department_contributions.is_empty());
    }

    #[test]
    fn renders_missing_values_as_pending() {
        assert_eq!(display_value(None), "not yet available");
        assert_eq!(display_value(Some(Decimal::new(745, 1))), "74.50");
    }

    #[test]
    fn formula_parser_reports_unknown_names() {
        assert_eq!(parse_formula("legacy"), Ok(LoFormula::LegacyNormalized));
        assert!(parse_formula("median").is_err());
    }
}
