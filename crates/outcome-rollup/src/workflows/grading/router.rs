use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{CourseId, ScoreEntry, StudentId};
use super::repository::{GradebookRepository, ScoreWriter};
use super::service::{GradingError, GradingService};

/// Router builder exposing score entry and rollup reports over HTTP.
pub fn grading_router<R>(service: Arc<GradingService<R>>) -> Router
where
    R: GradebookRepository + ScoreWriter + 'static,
{
    Router::new()
        .route("/api/v1/scores", post(enter_score_handler::<R>))
        .route("/api/v1/scores/batch", post(enter_scores_handler::<R>))
        .route(
            "/api/v1/students/:student_id/courses",
            get(overview_handler::<R>),
        )
        .route(
            "/api/v1/students/:student_id/courses/:course_id/report",
            get(report_handler::<R>),
        )
        .route(
            "/api/v1/students/:student_id/department-outcomes",
            get(department_outcomes_handler::<R>),
        )
        .route(
            "/api/v1/courses/:course_id/lo-coverage",
            get(lo_coverage_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn enter_score_handler<R>(
    State(service): State<Arc<GradingService<R>>>,
    axum::Json(entry): axum::Json<ScoreEntry>,
) -> Response
where
    R: GradebookRepository + ScoreWriter + 'static,
{
    match service.enter_score(entry) {
        Ok(score) => (StatusCode::CREATED, axum::Json(score)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn enter_scores_handler<R>(
    State(service): State<Arc<GradingService<R>>>,
    axum::Json(entries): axum::Json<Vec<ScoreEntry>>,
) -> Response
where
    R: GradebookRepository + ScoreWriter + 'static,
{
    let outcome = service.enter_scores(entries);
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<GradingService<R>>>,
    Path((student_id, course_id)): Path<(String, String)>,
) -> Response
where
    R: GradebookRepository + ScoreWriter + 'static,
{
    match service.course_report(&StudentId(student_id), &CourseId(course_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn overview_handler<R>(
    State(service): State<Arc<GradingService<R>>>,
    Path(student_id): Path<String>,
) -> Response
where
    R: GradebookRepository + ScoreWriter + 'static,
{
    match service.student_overview(&StudentId(student_id)) {
        Ok(reports) => (StatusCode::OK, axum::Json(reports)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn department_outcomes_handler<R>(
    State(service): State<Arc<GradingService<R>>>,
    Path(student_id): Path<String>,
) -> Response
where
    R: GradebookRepository + ScoreWriter + 'static,
{
    match service.department_outcomes(&StudentId(student_id)) {
        Ok(outcomes) => (StatusCode::OK, axum::Json(outcomes)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn lo_coverage_handler<R>(
    State(service): State<Arc<GradingService<R>>>,
    Path(course_id): Path<String>,
) -> Response
where
    R: GradebookRepository + ScoreWriter + 'static,
{
    match service.lo_coverage(&CourseId(course_id)) {
        Ok(coverage) => (StatusCode::OK, axum::Json(coverage)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn status_for(err: &GradingError) -> StatusCode {
    match err {
        GradingError::NotFound { .. } => StatusCode::NOT_FOUND,
        GradingError::NotEnrolled { .. } => StatusCode::CONFLICT,
        GradingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GradingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: GradingError) -> Response {
    let payload = json!({
        "error": err.to_string(),
    });
    (status_for(&err), axum::Json(payload)).into_response()
}
