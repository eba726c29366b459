mod assignments;
mod dashboard;
mod preferences;
mod semesters;
mod users;

use axum::routing::{get, patch};
use axum::{Router, extract::State, http::StatusCode};

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/me", get(users::viewer).patch(users::update_name))
        .route(
            "/assignments",
            get(assignments::list_assignments).post(assignments::create_assignment),
        )
        .route("/assignments/counts", get(assignments::count_assignments))
        .route(
            "/assignments/{id}",
            patch(assignments::update_assignment).delete(assignments::remove_assignment),
        )
        .route(
            "/classes",
            get(preferences::list_classes).post(preferences::add_class),
        )
        .route(
            "/classes/{id}",
            patch(preferences::update_class).delete(preferences::remove_class),
        )
        .route("/types", get(preferences::list_types).post(preferences::add_type))
        .route(
            "/types/{id}",
            patch(preferences::update_type).delete(preferences::remove_type),
        )
        .route(
            "/semesters",
            get(semesters::list_semesters).post(semesters::add_semester),
        )
        .route("/semesters/current", get(semesters::current))
        .route(
            "/semesters/{id}",
            patch(semesters::update_semester).delete(semesters::remove_semester),
        )
        .route("/dashboard/summary", get(dashboard::summary))
        .route("/dashboard/series", get(dashboard::series))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
