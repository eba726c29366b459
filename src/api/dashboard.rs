use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::Identity;
use crate::db::{repository, users};
use crate::error::AppError;
use crate::models::*;
use crate::services::{GradeSeries, Summary, TimeRange, grade_series, summarize};
use crate::state::AppState;

#[derive(Serialize)]
pub(super) struct DashboardSummary {
    #[serde(flatten)]
    summary: Summary,
    current_semester: Option<Semester>,
}

#[derive(Deserialize)]
pub(super) struct SeriesParams {
    #[serde(default)]
    range: TimeRange,
}

async fn snapshot(state: &AppState, identity: Identity) -> Result<(Vec<Assignment>, Vec<Semester>), AppError> {
    match identity.0 {
        Some(user_id) => Ok((
            repository::fetch_assignments(&state.db, &user_id).await?,
            users::fetch_semesters(&state.db, &user_id).await?,
        )),
        None => Ok((Vec::new(), Vec::new())),
    }
}

pub(super) async fn summary(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<DashboardSummary>, AppError> {
    let (assignments, semesters) = snapshot(&state, identity).await?;
    let now = Utc::now();

    let summary = summarize(&assignments, now);
    debug!(
        "summary over {} assignments ({} graded)",
        assignments.len(),
        summary.graded_count
    );

    Ok(Json(DashboardSummary {
        summary,
        current_semester: current_semester(&semesters, now).cloned(),
    }))
}

pub(super) async fn series(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<SeriesParams>,
) -> Result<Json<GradeSeries>, AppError> {
    let (assignments, _) = snapshot(&state, identity).await?;

    let mut series = grade_series(&assignments, state.config.utc_offset);
    series.points = params.range.apply(series.points);
    Ok(Json(series))
}
