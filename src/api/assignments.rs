use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::*;
use crate::services::{AssignmentService, AssignmentView, ViewClock, ViewCounts};
use crate::state::AppState;

#[derive(Deserialize)]
pub(super) struct ListParams {
    #[serde(default)]
    view: AssignmentView,
}

pub(super) async fn list_assignments(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Assignment>>, AppError> {
    let Some(user_id) = identity.0 else {
        return Ok(Json(Vec::new()));
    };
    let assignments = AssignmentService::new(state.db).list(&user_id).await?;
    let clock = ViewClock::new(Utc::now(), state.config.utc_offset);
    Ok(Json(clock.filter(params.view, assignments)))
}

pub(super) async fn count_assignments(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ViewCounts>, AppError> {
    let assignments = match identity.0 {
        Some(user_id) => AssignmentService::new(state.db).list(&user_id).await?,
        None => Vec::new(),
    };
    let clock = ViewClock::new(Utc::now(), state.config.utc_offset);
    Ok(Json(clock.counts(&assignments)))
}

pub(super) async fn create_assignment(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<NewAssignmentRequest>,
) -> Result<Json<Assignment>, AppError> {
    let user_id = identity.require()?;
    let assignment = AssignmentService::new(state.db).add(&user_id, req).await?;
    Ok(Json(assignment))
}

pub(super) async fn update_assignment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateAssignmentRequest>,
) -> Result<Json<Assignment>, AppError> {
    let user_id = identity.require()?;
    let assignment = AssignmentService::new(state.db)
        .update(&user_id, &id, &req)
        .await?;
    Ok(Json(assignment))
}

pub(super) async fn remove_assignment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = identity.require()?;
    AssignmentService::new(state.db).remove(&user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
