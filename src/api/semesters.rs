use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use tracing::info;

use crate::auth::Identity;
use crate::db::users;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub(super) async fn list_semesters(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Semester>>, AppError> {
    let Some(user_id) = identity.0 else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(users::fetch_semesters(&state.db, &user_id).await?))
}

pub(super) async fn current(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Option<Semester>>, AppError> {
    let Some(user_id) = identity.0 else {
        return Ok(Json(None));
    };
    let semesters = users::fetch_semesters(&state.db, &user_id).await?;
    Ok(Json(current_semester(&semesters, Utc::now()).cloned()))
}

pub(super) async fn add_semester(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<NewSemesterRequest>,
) -> Result<Json<Semester>, AppError> {
    let user_id = identity.require()?;
    let semester = req.into_semester(Utc::now())?;

    let added = users::modify_semesters(&state.db, &user_id, |list| {
        if list.iter().any(|s| s.id == semester.id) {
            return Err(AppError::Conflict(format!(
                "semester {} already exists",
                semester.id
            )));
        }
        list.push(semester.clone());
        Ok(semester)
    })
    .await?;

    info!("semester {:?} added for user {}", added.name, user_id);
    Ok(Json(added))
}

pub(super) async fn update_semester(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateSemesterRequest>,
) -> Result<Json<Semester>, AppError> {
    let user_id = identity.require()?;

    let updated = users::modify_semesters(&state.db, &user_id, |list| {
        let semester = list
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AppError::NotFound)?;
        req.apply_to(semester)?;
        Ok(semester.clone())
    })
    .await?;

    Ok(Json(updated))
}

pub(super) async fn remove_semester(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = identity.require()?;

    users::modify_semesters(&state.db, &user_id, |list| {
        let before = list.len();
        list.retain(|s| s.id != id);
        if list.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
