use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use crate::auth::Identity;
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

async fn list(state: AppState, identity: Identity, kind: PreferenceKind) -> Result<Json<Vec<Preference>>, AppError> {
    let Some(user_id) = identity.0 else {
        return Ok(Json(Vec::new()));
    };
    let entries = repository::fetch_preferences(&state.db, kind, &user_id).await?;
    Ok(Json(entries))
}

async fn add(
    state: AppState,
    identity: Identity,
    kind: PreferenceKind,
    req: PreferenceRequest,
) -> Result<Json<Preference>, AppError> {
    let user_id = identity.require()?;
    req.validate()?;
    let created = repository::insert_preference(&state.db, kind, &user_id, req.name.trim()).await?;
    info!("{} {:?} added for user {}", kind.label(), created.name, user_id);
    Ok(Json(created))
}

async fn rename(
    state: AppState,
    identity: Identity,
    kind: PreferenceKind,
    id: String,
    req: PreferenceRequest,
) -> Result<Json<Preference>, AppError> {
    let user_id = identity.require()?;
    req.validate()?;
    let updated = repository::rename_preference(&state.db, kind, &user_id, &id, req.name.trim())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

/// Assignments that use the name keep their copy of it.
async fn remove(
    state: AppState,
    identity: Identity,
    kind: PreferenceKind,
    id: String,
) -> Result<StatusCode, AppError> {
    let user_id = identity.require()?;
    if repository::delete_preference(&state.db, kind, &user_id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub(super) async fn list_classes(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Preference>>, AppError> {
    list(state, identity, PreferenceKind::Class).await
}

pub(super) async fn add_class(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<PreferenceRequest>,
) -> Result<Json<Preference>, AppError> {
    add(state, identity, PreferenceKind::Class, req).await
}

pub(super) async fn update_class(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<PreferenceRequest>,
) -> Result<Json<Preference>, AppError> {
    rename(state, identity, PreferenceKind::Class, id, req).await
}

pub(super) async fn remove_class(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove(state, identity, PreferenceKind::Class, id).await
}

pub(super) async fn list_types(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Preference>>, AppError> {
    list(state, identity, PreferenceKind::Type).await
}

pub(super) async fn add_type(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<PreferenceRequest>,
) -> Result<Json<Preference>, AppError> {
    add(state, identity, PreferenceKind::Type, req).await
}

pub(super) async fn update_type(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<PreferenceRequest>,
) -> Result<Json<Preference>, AppError> {
    rename(state, identity, PreferenceKind::Type, id, req).await
}

pub(super) async fn remove_type(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove(state, identity, PreferenceKind::Type, id).await
}
