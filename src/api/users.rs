use axum::Json;
use axum::extract::State;

use crate::auth::Identity;
use crate::db::users;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub(super) async fn viewer(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Option<User>>, AppError> {
    let Some(user_id) = identity.0 else {
        return Ok(Json(None));
    };
    Ok(Json(users::find_user(&state.db, &user_id).await?))
}

pub(super) async fn update_name(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let user_id = identity.require()?;
    req.validate()?;

    if !users::update_user_name(&state.db, &user_id, req.name.trim()).await? {
        return Err(AppError::NotFound);
    }
    let user = users::find_user(&state.db, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}
