pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

use crate::auth::HeaderIdentityProvider;
use crate::config::Config;
use crate::state::AppState;

/// Builds the HTTP application around an already migrated pool.
pub fn app(db: SqlitePool, config: Config) -> Router {
    let state = AppState {
        identity: Arc::new(HeaderIdentityProvider::new(db.clone())),
        db,
        config,
    };
    api::router(state)
}
