use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::IdentityProvider;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Config,
}
