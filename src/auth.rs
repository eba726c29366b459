//! Caller identity, as handed over by the upstream auth provider.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use sqlx::SqlitePool;

use crate::db::users;
use crate::error::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the caller's user id, or `None` for anonymous requests.
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<String>, AppError>;
}

/// Trusts identity headers set by a fronting auth proxy and records the
/// user the first time it is seen.
pub struct HeaderIdentityProvider {
    db: SqlitePool,
}

impl HeaderIdentityProvider {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<String>, AppError> {
        let Some(user_id) = header(headers, USER_ID_HEADER) else {
            return Ok(None);
        };

        users::ensure_user(
            &self.db,
            user_id,
            header(headers, USER_EMAIL_HEADER),
            header(headers, USER_NAME_HEADER),
        )
        .await?;

        Ok(Some(user_id.to_string()))
    }
}

/// Resolved caller. Reads treat `None` as "nothing to show"; writes call
/// [`Identity::require`].
#[derive(Debug, Clone)]
pub struct Identity(pub Option<String>);

impl Identity {
    pub fn require(self) -> Result<String, AppError> {
        self.0.ok_or(AppError::Unauthenticated)
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = state.identity.resolve(&parts.headers).await?;
        Ok(Identity(user_id))
    }
}
