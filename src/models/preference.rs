use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::models::assignment::require_text;

/// Which user-scoped name list a preference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKind {
    Class,
    Type,
}

impl PreferenceKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            PreferenceKind::Class => "user_classes",
            PreferenceKind::Type => "user_types",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PreferenceKind::Class => "class",
            PreferenceKind::Type => "type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Preference {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceRequest {
    pub name: String,
}

impl PreferenceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("name", &self.name)
    }
}
