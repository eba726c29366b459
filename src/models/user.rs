use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::models::Semester;
use crate::models::assignment::require_text;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub semesters: Vec<Semester>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// JSON-encoded `Vec<Semester>`.
    pub semesters: String,
    pub created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            semesters: serde_json::from_str(&row.semesters)?,
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("name", &self.name)
    }
}
