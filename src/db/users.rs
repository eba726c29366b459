use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::user::UserRow;
use crate::models::{Semester, User};

/// Records an identity the first time the auth provider hands it to us.
pub async fn ensure_user(
    db: &SqlitePool,
    id: &str,
    email: Option<&str>,
    name: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, semesters, created_at)
        VALUES (?1, ?2, ?3, '[]', ?4)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(Utc::now().timestamp_millis())
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find_user(db: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, semesters, created_at FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    row.map(User::try_from).transpose()
}

pub async fn update_user_name(db: &SqlitePool, id: &str, name: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET name = ?1 WHERE id = ?2")
        .bind(name)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_semesters(db: &SqlitePool, user_id: &str) -> Result<Vec<Semester>, AppError> {
    let stored: Option<String> = sqlx::query_scalar("SELECT semesters FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    match stored {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

/// Read-modify-write of the semester list inside one transaction.
///
/// The closure sees the whole list; whatever it leaves behind replaces the
/// stored list. An error from the closure rolls everything back.
pub async fn modify_semesters<T, F>(db: &SqlitePool, user_id: &str, change: F) -> Result<T, AppError>
where
    F: FnOnce(&mut Vec<Semester>) -> Result<T, AppError>,
{
    let mut tx = db.begin().await?;

    let stored: Option<String> = sqlx::query_scalar("SELECT semesters FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    let mut semesters: Vec<Semester> = match stored {
        Some(json) => serde_json::from_str(&json)?,
        None => return Err(AppError::NotFound),
    };

    let output = change(&mut semesters)?;

    sqlx::query("UPDATE users SET semesters = ?1 WHERE id = ?2")
        .bind(serde_json::to_string(&semesters)?)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(output)
}
