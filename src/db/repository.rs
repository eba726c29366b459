use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::assignment::{AssignmentRow, date_to_storage, grade_to_storage};
use crate::models::{Assignment, Preference, PreferenceKind};

const ASSIGNMENT_COLUMNS: &str = "id, user_id, assignment, type AS kind, status, target, received, \
     class, due_date, submitted_date, created_at";

pub async fn fetch_assignments(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<Assignment>, AppError> {
    let sql = format!(
        "SELECT {} FROM assignments WHERE user_id = ?1 ORDER BY created_at ASC, rowid ASC",
        ASSIGNMENT_COLUMNS
    );
    let rows = sqlx::query_as::<_, AssignmentRow>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;

    rows.into_iter().map(Assignment::try_from).collect()
}

/// Only returns the assignment when it belongs to `user_id`.
pub async fn find_assignment(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Assignment>, AppError> {
    let sql = format!(
        "SELECT {} FROM assignments WHERE id = ?1 AND user_id = ?2",
        ASSIGNMENT_COLUMNS
    );
    let row = sqlx::query_as::<_, AssignmentRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    row.map(Assignment::try_from).transpose()
}

pub async fn insert_assignment<'e, E>(db: E, assignment: &Assignment) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO assignments
            (id, user_id, assignment, type, status, target, received,
            class, due_date, submitted_date, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&assignment.id)
    .bind(&assignment.user_id)
    .bind(&assignment.assignment)
    .bind(&assignment.kind)
    .bind(assignment.status.as_str())
    .bind(assignment.target)
    .bind(grade_to_storage(assignment.received))
    .bind(&assignment.class)
    .bind(assignment.due_date.timestamp_millis())
    .bind(date_to_storage(assignment.submitted_date))
    .bind(assignment.created_at.timestamp_millis())
    .execute(db)
    .await?;

    Ok(())
}

/// Writes every mutable column. Returns `false` if no owned row matched.
pub async fn update_assignment(db: &SqlitePool, assignment: &Assignment) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE assignments
        SET assignment = ?1,
            type = ?2,
            status = ?3,
            target = ?4,
            received = ?5,
            class = ?6,
            due_date = ?7,
            submitted_date = ?8
        WHERE id = ?9 AND user_id = ?10
        "#,
    )
    .bind(&assignment.assignment)
    .bind(&assignment.kind)
    .bind(assignment.status.as_str())
    .bind(assignment.target)
    .bind(grade_to_storage(assignment.received))
    .bind(&assignment.class)
    .bind(assignment.due_date.timestamp_millis())
    .bind(date_to_storage(assignment.submitted_date))
    .bind(&assignment.id)
    .bind(&assignment.user_id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_assignment(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignments WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Newest first.
pub async fn fetch_preferences<'e, E>(
    db: E,
    kind: PreferenceKind,
    user_id: &str,
) -> Result<Vec<Preference>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT id, user_id, name, created_at FROM {} WHERE user_id = ?1 \
         ORDER BY created_at DESC, rowid DESC",
        kind.table()
    );
    sqlx::query_as::<_, Preference>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
}

pub async fn insert_preference<'e, E>(
    db: E,
    kind: PreferenceKind,
    user_id: &str,
    name: &str,
) -> Result<Preference, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let preference = Preference {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        created_at: Utc::now().timestamp_millis(),
    };

    let sql = format!(
        "INSERT INTO {} (id, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        kind.table()
    );
    sqlx::query(&sql)
        .bind(&preference.id)
        .bind(&preference.user_id)
        .bind(&preference.name)
        .bind(preference.created_at)
        .execute(db)
        .await?;

    Ok(preference)
}

pub async fn rename_preference(
    db: &SqlitePool,
    kind: PreferenceKind,
    user_id: &str,
    id: &str,
    name: &str,
) -> Result<Option<Preference>, sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET name = ?1 WHERE id = ?2 AND user_id = ?3 \
         RETURNING id, user_id, name, created_at",
        kind.table()
    );
    sqlx::query_as::<_, Preference>(&sql)
        .bind(name)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn delete_preference(
    db: &SqlitePool,
    kind: PreferenceKind,
    user_id: &str,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", kind.table());
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
