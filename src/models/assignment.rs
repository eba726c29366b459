use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Storage encoding for "no grade yet" and "not submitted".
pub const ABSENT: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::NotStarted => "Not Started",
            AssignmentStatus::InProgress => "In Progress",
            AssignmentStatus::Done => "Done",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Started" => Ok(AssignmentStatus::NotStarted),
            "In Progress" => Ok(AssignmentStatus::InProgress),
            "Done" => Ok(AssignmentStatus::Done),
            other => Err(AppError::BadRequest(format!("unknown status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub user_id: String,
    pub assignment: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: AssignmentStatus,
    pub target: f64,
    #[serde(default)]
    pub received: Option<f64>,
    pub class: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub due_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub submitted_date: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Has a grade strictly above zero.
    pub fn is_graded(&self) -> bool {
        matches!(self.received, Some(r) if r > 0.0)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now && self.submitted_date.is_none()
    }
}

/// Row as stored in SQLite, sentinels included.
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRow {
    pub id: String,
    pub user_id: String,
    pub assignment: String,
    pub kind: String,
    pub status: String,
    pub target: f64,
    pub received: f64,
    pub class: String,
    pub due_date: i64,
    pub submitted_date: i64,
    pub created_at: i64,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = AppError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let status: AssignmentStatus = row.status.parse().map_err(|_| {
            tracing::error!("assignment {} has invalid status {:?}", row.id, row.status);
            AppError::InternalServerError
        })?;

        Ok(Assignment {
            status,
            target: row.target,
            received: grade_from_storage(row.received),
            due_date: stored_millis(row.due_date)?,
            submitted_date: if row.submitted_date == ABSENT {
                None
            } else {
                Some(stored_millis(row.submitted_date)?)
            },
            created_at: stored_millis(row.created_at)?,
            id: row.id,
            user_id: row.user_id,
            assignment: row.assignment,
            kind: row.kind,
            class: row.class,
        })
    }
}

pub fn grade_from_storage(value: f64) -> Option<f64> {
    (value >= 0.0).then_some(value)
}

pub fn grade_to_storage(value: Option<f64>) -> f64 {
    value.unwrap_or(ABSENT as f64)
}

pub fn date_to_storage(value: Option<DateTime<Utc>>) -> i64 {
    value.map(|d| d.timestamp_millis()).unwrap_or(ABSENT)
}

fn stored_millis(ms: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(ms).ok_or(AppError::InternalServerError)
}

/// Parse an epoch-millisecond value coming from a request.
pub fn millis_field(field: &str, ms: i64) -> Result<DateTime<Utc>, AppError> {
    if ms < 0 {
        return Err(AppError::BadRequest(format!("{} must be a positive timestamp", field)));
    }
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::BadRequest(format!("{} is out of range", field)))
}

pub fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

fn require_grade(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::BadRequest(format!("{} must be between 0 and 100", field)));
    }
    Ok(())
}

/// Distinguishes a missing field from an explicit `null`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignmentRequest {
    pub assignment: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: AssignmentStatus,
    pub target: f64,
    pub class: String,
    pub due_date: i64,
    #[serde(default)]
    pub received: Option<f64>,
    #[serde(default)]
    pub submitted_date: Option<i64>,
}

impl NewAssignmentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("assignment", &self.assignment)?;
        require_text("type", &self.kind)?;
        require_text("class", &self.class)?;
        require_grade("target", self.target)?;
        if let Some(received) = self.received {
            require_grade("received", received)?;
        }
        millis_field("due_date", self.due_date)?;
        if let Some(submitted) = self.submitted_date {
            millis_field("submitted_date", submitted)?;
        }
        Ok(())
    }
}

/// Partial update. `received` and `submitted_date` accept `null` to clear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAssignmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssignmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub received: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub submitted_date: Option<Option<i64>>,
}

impl UpdateAssignmentRequest {
    pub fn is_empty(&self) -> bool {
        *self == UpdateAssignmentRequest::default()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.assignment {
            require_text("assignment", name)?;
        }
        if let Some(kind) = &self.kind {
            require_text("type", kind)?;
        }
        if let Some(class) = &self.class {
            require_text("class", class)?;
        }
        if let Some(target) = self.target {
            require_grade("target", target)?;
        }
        if let Some(Some(received)) = self.received {
            require_grade("received", received)?;
        }
        if let Some(due_date) = self.due_date {
            millis_field("due_date", due_date)?;
        }
        if let Some(Some(submitted)) = self.submitted_date {
            millis_field("submitted_date", submitted)?;
        }
        Ok(())
    }

    /// Applies the patch onto `current`. Call `validate` first.
    pub fn apply_to(&self, current: &mut Assignment) -> Result<(), AppError> {
        if let Some(name) = &self.assignment {
            current.assignment = name.clone();
        }
        if let Some(kind) = &self.kind {
            current.kind = kind.clone();
        }
        if let Some(status) = self.status {
            current.status = status;
        }
        if let Some(target) = self.target {
            current.target = target;
        }
        if let Some(received) = self.received {
            current.received = received;
        }
        if let Some(class) = &self.class {
            current.class = class.clone();
        }
        if let Some(due_date) = self.due_date {
            current.due_date = millis_field("due_date", due_date)?;
        }
        if let Some(submitted) = self.submitted_date {
            current.submitted_date = submitted
                .map(|ms| millis_field("submitted_date", ms))
                .transpose()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_missing() {
        let cleared: UpdateAssignmentRequest =
            serde_json::from_str(r#"{"received": null}"#).unwrap();
        assert_eq!(cleared.received, Some(None));

        let untouched: UpdateAssignmentRequest =
            serde_json::from_str(r#"{"status": "Done"}"#).unwrap();
        assert_eq!(untouched.received, None);
        assert_eq!(untouched.status, Some(AssignmentStatus::Done));
    }

    #[test]
    fn test_sentinel_converts_to_absent() {
        assert_eq!(grade_from_storage(-1.0), None);
        assert_eq!(grade_from_storage(87.5), Some(87.5));
        assert_eq!(grade_to_storage(None), -1.0);
        assert_eq!(date_to_storage(None), ABSENT);
    }

    #[test]
    fn test_new_request_rejects_out_of_range_target() {
        let req = NewAssignmentRequest {
            assignment: "Essay".to_string(),
            kind: "Homework".to_string(),
            status: AssignmentStatus::NotStarted,
            target: 120.0,
            class: "English".to_string(),
            due_date: 1_700_000_000_000,
            received: None,
            submitted_date: None,
        };
        assert!(matches!(req.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_new_request_rejects_blank_class() {
        let req = NewAssignmentRequest {
            assignment: "Essay".to_string(),
            kind: "Homework".to_string(),
            status: AssignmentStatus::NotStarted,
            target: 90.0,
            class: "   ".to_string(),
            due_date: 1_700_000_000_000,
            received: None,
            submitted_date: None,
        };
        assert!(matches!(req.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_status_uses_display_names_on_the_wire() {
        let json = serde_json::to_string(&AssignmentStatus::InProgress).unwrap();
        assert_eq!(json, r#""In Progress""#);
        assert_eq!("Done".parse::<AssignmentStatus>().unwrap(), AssignmentStatus::Done);
    }
}
