use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::assignment::{millis_field, require_text};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    pub id: String,
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_date: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Semester {
    /// Inclusive on both ends.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }
}

/// The first semester containing `now`. Overlaps resolve to list order.
pub fn current_semester(semesters: &[Semester], now: DateTime<Utc>) -> Option<&Semester> {
    semesters.iter().find(|s| s.contains(now))
}

fn check_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::BadRequest(
            "end_date must be after start_date".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSemesterRequest {
    /// Client-generated token; one is generated when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub start_date: i64,
    pub end_date: i64,
}

impl NewSemesterRequest {
    pub fn into_semester(self, now: DateTime<Utc>) -> Result<Semester, AppError> {
        require_text("name", &self.name)?;
        if let Some(id) = &self.id {
            require_text("id", id)?;
        }
        let start_date = millis_field("start_date", self.start_date)?;
        let end_date = millis_field("end_date", self.end_date)?;
        check_range(start_date, end_date)?;

        Ok(Semester {
            id: self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: self.name,
            start_date,
            end_date,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSemesterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<i64>,
    #[serde(default)]
    pub end_date: Option<i64>,
}

impl UpdateSemesterRequest {
    /// Applies the patch; the merged range must still be ordered.
    pub fn apply_to(&self, semester: &mut Semester) -> Result<(), AppError> {
        let mut updated = semester.clone();
        if let Some(name) = &self.name {
            require_text("name", name)?;
            updated.name = name.clone();
        }
        if let Some(start) = self.start_date {
            updated.start_date = millis_field("start_date", start)?;
        }
        if let Some(end) = self.end_date {
            updated.end_date = millis_field("end_date", end)?;
        }
        check_range(updated.start_date, updated.end_date)?;
        *semester = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn semester(id: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> Semester {
        Semester {
            id: id.to_string(),
            name: id.to_string(),
            start_date: Utc.with_ymd_and_hms(start.0, start.1, start.2, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(end.0, end.1, end.2, 0, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_current_semester_picks_first_overlap() {
        let list = vec![
            semester("fall", (2024, 8, 20), (2024, 12, 20)),
            semester("fall-b", (2024, 10, 1), (2025, 1, 15)),
        ];
        let now = Utc.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap();
        assert_eq!(current_semester(&list, now).map(|s| s.id.as_str()), Some("fall"));

        let later = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(current_semester(&list, later).map(|s| s.id.as_str()), Some("fall-b"));

        let summer = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert!(current_semester(&list, summer).is_none());
    }

    #[test]
    fn test_new_semester_requires_ordered_dates() {
        let req = NewSemesterRequest {
            id: None,
            name: "Spring".to_string(),
            start_date: 1_710_000_000_000,
            end_date: 1_710_000_000_000,
        };
        assert!(matches!(req.into_semester(Utc::now()), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_update_keeps_stored_values_on_invalid_range() {
        let mut s = semester("spring", (2025, 1, 10), (2025, 5, 10));
        let before = s.clone();
        let patch = UpdateSemesterRequest {
            name: Some("Spring 2025".to_string()),
            start_date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap().timestamp_millis()),
            end_date: None,
        };
        assert!(patch.apply_to(&mut s).is_err());
        assert_eq!(s, before);
    }
}
