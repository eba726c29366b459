use std::collections::BTreeMap;

use chrono::{Days, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Assignment;

/// One chart point: `total` is the rounded mean received grade and
/// `average` the rounded mean target for assignments due that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub total: i64,
    pub average: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSeries {
    /// True when `points` is the built-in preview rather than real grades.
    pub sample: bool,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[default]
    #[serde(rename = "90d")]
    MarkingPeriod,
}

impl TimeRange {
    pub fn days(self) -> u64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::MarkingPeriod => 90,
        }
    }

    /// Keeps points on or after the last point's date minus the range.
    pub fn apply(self, points: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
        let Some(reference) = points.iter().map(|p| p.date).max() else {
            return points;
        };
        let Some(start) = reference.checked_sub_days(Days::new(self.days())) else {
            return points;
        };
        points.into_iter().filter(|p| p.date >= start).collect()
    }
}

/// Buckets graded assignments by the local calendar date they are due.
///
/// Falls back to the sample series when nothing is graded.
pub fn grade_series(assignments: &[Assignment], offset: FixedOffset) -> GradeSeries {
    let mut buckets: BTreeMap<NaiveDate, (f64, f64, u32)> = BTreeMap::new();

    for assignment in assignments.iter().filter(|a| a.is_graded()) {
        let Some(received) = assignment.received else {
            continue;
        };
        let date = assignment.due_date.with_timezone(&offset).date_naive();
        let bucket = buckets.entry(date).or_insert((0.0, 0.0, 0));
        bucket.0 += received;
        bucket.1 += assignment.target;
        bucket.2 += 1;
    }

    if buckets.is_empty() {
        return GradeSeries {
            sample: true,
            points: sample_series(),
        };
    }

    let points = buckets
        .into_iter()
        .map(|(date, (received, target, count))| SeriesPoint {
            date,
            total: (received / count as f64).round() as i64,
            average: (target / count as f64).round() as i64,
        })
        .collect();

    GradeSeries {
        sample: false,
        points,
    }
}

pub fn sample_series() -> Vec<SeriesPoint> {
    SAMPLE
        .iter()
        .filter_map(|&(y, m, d, total, average)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|date| SeriesPoint {
                date,
                total,
                average,
            })
        })
        .collect()
}

const SAMPLE: [(i32, u32, u32, i64, i64); 91] = [
    (2024, 4, 1, 222, 88),
    (2024, 4, 2, 97, 97),
    (2024, 4, 3, 167, 91),
    (2024, 4, 4, 242, 89),
    (2024, 4, 5, 373, 93),
    (2024, 4, 6, 301, 90),
    (2024, 4, 7, 245, 86),
    (2024, 4, 8, 409, 94),
    (2024, 4, 9, 59, 98),
    (2024, 4, 10, 261, 87),
    (2024, 4, 11, 327, 92),
    (2024, 4, 12, 292, 89),
    (2024, 4, 13, 342, 91),
    (2024, 4, 14, 137, 90),
    (2024, 4, 15, 120, 88),
    (2024, 4, 16, 138, 86),
    (2024, 4, 17, 446, 95),
    (2024, 4, 18, 364, 92),
    (2024, 4, 19, 243, 87),
    (2024, 4, 20, 89, 89),
    (2024, 4, 21, 137, 90),
    (2024, 4, 22, 224, 85),
    (2024, 4, 23, 138, 88),
    (2024, 4, 24, 387, 94),
    (2024, 4, 25, 215, 87),
    (2024, 4, 26, 75, 95),
    (2024, 4, 27, 383, 92),
    (2024, 4, 28, 122, 87),
    (2024, 4, 29, 315, 91),
    (2024, 4, 30, 454, 96),
    (2024, 5, 1, 165, 88),
    (2024, 5, 2, 293, 90),
    (2024, 5, 3, 247, 86),
    (2024, 5, 4, 385, 93),
    (2024, 5, 5, 481, 97),
    (2024, 5, 6, 498, 98),
    (2024, 5, 7, 388, 92),
    (2024, 5, 8, 149, 89),
    (2024, 5, 9, 227, 85),
    (2024, 5, 10, 293, 90),
    (2024, 5, 11, 335, 91),
    (2024, 5, 12, 197, 87),
    (2024, 5, 13, 197, 86),
    (2024, 5, 14, 448, 95),
    (2024, 5, 15, 473, 96),
    (2024, 5, 16, 338, 91),
    (2024, 5, 17, 499, 98),
    (2024, 5, 18, 315, 90),
    (2024, 5, 19, 235, 86),
    (2024, 5, 20, 177, 88),
    (2024, 5, 21, 82, 93),
    (2024, 5, 22, 81, 94),
    (2024, 5, 23, 252, 88),
    (2024, 5, 24, 294, 90),
    (2024, 5, 25, 201, 87),
    (2024, 5, 26, 213, 85),
    (2024, 5, 27, 420, 94),
    (2024, 5, 28, 233, 86),
    (2024, 5, 29, 78, 95),
    (2024, 5, 30, 340, 91),
    (2024, 5, 31, 178, 88),
    (2024, 6, 1, 178, 89),
    (2024, 6, 2, 470, 96),
    (2024, 6, 3, 103, 92),
    (2024, 6, 4, 439, 95),
    (2024, 6, 5, 88, 90),
    (2024, 6, 6, 294, 89),
    (2024, 6, 7, 323, 91),
    (2024, 6, 8, 385, 93),
    (2024, 6, 9, 438, 95),
    (2024, 6, 10, 155, 88),
    (2024, 6, 11, 92, 91),
    (2024, 6, 12, 492, 97),
    (2024, 6, 13, 81, 92),
    (2024, 6, 14, 426, 95),
    (2024, 6, 15, 307, 90),
    (2024, 6, 16, 371, 92),
    (2024, 6, 17, 475, 96),
    (2024, 6, 18, 107, 89),
    (2024, 6, 19, 341, 91),
    (2024, 6, 20, 408, 94),
    (2024, 6, 21, 169, 87),
    (2024, 6, 22, 317, 90),
    (2024, 6, 23, 480, 97),
    (2024, 6, 24, 132, 88),
    (2024, 6, 25, 141, 89),
    (2024, 6, 26, 434, 95),
    (2024, 6, 27, 448, 96),
    (2024, 6, 28, 149, 88),
    (2024, 6, 29, 103, 90),
    (2024, 6, 30, 446, 95),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn graded(received: Option<f64>, target: f64, due: DateTime<Utc>) -> Assignment {
        Assignment {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "alice".to_string(),
            assignment: "Quiz".to_string(),
            kind: "Quiz".to_string(),
            status: AssignmentStatus::Done,
            target,
            received,
            class: "History".to_string(),
            due_date: due,
            submitted_date: None,
            created_at: due,
        }
    }

    #[test]
    fn test_same_day_assignments_share_a_bucket() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let list = vec![
            graded(Some(80.0), 85.0, Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()),
            graded(Some(90.0), 95.0, Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).unwrap()),
            graded(Some(70.0), 80.0, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
            graded(None, 80.0, Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap()),
        ];

        let series = grade_series(&list, utc);
        assert!(!series.sample);
        assert_eq!(
            series.points,
            vec![
                SeriesPoint {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    total: 70,
                    average: 80,
                },
                SeriesPoint {
                    date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                    total: 85,
                    average: 90,
                },
            ]
        );
    }

    #[test]
    fn test_bucket_date_follows_the_local_offset() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let list = vec![graded(
            Some(88.0),
            90.0,
            Utc.with_ymd_and_hms(2024, 3, 4, 20, 0, 0).unwrap(),
        )];
        let series = grade_series(&list, tokyo);
        assert_eq!(series.points[0].date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_no_grades_falls_back_to_sample() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let series = grade_series(&[], utc);
        assert!(series.sample);
        assert_eq!(series.points.len(), 91);
        assert_eq!(series.points[0].date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }

    #[test]
    fn test_range_is_relative_to_last_point() {
        let week = TimeRange::Week.apply(sample_series());
        assert_eq!(week.len(), 8);
        assert_eq!(week[0].date, NaiveDate::from_ymd_opt(2024, 6, 23).unwrap());

        let month = TimeRange::Month.apply(sample_series());
        assert_eq!(month.len(), 31);

        assert_eq!(TimeRange::MarkingPeriod.apply(sample_series()).len(), 91);
        assert!(TimeRange::Week.apply(Vec::new()).is_empty());
    }
}
