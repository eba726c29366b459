use chrono::{Datelike, DateTime, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Assignment, AssignmentStatus};

/// Tabs of the assignment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentView {
    #[default]
    All,
    ThisWeek,
    ThisMonth,
    Late,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewCounts {
    pub all: usize,
    pub this_week: usize,
    pub this_month: usize,
    pub late: usize,
}

/// Half-open `[start, end)` window in local time.
struct Window {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Window {
    fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }

    /// Sunday through Saturday around `today`.
    fn week_of(today: NaiveDate) -> Option<Self> {
        let back = u64::from(today.weekday().num_days_from_sunday());
        let start = today.checked_sub_days(Days::new(back))?;
        let end = start.checked_add_days(Days::new(7))?;
        Some(Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(NaiveTime::MIN),
        })
    }

    fn month_of(today: NaiveDate) -> Option<Self> {
        let start = today.with_day(1)?;
        let end = start.checked_add_months(Months::new(1))?;
        Some(Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(NaiveTime::MIN),
        })
    }
}

/// Evaluates views against a fixed `now` and local offset.
pub struct ViewClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
    week: Option<Window>,
    month: Option<Window>,
}

impl ViewClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let today = now.with_timezone(&offset).date_naive();
        Self {
            now,
            offset,
            week: Window::week_of(today),
            month: Window::month_of(today),
        }
    }

    pub fn matches(&self, view: AssignmentView, assignment: &Assignment) -> bool {
        let due = assignment.due_date.with_timezone(&self.offset).naive_local();
        match view {
            AssignmentView::All => true,
            AssignmentView::ThisWeek => self.week.as_ref().is_some_and(|w| w.contains(due)),
            AssignmentView::ThisMonth => self.month.as_ref().is_some_and(|w| w.contains(due)),
            AssignmentView::Late => assignment.is_overdue(self.now),
        }
    }

    pub fn filter(&self, view: AssignmentView, assignments: Vec<Assignment>) -> Vec<Assignment> {
        assignments
            .into_iter()
            .filter(|a| self.matches(view, a))
            .collect()
    }

    /// Badge numbers per tab. The week badge leaves out finished work,
    /// while the week tab itself still lists it.
    pub fn counts(&self, assignments: &[Assignment]) -> ViewCounts {
        let count = |view| assignments.iter().filter(|a| self.matches(view, a)).count();
        ViewCounts {
            all: assignments.len(),
            this_week: assignments
                .iter()
                .filter(|a| a.status != AssignmentStatus::Done)
                .filter(|a| self.matches(AssignmentView::ThisWeek, a))
                .count(),
            this_month: count(AssignmentView::ThisMonth),
            late: count(AssignmentView::Late),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due(at: DateTime<Utc>, submitted: Option<DateTime<Utc>>) -> Assignment {
        Assignment {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "alice".to_string(),
            assignment: "Reading".to_string(),
            kind: "Homework".to_string(),
            status: AssignmentStatus::NotStarted,
            target: 80.0,
            received: None,
            class: "Literature".to_string(),
            due_date: at,
            submitted_date: submitted,
            created_at: at,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_week_runs_sunday_to_saturday() {
        // Wednesday 2024-05-15.
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap();
        let clock = ViewClock::new(now, utc());

        let sunday = due(Utc.with_ymd_and_hms(2024, 5, 12, 0, 0, 0).unwrap(), None);
        let saturday_night = due(Utc.with_ymd_and_hms(2024, 5, 18, 23, 59, 59).unwrap(), None);
        let next_sunday = due(Utc.with_ymd_and_hms(2024, 5, 19, 0, 0, 0).unwrap(), None);

        assert!(clock.matches(AssignmentView::ThisWeek, &sunday));
        assert!(clock.matches(AssignmentView::ThisWeek, &saturday_night));
        assert!(!clock.matches(AssignmentView::ThisWeek, &next_sunday));
    }

    #[test]
    fn test_month_covers_whole_calendar_month() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 10, 0, 0).unwrap();
        let clock = ViewClock::new(now, utc());

        let leap_day = due(Utc.with_ymd_and_hms(2024, 2, 29, 18, 0, 0).unwrap(), None);
        let march = due(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(), None);
        assert!(clock.matches(AssignmentView::ThisMonth, &leap_day));
        assert!(!clock.matches(AssignmentView::ThisMonth, &march));
    }

    #[test]
    fn test_late_ignores_submitted_work() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap();
        let yesterday = Utc.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap();
        let clock = ViewClock::new(now, utc());

        let list = vec![
            due(yesterday, None),
            due(yesterday, Some(yesterday)),
            due(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(), None),
        ];
        let counts = clock.counts(&list);
        assert_eq!(
            counts,
            ViewCounts {
                all: 3,
                this_week: 2,
                this_month: 2,
                late: 1,
            }
        );
        assert_eq!(clock.filter(AssignmentView::Late, list).len(), 1);
    }

    #[test]
    fn test_week_badge_skips_done_work() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap();
        let tomorrow = Utc.with_ymd_and_hms(2024, 5, 16, 10, 0, 0).unwrap();
        let clock = ViewClock::new(now, utc());

        let mut finished = due(tomorrow, None);
        finished.status = AssignmentStatus::Done;
        let list = vec![finished, due(tomorrow, None)];

        let counts = clock.counts(&list);
        assert_eq!(counts.this_week, 1);
        assert_eq!(counts.this_month, 2);
        assert_eq!(clock.filter(AssignmentView::ThisWeek, list).len(), 2);
    }

    #[test]
    fn test_local_offset_moves_week_boundary() {
        // Saturday 23:30 in UTC is already Sunday in UTC+2.
        let now = Utc.with_ymd_and_hms(2024, 5, 18, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let clock = ViewClock::new(now, plus_two);

        let monday = due(Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap(), None);
        assert!(clock.matches(AssignmentView::ThisWeek, &monday));
    }
}
