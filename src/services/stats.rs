//! Dashboard statistics over a snapshot of a user's assignments.
//!
//! Everything here is pure: callers pass in `now` and get back a value.
//! Statistics with no sample are reported as not available instead of
//! dividing by zero.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::models::Assignment;

/// Average grade at or above this counts as trending up.
pub const GOOD_AVERAGE: f64 = 85.0;
/// More overdue assignments than this counts as worsening.
pub const OVERDUE_TOLERANCE: usize = 2;
/// Fewer graded assignments than this gives no growth rate.
pub const MIN_TREND_SAMPLE: usize = 4;

/// A statistic and the number of decimals it is reported with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Figure {
    value: Option<f64>,
    decimals: usize,
}

impl Figure {
    pub fn new(value: Option<f64>, decimals: usize) -> Self {
        Self {
            value: value.filter(|v| v.is_finite()),
            decimals,
        }
    }

    pub fn unavailable(decimals: usize) -> Self {
        Self {
            value: None,
            decimals,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_available(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{:.*}", self.decimals, round_half_up(v, self.decimals)),
            None => f.write_str("N/A"),
        }
    }
}

/// Ties round away from zero: 3.125 shows as "3.13".
fn round_half_up(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Serialized as the rounded string, or `null` when unavailable.
impl Serialize for Figure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Some(_) => serializer.serialize_str(&self.to_string()),
            None => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

/// Display-only labels derived from the figures.
///
/// For `overdue`, `Down` means improving (few overdue assignments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trends {
    pub gpa: Direction,
    pub grade: Direction,
    pub overdue: Direction,
    pub growth: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub gpa: Figure,
    pub overdue_count: usize,
    pub average_grade: Figure,
    pub growth_rate: Figure,
    pub graded_count: usize,
    pub trends: Trends,
}

pub fn summarize(assignments: &[Assignment], now: DateTime<Utc>) -> Summary {
    let graded = graded(assignments);
    let average = mean(graded.iter().filter_map(|a| a.received));
    let gpa = average.map(|avg| avg / 100.0 * 4.0);
    let overdue_count = overdue_count(assignments, now);
    let growth = growth_rate(&graded);

    let trends = Trends {
        gpa: match growth {
            Some(g) if g > 0.0 => Direction::Up,
            Some(g) if g < 0.0 => Direction::Down,
            _ => Direction::Flat,
        },
        grade: match average {
            Some(avg) if avg >= GOOD_AVERAGE => Direction::Up,
            Some(_) => Direction::Down,
            None => Direction::Flat,
        },
        overdue: if overdue_count <= OVERDUE_TOLERANCE {
            Direction::Down
        } else {
            Direction::Up
        },
        // No rate yet reads as zero growth.
        growth: match growth {
            Some(g) if g < 0.0 => Direction::Down,
            _ => Direction::Up,
        },
    };

    Summary {
        gpa: Figure::new(gpa, 2),
        overdue_count,
        average_grade: Figure::new(average, 1),
        growth_rate: Figure::new(growth, 1),
        graded_count: graded.len(),
        trends,
    }
}

/// Assignments with a received grade above zero.
pub fn graded(assignments: &[Assignment]) -> Vec<&Assignment> {
    assignments.iter().filter(|a| a.is_graded()).collect()
}

/// Counts every assignment past due and not submitted, graded or not.
pub fn overdue_count(assignments: &[Assignment], now: DateTime<Utc>) -> usize {
    assignments.iter().filter(|a| a.is_overdue(now)).count()
}

/// Percentage change between the older and recent halves of `graded`,
/// ordered by due date.
///
/// Both halves hold `n / 2` (floored) assignments, so with an odd count the
/// middle one is left out.
pub fn growth_rate(graded: &[&Assignment]) -> Option<f64> {
    if graded.len() < MIN_TREND_SAMPLE {
        return None;
    }

    let mut sorted = graded.to_vec();
    sorted.sort_by_key(|a| a.due_date);

    let half = sorted.len() / 2;
    let older = mean(sorted[..half].iter().filter_map(|a| a.received))?;
    let recent = mean(sorted[sorted.len() - half..].iter().filter_map(|a| a.received))?;

    // Unreachable while graded excludes zero grades.
    if older == 0.0 {
        return None;
    }
    Some((recent - older) / older * 100.0)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
