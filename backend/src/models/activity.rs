//! Schedulable activities and their construction from teaching allocations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of an activity, unique per timetable and stable across
/// exports. Constraints reference activities through this id.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ActivityId(pub i64);

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ActivityId {
    pub fn new(value: i64) -> Self {
        ActivityId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// One atomic schedulable teaching unit: a teacher meets a student group
/// for a subject, for `duration` consecutive periods.
///
/// `total_duration` is the number of periods per week across all split
/// activities of the same allocation; it is always a positive multiple of
/// `duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub teacher: String,
    pub subject: String,
    pub students: String,
    pub duration: u32,
    pub total_duration: u32,
}

/// A subject offering as it comes out of the persistence layer: which
/// teacher teaches which subject to which group, and how the weekly
/// periods are split into lessons.
///
/// `teacher`, `subject` and `duration` are optional because they arrive
/// from nullable joins; [`build_activities`] rejects allocations where
/// any of them is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub teacher: Option<String>,
    pub subject: Option<String>,
    pub students: String,
    /// Length of a single lesson, in periods.
    pub duration: Option<u32>,
    /// Total periods per week for this allocation.
    pub periods_per_week: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivityError {
    #[error("allocation {index} is missing required field '{field}'")]
    InvalidAllocation { index: usize, field: &'static str },

    #[error(
        "allocation {index}: {periods_per_week} periods per week is not a \
         positive multiple of lesson duration {duration}"
    )]
    InvalidSplit {
        index: usize,
        duration: u32,
        periods_per_week: u32,
    },
}

/// Convert teaching allocations into the solver's activity list.
///
/// Each allocation yields `periods_per_week / duration` activities, one
/// per weekly lesson, all sharing the same `total_duration`. Ids are
/// assigned sequentially starting from 1 in allocation order, so the
/// result is sorted ascending by id and the export output is diffable
/// across runs.
///
/// Pure function of its input; fails on the first invalid allocation.
pub fn build_activities(allocations: &[Allocation]) -> Result<Vec<Activity>, ActivityError> {
    let mut activities = Vec::new();
    let mut next_id: i64 = 1;

    for (index, allocation) in allocations.iter().enumerate() {
        let teacher = match allocation.teacher.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                return Err(ActivityError::InvalidAllocation {
                    index,
                    field: "teacher",
                })
            }
        };
        let subject = match allocation.subject.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => {
                return Err(ActivityError::InvalidAllocation {
                    index,
                    field: "subject",
                })
            }
        };
        let duration = match allocation.duration {
            Some(d) if d > 0 => d,
            _ => {
                return Err(ActivityError::InvalidAllocation {
                    index,
                    field: "duration",
                })
            }
        };

        let total = allocation.periods_per_week;
        if total == 0 || total % duration != 0 {
            return Err(ActivityError::InvalidSplit {
                index,
                duration,
                periods_per_week: total,
            });
        }

        for _ in 0..(total / duration) {
            activities.push(Activity {
                id: ActivityId::new(next_id),
                teacher: teacher.to_string(),
                subject: subject.to_string(),
                students: allocation.students.clone(),
                duration,
                total_duration: total,
            });
            next_id += 1;
        }
    }

    log::debug!(
        "built {} activities from {} allocations",
        activities.len(),
        allocations.len()
    );
    Ok(activities)
}
