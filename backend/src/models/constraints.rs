//! The solver's constraint taxonomy.
//!
//! Every constraint is a tagged variant over a closed set of kinds; all
//! variants carry a [`BaseConstraint`] with the weight percentage and
//! active flag. A constraint whose kind tag does not match its populated
//! fields fails validation before export, never silently coerced — see
//! [`crate::models::registry`].

use crate::models::activity::ActivityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A field-level validation failure, with enough context for the caller
/// to re-render and correct the offending form input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Which constraint list a constraint belongs to in the solver document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSide {
    Time,
    Space,
}

impl std::fmt::Display for ConstraintSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintSide::Time => write!(f, "time"),
            ConstraintSide::Space => write!(f, "space"),
        }
    }
}

/// Fields shared by every constraint kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseConstraint {
    /// Solver weight in percent, 0..=100. 100 means hard constraint.
    pub weight_percentage: u8,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl BaseConstraint {
    pub fn hard() -> Self {
        Self {
            weight_percentage: 100,
            active: true,
            comments: None,
        }
    }

    pub fn weighted(weight_percentage: u8) -> Self {
        Self {
            weight_percentage,
            active: true,
            comments: None,
        }
    }
}

/// A single weekly slot. Both coordinates are zero-based: day 0 is the
/// first configured day of the week, hour 0 the first period of the day.
/// The same convention applies on export and when interpreting any
/// echoed values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: u32,
    pub hour: u32,
}

/// Constraints restricting *when* activities may be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TimeConstraint {
    BasicCompulsoryTime {
        #[serde(flatten)]
        base: BaseConstraint,
    },
    StudentsMaxGapsPerWeek {
        #[serde(flatten)]
        base: BaseConstraint,
        max_gaps: u32,
    },
    TeachersMaxGapsPerWeek {
        #[serde(flatten)]
        base: BaseConstraint,
        max_gaps: u32,
    },
    MinDaysBetweenActivities {
        #[serde(flatten)]
        base: BaseConstraint,
        consecutive_if_same_day: bool,
        min_days: u32,
        activity_ids: Vec<ActivityId>,
    },
    TeacherNotAvailableTimes {
        #[serde(flatten)]
        base: BaseConstraint,
        teacher: String,
        not_available_times: Vec<TimeSlot>,
    },
    TeacherMaxDaysPerWeek {
        #[serde(flatten)]
        base: BaseConstraint,
        teacher: String,
        max_days_per_week: u8,
    },
    ActivityPreferredStartingTime {
        #[serde(flatten)]
        base: BaseConstraint,
        activity_id: ActivityId,
        preferred_day: u32,
        preferred_hour: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permanently_locked: Option<bool>,
    },
}

/// Constraints restricting *where* activities may be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SpaceConstraint {
    BasicCompulsorySpace {
        #[serde(flatten)]
        base: BaseConstraint,
    },
    RoomNotAvailableTimes {
        #[serde(flatten)]
        base: BaseConstraint,
        room: String,
        not_available_times: Vec<TimeSlot>,
    },
    ActivityPreferredRoom {
        #[serde(flatten)]
        base: BaseConstraint,
        activity_id: ActivityId,
        room: String,
    },
    SubjectPreferredRoom {
        #[serde(flatten)]
        base: BaseConstraint,
        subject: String,
        room: String,
    },
    SubjectPreferredRooms {
        #[serde(flatten)]
        base: BaseConstraint,
        subject: String,
        rooms: Vec<String>,
    },
}

impl TimeConstraint {
    /// Registry key and serde tag of this constraint. The solver element
    /// name is this string prefixed with `Constraint`.
    pub fn kind(&self) -> &'static str {
        match self {
            TimeConstraint::BasicCompulsoryTime { .. } => "BasicCompulsoryTime",
            TimeConstraint::StudentsMaxGapsPerWeek { .. } => "StudentsMaxGapsPerWeek",
            TimeConstraint::TeachersMaxGapsPerWeek { .. } => "TeachersMaxGapsPerWeek",
            TimeConstraint::MinDaysBetweenActivities { .. } => "MinDaysBetweenActivities",
            TimeConstraint::TeacherNotAvailableTimes { .. } => "TeacherNotAvailableTimes",
            TimeConstraint::TeacherMaxDaysPerWeek { .. } => "TeacherMaxDaysPerWeek",
            TimeConstraint::ActivityPreferredStartingTime { .. } => {
                "ActivityPreferredStartingTime"
            }
        }
    }

    pub fn base(&self) -> &BaseConstraint {
        match self {
            TimeConstraint::BasicCompulsoryTime { base }
            | TimeConstraint::StudentsMaxGapsPerWeek { base, .. }
            | TimeConstraint::TeachersMaxGapsPerWeek { base, .. }
            | TimeConstraint::MinDaysBetweenActivities { base, .. }
            | TimeConstraint::TeacherNotAvailableTimes { base, .. }
            | TimeConstraint::TeacherMaxDaysPerWeek { base, .. }
            | TimeConstraint::ActivityPreferredStartingTime { base, .. } => base,
        }
    }
}

impl SpaceConstraint {
    /// Registry key and serde tag of this constraint. The solver element
    /// name is this string prefixed with `Constraint`.
    pub fn kind(&self) -> &'static str {
        match self {
            SpaceConstraint::BasicCompulsorySpace { .. } => "BasicCompulsorySpace",
            SpaceConstraint::RoomNotAvailableTimes { .. } => "RoomNotAvailableTimes",
            SpaceConstraint::ActivityPreferredRoom { .. } => "ActivityPreferredRoom",
            SpaceConstraint::SubjectPreferredRoom { .. } => "SubjectPreferredRoom",
            SpaceConstraint::SubjectPreferredRooms { .. } => "SubjectPreferredRooms",
        }
    }

    pub fn base(&self) -> &BaseConstraint {
        match self {
            SpaceConstraint::BasicCompulsorySpace { base }
            | SpaceConstraint::RoomNotAvailableTimes { base, .. }
            | SpaceConstraint::ActivityPreferredRoom { base, .. }
            | SpaceConstraint::SubjectPreferredRoom { base, .. }
            | SpaceConstraint::SubjectPreferredRooms { base, .. } => base,
        }
    }
}
