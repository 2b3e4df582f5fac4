//! Typed representation of the solver's generated statistics report.
//!
//! Constructed fresh per parse call and immutable once returned. Row
//! sequences keep document order: the solver's own grouping (year level,
//! then group, then subgroup) is semantically meaningful for display and
//! cross-checking.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An inclusive numeric range decoded from a report cell.
///
/// A cell holding a single number decodes to `min == max`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn scalar(value: f64) -> Self {
        Bounds {
            min: value,
            max: value,
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.min == self.max
    }
}

/// Report header block: who generated the report and for which school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub institution_name: String,
    /// Generator name and version as printed, e.g. "FET 6.2.5".
    pub generated_with: Option<String>,
    pub generated_at: Option<NaiveDateTime>,
}

/// The "Overall" statistics row: hours per week across all groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-year-level row: ranged hours and gaps per week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearLevelRow {
    pub year: String,
    pub hours_per_week: Option<Bounds>,
    pub gaps_per_week: Option<Bounds>,
}

/// Per-group row, same shape as [`YearLevelRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub group: String,
    pub hours_per_week: Option<Bounds>,
    pub gaps_per_week: Option<Bounds>,
}

/// Per-subgroup row: scalar hours per week and total gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgroupRow {
    pub subgroup: String,
    pub hours_per_week: Option<f64>,
    pub total_gaps: Option<f64>,
}

/// Fully decoded statistics report.
///
/// `partial` is set when an optional section was truncated by an
/// ellipsis row or skipped because its layout was unrecognized; callers
/// decide whether a partial report is acceptable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub metadata: ReportMetadata,
    pub overall: OverallStats,
    pub year_levels: Vec<YearLevelRow>,
    pub groups: Vec<GroupRow>,
    pub subgroups: Vec<SubgroupRow>,
    pub partial: bool,
}
