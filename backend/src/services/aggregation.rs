//! Consistency checks between exported activities and parsed reports.
//!
//! The solver's statistics are recomputed locally from the activity
//! list, then compared field by field against the numbers the report
//! claims. A mismatch beyond the tolerance points at either a corrupted
//! report or an export that diverged from what the solver actually ran.

use crate::models::activity::{Activity, Allocation};
use crate::models::report::StatisticsReport;
use std::collections::BTreeMap;

/// Tolerance for float comparisons against report values, which are
/// printed with two decimals at most.
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Statistics recomputed from the activity list.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedStats {
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Weekly hours per students group, sorted by group name.
    pub hours_per_group: Vec<(String, f64)>,
}

/// One field where the report disagrees with the recomputed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Discrepancy {
    pub field: String,
    pub expected: f64,
    pub actual: f64,
}

/// Recompute per-group weekly hours and their overall distribution.
///
/// Allocations define the group universe: a group that ended up with no
/// activities still appears, with zero hours, so a report silently
/// dropping it is caught by [`compare`].
pub fn compute_expected(activities: &[Activity], allocations: &[Allocation]) -> ExpectedStats {
    let mut hours: BTreeMap<String, f64> = allocations
        .iter()
        .map(|allocation| (allocation.students.clone(), 0.0))
        .collect();
    for activity in activities {
        *hours.entry(activity.students.clone()).or_insert(0.0) += f64::from(activity.duration);
    }

    let values: Vec<f64> = hours.values().copied().collect();
    let sum: f64 = values.iter().sum();
    let (average, min, max) = if values.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        (
            sum / values.len() as f64,
            values.iter().copied().fold(f64::INFINITY, f64::min),
            values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    };

    ExpectedStats {
        sum,
        average,
        min,
        max,
        hours_per_group: hours.into_iter().collect(),
    }
}

/// Compare a parsed report against recomputed statistics.
///
/// Checks the overall distribution, scalar subgroup hours by name, and
/// range containment for group rows. Report rows with null values and
/// groups absent from the report are skipped rather than flagged; a
/// partial report legitimately omits rows.
pub fn compare(
    report: &StatisticsReport,
    expected: &ExpectedStats,
    epsilon: f64,
) -> Vec<Discrepancy> {
    fn check(
        discrepancies: &mut Vec<Discrepancy>,
        epsilon: f64,
        field: String,
        expected: f64,
        actual: f64,
    ) {
        if (expected - actual).abs() > epsilon {
            discrepancies.push(Discrepancy {
                field,
                expected,
                actual,
            });
        }
    }

    let mut discrepancies = Vec::new();
    for (field, expected_value, actual) in [
        ("overall.sum", expected.sum, report.overall.sum),
        ("overall.average", expected.average, report.overall.average),
        ("overall.min", expected.min, report.overall.min),
        ("overall.max", expected.max, report.overall.max),
    ] {
        check(
            &mut discrepancies,
            epsilon,
            field.to_string(),
            expected_value,
            actual,
        );
    }

    for (group, expected_hours) in &expected.hours_per_group {
        if let Some(row) = report
            .subgroups
            .iter()
            .find(|row| &row.subgroup == group)
        {
            if let Some(actual) = row.hours_per_week {
                check(
                    &mut discrepancies,
                    epsilon,
                    format!("subgroups.{group}.hours_per_week"),
                    *expected_hours,
                    actual,
                );
            }
        }

        if let Some(row) = report.groups.iter().find(|row| &row.group == group) {
            if let Some(bounds) = &row.hours_per_week {
                if *expected_hours < bounds.min - epsilon || *expected_hours > bounds.max + epsilon
                {
                    // Range rows are checked for containment; report the
                    // nearer bound as the actual value.
                    let nearer = if *expected_hours < bounds.min {
                        bounds.min
                    } else {
                        bounds.max
                    };
                    discrepancies.push(Discrepancy {
                        field: format!("groups.{group}.hours_per_week"),
                        expected: *expected_hours,
                        actual: nearer,
                    });
                }
            }
        }
    }

    if !discrepancies.is_empty() {
        log::warn!(
            "report disagrees with recomputed statistics on {} field(s)",
            discrepancies.len()
        );
    }
    discrepancies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::{build_activities, ActivityId};
    use crate::models::report::{
        Bounds, GroupRow, OverallStats, ReportMetadata, SubgroupRow,
    };

    fn allocation(students: &str, duration: u32, periods: u32) -> Allocation {
        Allocation {
            teacher: Some("T1".to_string()),
            subject: Some("Maths".to_string()),
            students: students.to_string(),
            duration: Some(duration),
            periods_per_week: periods,
        }
    }

    fn report(overall: OverallStats) -> StatisticsReport {
        StatisticsReport {
            metadata: ReportMetadata {
                institution_name: "Example School".to_string(),
                generated_with: None,
                generated_at: None,
            },
            overall,
            year_levels: Vec::new(),
            groups: Vec::new(),
            subgroups: Vec::new(),
            partial: false,
        }
    }

    #[test]
    fn test_compute_expected_per_group_hours() {
        let allocations = vec![
            allocation("1A", 2, 4),
            allocation("1B", 1, 3),
            allocation("1C", 1, 2),
        ];
        // 1C's lessons were dropped upstream; its group must still show
        // up in the expected statistics, at zero hours.
        let activities = build_activities(&allocations[..2]).unwrap();
        let expected = compute_expected(&activities, &allocations);

        assert_eq!(
            expected.hours_per_group,
            vec![
                ("1A".to_string(), 8.0),
                ("1B".to_string(), 3.0),
                // Group with no scheduled activities still appears.
                ("1C".to_string(), 0.0),
            ]
        );
        assert_eq!(expected.sum, 11.0);
        assert!((expected.average - 11.0 / 3.0).abs() < 1e-9);
        assert_eq!(expected.min, 0.0);
        assert_eq!(expected.max, 8.0);
    }

    #[test]
    fn test_compute_expected_empty() {
        let expected = compute_expected(&[], &[]);
        assert_eq!(expected.sum, 0.0);
        assert_eq!(expected.average, 0.0);
        assert!(expected.hours_per_group.is_empty());
    }

    #[test]
    fn test_compare_matches_within_epsilon() {
        let expected = ExpectedStats {
            sum: 11.0,
            average: 5.5,
            min: 3.0,
            max: 8.0,
            hours_per_group: vec![("1A".to_string(), 8.0), ("1B".to_string(), 3.0)],
        };
        let mut parsed = report(OverallStats {
            sum: 11.004,
            average: 5.5,
            min: 3.0,
            max: 8.0,
        });
        parsed.subgroups.push(SubgroupRow {
            subgroup: "1A".to_string(),
            hours_per_week: Some(8.0),
            total_gaps: Some(0.0),
        });
        assert!(compare(&parsed, &expected, DEFAULT_EPSILON).is_empty());
    }

    #[test]
    fn test_compare_flags_overall_mismatch() {
        let expected = ExpectedStats {
            sum: 11.0,
            average: 5.5,
            min: 3.0,
            max: 8.0,
            hours_per_group: Vec::new(),
        };
        let parsed = report(OverallStats {
            sum: 13.0,
            average: 5.5,
            min: 3.0,
            max: 8.0,
        });
        let discrepancies = compare(&parsed, &expected, DEFAULT_EPSILON);
        assert_eq!(discrepancies.len(), 1);
        assert_eq!(discrepancies[0].field, "overall.sum");
        assert_eq!(discrepancies[0].expected, 11.0);
        assert_eq!(discrepancies[0].actual, 13.0);
    }

    #[test]
    fn test_compare_checks_group_range_containment() {
        let expected = ExpectedStats {
            sum: 8.0,
            average: 8.0,
            min: 8.0,
            max: 8.0,
            hours_per_group: vec![("1A".to_string(), 8.0)],
        };
        let mut parsed = report(OverallStats {
            sum: 8.0,
            average: 8.0,
            min: 8.0,
            max: 8.0,
        });
        parsed.groups.push(GroupRow {
            group: "1A".to_string(),
            hours_per_week: Some(Bounds {
                min: 6.0,
                max: 7.0,
            }),
            gaps_per_week: None,
        });
        let discrepancies = compare(&parsed, &expected, DEFAULT_EPSILON);
        assert_eq!(discrepancies.len(), 1);
        assert_eq!(discrepancies[0].field, "groups.1A.hours_per_week");
        assert_eq!(discrepancies[0].actual, 7.0);

        // Inside the range there is nothing to flag.
        parsed.groups[0].hours_per_week = Some(Bounds {
            min: 7.0,
            max: 9.0,
        });
        assert!(compare(&parsed, &expected, DEFAULT_EPSILON).is_empty());
    }

    #[test]
    fn test_compare_ignores_null_rows_and_missing_groups() {
        let expected = ExpectedStats {
            sum: 8.0,
            average: 8.0,
            min: 8.0,
            max: 8.0,
            hours_per_group: vec![("1A".to_string(), 8.0), ("1B".to_string(), 8.0)],
        };
        let mut parsed = report(OverallStats {
            sum: 8.0,
            average: 8.0,
            min: 8.0,
            max: 8.0,
        });
        parsed.subgroups.push(SubgroupRow {
            subgroup: "1A".to_string(),
            hours_per_week: None,
            total_gaps: None,
        });
        assert!(compare(&parsed, &expected, DEFAULT_EPSILON).is_empty());
    }

    #[test]
    fn test_activity_ids_are_stable_inputs() {
        let allocations = vec![allocation("1A", 1, 2)];
        let activities = build_activities(&allocations).unwrap();
        assert_eq!(activities[0].id, ActivityId::new(1));
        assert_eq!(activities[1].id, ActivityId::new(2));
    }
}
