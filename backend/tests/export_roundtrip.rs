mod support;

use fet_bridge::config::TimetableConfig;
use fet_bridge::export::{document_checksum, export, ExportMode};
use fet_bridge::models::{
    build_activities, ActivityId, Allocation, BaseConstraint, SpaceConstraint, TimeConstraint,
    TimeSlot,
};
use support::parse_document;

fn allocation(teacher: &str, subject: &str, students: &str, duration: u32, per_week: u32) -> Allocation {
    Allocation {
        teacher: Some(teacher.to_string()),
        subject: Some(subject.to_string()),
        students: students.to_string(),
        duration: Some(duration),
        periods_per_week: per_week,
    }
}

fn config() -> TimetableConfig {
    TimetableConfig {
        institution_name: "Example School".to_string(),
        comments: None,
        days: ["Monday", "Tuesday", "Wednesday"]
            .iter()
            .map(|d| d.to_string())
            .collect(),
        periods_per_day: 6,
    }
}

fn sample_constraints() -> (Vec<TimeConstraint>, Vec<SpaceConstraint>) {
    let time = vec![
        TimeConstraint::BasicCompulsoryTime {
            base: BaseConstraint::hard(),
        },
        TimeConstraint::TeacherNotAvailableTimes {
            base: BaseConstraint::hard(),
            teacher: "T1".to_string(),
            not_available_times: vec![TimeSlot { day: 0, hour: 5 }],
        },
        TimeConstraint::ActivityPreferredStartingTime {
            base: BaseConstraint::weighted(90),
            activity_id: ActivityId::new(1),
            preferred_day: 2,
            preferred_hour: 0,
            permanently_locked: Some(false),
        },
    ];
    let space = vec![
        SpaceConstraint::BasicCompulsorySpace {
            base: BaseConstraint::hard(),
        },
        SpaceConstraint::ActivityPreferredRoom {
            base: BaseConstraint::hard(),
            activity_id: ActivityId::new(2),
            room: "Lab A".to_string(),
        },
    ];
    (time, space)
}

#[test]
fn test_roundtrip_preserves_activities_and_constraint_kinds() {
    let activities = build_activities(&[
        allocation("T1", "Maths", "1A", 2, 4),
        allocation("T2", "History", "1B", 1, 3),
    ])
    .unwrap();
    let (time, space) = sample_constraints();

    let out = export(&activities, &time, &space, ExportMode::Strict, &config()).unwrap();
    let doc = parse_document(&out.document);

    assert_eq!(doc.institution, "Example School");
    assert_eq!(doc.days, vec!["Monday", "Tuesday", "Wednesday"]);
    assert_eq!(doc.activities, activities);
    assert_eq!(
        doc.time_constraint_tags,
        vec![
            "ConstraintBasicCompulsoryTime",
            "ConstraintTeacherNotAvailableTimes",
            "ConstraintActivityPreferredStartingTime",
        ]
    );
    assert_eq!(
        doc.space_constraint_tags,
        vec![
            "ConstraintBasicCompulsorySpace",
            "ConstraintActivityPreferredRoom",
        ]
    );
}

#[test]
fn test_roundtrip_activity_order_is_id_order_regardless_of_input() {
    let mut activities = build_activities(&[
        allocation("T1", "Maths", "1A", 1, 2),
        allocation("T2", "History", "1B", 1, 1),
    ])
    .unwrap();
    activities.reverse();

    let out = export(&activities, &[], &[], ExportMode::Strict, &config()).unwrap();
    let doc = parse_document(&out.document);

    let ids: Vec<i64> = doc.activities.iter().map(|a| a.id.value()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_checksum_matches_document() {
    let activities = build_activities(&[allocation("T1", "Maths", "1A", 1, 1)]).unwrap();
    let out = export(&activities, &[], &[], ExportMode::Strict, &config()).unwrap();

    assert_eq!(out.checksum, document_checksum(&out.document));
    assert_eq!(out.checksum.len(), 64);
    assert!(out.checksum.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_lenient_export_omits_only_the_invalid_constraint() {
    let activities = build_activities(&[allocation("T1", "Maths", "1A", 1, 1)]).unwrap();
    let (mut time, space) = sample_constraints();
    time.insert(
        1,
        TimeConstraint::TeacherMaxDaysPerWeek {
            base: BaseConstraint::hard(),
            teacher: "T1".to_string(),
            max_days_per_week: 0,
        },
    );

    let out = export(&activities, &time, &space, ExportMode::Lenient, &config()).unwrap();
    let doc = parse_document(&out.document);

    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].kind, "TeacherMaxDaysPerWeek");
    assert!(!doc
        .time_constraint_tags
        .iter()
        .any(|t| t == "ConstraintTeacherMaxDaysPerWeek"));
    assert_eq!(doc.time_constraint_tags.len(), 3);
    assert_eq!(doc.space_constraint_tags.len(), 2);
}

#[test]
fn test_escaped_names_survive_the_roundtrip() {
    let activities = build_activities(&[allocation(
        "Smith & Jones",
        "Physics <advanced>",
        "1A",
        1,
        1,
    )])
    .unwrap();

    let out = export(&activities, &[], &[], ExportMode::Strict, &config()).unwrap();
    let doc = parse_document(&out.document);

    assert_eq!(doc.activities[0].teacher, "Smith & Jones");
    assert_eq!(doc.activities[0].subject, "Physics <advanced>");
}
