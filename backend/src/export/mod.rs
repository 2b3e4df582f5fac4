//! Serialization of activities and validated constraints into the
//! solver's input document.
//!
//! The writer is deterministic: activities are ordered by ascending id,
//! constraint order is preserved from the input, and derived name lists
//! are sorted, so two exports of the same data are byte-identical. Every
//! constraint is validated against its registry schema before inclusion;
//! see [`ExportMode`] for how failures are handled.
//!
//! Day and hour fields use the crate-wide zero-based convention (day 0 =
//! first configured day, hour 0 = first period). Booleans serialize as
//! the solver's literal `true`/`false` tokens, numbers as base-10
//! integers.

use crate::config::TimetableConfig;
use crate::models::constraints::{
    BaseConstraint, ConstraintSide, SpaceConstraint, TimeConstraint, TimeSlot,
};
use crate::models::registry;
use crate::models::Activity;
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeSet;
use std::io::Write;
use thiserror::Error;

/// Version token written on the document root element.
pub const FORMAT_VERSION: &str = "6.2.5";

/// How the exporter reacts to a constraint that fails validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExportMode {
    /// The first invalid constraint aborts the whole export.
    Strict,
    /// Invalid constraints are omitted and reported as skipped.
    Lenient,
}

/// A constraint omitted from a lenient export, with enough context for
/// the caller to surface and correct it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedConstraint {
    pub side: ConstraintSide,
    /// Index within the side's input list.
    pub index: usize,
    pub kind: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("a timetable with no activities cannot be exported")]
    EmptyActivityList,

    #[error("invalid {side} constraint {kind} at index {index}: {reason}")]
    InvalidConstraint {
        side: ConstraintSide,
        index: usize,
        kind: String,
        reason: String,
    },

    #[error("failed to serialize constraint for validation: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write solver document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("solver document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// The complete solver input document.
    pub document: String,
    /// SHA-256 of `document`; lets callers detect stale or incomplete
    /// artifacts before feeding them to the solver.
    pub checksum: String,
    /// Constraints omitted in lenient mode; empty in strict mode.
    pub skipped: Vec<SkippedConstraint>,
}

/// Serialize activities plus validated time and space constraints into
/// the solver input document.
///
/// Both the activity list and the constraints are pure inputs; nothing
/// is mutated or persisted here.
pub fn export(
    activities: &[Activity],
    time_constraints: &[TimeConstraint],
    space_constraints: &[SpaceConstraint],
    mode: ExportMode,
    config: &TimetableConfig,
) -> Result<ExportOutput, ExportError> {
    if activities.is_empty() {
        return Err(ExportError::EmptyActivityList);
    }

    let mut skipped = Vec::new();

    let mut valid_time = Vec::with_capacity(time_constraints.len());
    for (index, constraint) in time_constraints.iter().enumerate() {
        let payload = serde_json::to_value(constraint)?;
        match registry::lookup(constraint.kind()).validate(&payload) {
            Ok(()) => valid_time.push(constraint),
            Err(errors) => handle_invalid(
                ConstraintSide::Time,
                index,
                constraint.kind(),
                errors,
                mode,
                &mut skipped,
            )?,
        }
    }

    let mut valid_space = Vec::with_capacity(space_constraints.len());
    for (index, constraint) in space_constraints.iter().enumerate() {
        let payload = serde_json::to_value(constraint)?;
        match registry::lookup(constraint.kind()).validate(&payload) {
            Ok(()) => valid_space.push(constraint),
            Err(errors) => handle_invalid(
                ConstraintSide::Space,
                index,
                constraint.kind(),
                errors,
                mode,
                &mut skipped,
            )?,
        }
    }

    // Stable output order regardless of how the caller assembled the list.
    let mut ordered: Vec<&Activity> = activities.iter().collect();
    ordered.sort_by_key(|a| a.id);

    let document = write_document(&ordered, &valid_time, &valid_space, config)?;
    let checksum = document_checksum(&document);

    log::info!(
        "exported {} activities, {} time and {} space constraints ({} skipped)",
        ordered.len(),
        valid_time.len(),
        valid_space.len(),
        skipped.len()
    );

    Ok(ExportOutput {
        document,
        checksum,
        skipped,
    })
}

/// SHA-256 checksum of a document, hex-encoded.
pub fn document_checksum(document: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(document.as_bytes());
    hex::encode(hasher.finalize())
}

fn handle_invalid(
    side: ConstraintSide,
    index: usize,
    kind: &str,
    errors: Vec<crate::models::constraints::FieldError>,
    mode: ExportMode,
    skipped: &mut Vec<SkippedConstraint>,
) -> Result<(), ExportError> {
    let reason = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    match mode {
        ExportMode::Strict => Err(ExportError::InvalidConstraint {
            side,
            index,
            kind: kind.to_string(),
            reason,
        }),
        ExportMode::Lenient => {
            log::warn!("skipping invalid {side} constraint {kind} at index {index}: {reason}");
            skipped.push(SkippedConstraint {
                side,
                index,
                kind: kind.to_string(),
                reason,
            });
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Document writer
// ---------------------------------------------------------------------------

fn write_document(
    activities: &[&Activity],
    time_constraints: &[&TimeConstraint],
    space_constraints: &[&SpaceConstraint],
    config: &TimetableConfig,
) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer
        .create_element("fet")
        .with_attribute(("version", FORMAT_VERSION))
        .write_inner_content(|w| {
            text_element(w, "Institution_Name", &config.institution_name)?;
            if let Some(comments) = &config.comments {
                text_element(w, "Comments", comments)?;
            }

            write_days(w, config)?;
            write_hours(w, config)?;
            write_name_list(w, "Teachers_List", "Teacher", unique(activities, |a| &a.teacher))?;
            write_name_list(w, "Subjects_List", "Subject", unique(activities, |a| &a.subject))?;
            write_name_list(w, "Students_List", "Group", unique(activities, |a| &a.students))?;
            write_name_list(w, "Rooms_List", "Room", room_names(space_constraints))?;

            w.create_element("Activities_List").write_inner_content(|w| {
                for activity in activities {
                    write_activity(w, activity)?;
                }
                Ok(())
            })?;

            w.create_element("Time_Constraints_List")
                .write_inner_content(|w| {
                    for constraint in time_constraints {
                        write_time_constraint(w, constraint)?;
                    }
                    Ok(())
                })?;

            w.create_element("Space_Constraints_List")
                .write_inner_content(|w| {
                    for constraint in space_constraints {
                        write_space_constraint(w, constraint)?;
                    }
                    Ok(())
                })?;

            Ok(())
        })?;

    let bytes = writer.into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn text_element<W: Write>(
    w: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    w.create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn bool_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn write_days<W: Write>(
    w: &mut Writer<W>,
    config: &TimetableConfig,
) -> Result<(), quick_xml::Error> {
    w.create_element("Days_List").write_inner_content(|w| {
        text_element(w, "Number_of_Days", &config.days_per_week().to_string())?;
        for day in &config.days {
            w.create_element("Day")
                .write_inner_content(|w| text_element(w, "Name", day))?;
        }
        Ok(())
    })?;
    Ok(())
}

fn write_hours<W: Write>(
    w: &mut Writer<W>,
    config: &TimetableConfig,
) -> Result<(), quick_xml::Error> {
    w.create_element("Hours_List").write_inner_content(|w| {
        text_element(w, "Number_of_Hours", &config.periods_per_day.to_string())?;
        for hour in 0..config.periods_per_day {
            w.create_element("Hour")
                .write_inner_content(|w| text_element(w, "Name", &hour.to_string()))?;
        }
        Ok(())
    })?;
    Ok(())
}

fn unique<'a>(
    activities: &[&'a Activity],
    field: impl Fn(&'a Activity) -> &'a String,
) -> BTreeSet<String> {
    activities.iter().map(|a| field(a).clone()).collect()
}

fn room_names(space_constraints: &[&SpaceConstraint]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for constraint in space_constraints {
        match constraint {
            SpaceConstraint::BasicCompulsorySpace { .. } => {}
            SpaceConstraint::RoomNotAvailableTimes { room, .. }
            | SpaceConstraint::ActivityPreferredRoom { room, .. }
            | SpaceConstraint::SubjectPreferredRoom { room, .. } => {
                names.insert(room.clone());
            }
            SpaceConstraint::SubjectPreferredRooms { rooms, .. } => {
                names.extend(rooms.iter().cloned());
            }
        }
    }
    names
}

fn write_name_list<W: Write>(
    w: &mut Writer<W>,
    list_tag: &str,
    entry_tag: &str,
    names: BTreeSet<String>,
) -> Result<(), quick_xml::Error> {
    w.create_element(list_tag).write_inner_content(|w| {
        for name in &names {
            w.create_element(entry_tag)
                .write_inner_content(|w| text_element(w, "Name", name))?;
        }
        Ok(())
    })?;
    Ok(())
}

fn write_activity<W: Write>(w: &mut Writer<W>, activity: &Activity) -> Result<(), quick_xml::Error> {
    w.create_element("Activity").write_inner_content(|w| {
        text_element(w, "Id", &activity.id.to_string())?;
        text_element(w, "Teacher", &activity.teacher)?;
        text_element(w, "Subject", &activity.subject)?;
        text_element(w, "Students", &activity.students)?;
        text_element(w, "Duration", &activity.duration.to_string())?;
        text_element(w, "Total_Duration", &activity.total_duration.to_string())?;
        Ok(())
    })?;
    Ok(())
}

fn write_slots<W: Write>(w: &mut Writer<W>, slots: &[TimeSlot]) -> Result<(), quick_xml::Error> {
    text_element(
        w,
        "Number_of_Not_Available_Times",
        &slots.len().to_string(),
    )?;
    for slot in slots {
        w.create_element("Not_Available_Time").write_inner_content(|w| {
            text_element(w, "Day", &slot.day.to_string())?;
            text_element(w, "Hour", &slot.hour.to_string())?;
            Ok(())
        })?;
    }
    Ok(())
}

fn write_footer<W: Write>(w: &mut Writer<W>, base: &BaseConstraint) -> Result<(), quick_xml::Error> {
    text_element(w, "Active", bool_token(base.active))?;
    if let Some(comments) = &base.comments {
        text_element(w, "Comments", comments)?;
    }
    Ok(())
}

fn write_time_constraint<W: Write>(
    w: &mut Writer<W>,
    constraint: &TimeConstraint,
) -> Result<(), quick_xml::Error> {
    let tag = format!("Constraint{}", constraint.kind());
    w.create_element(tag.as_str()).write_inner_content(|w| {
        text_element(
            w,
            "Weight_Percentage",
            &constraint.base().weight_percentage.to_string(),
        )?;
        match constraint {
            TimeConstraint::BasicCompulsoryTime { .. } => {}
            TimeConstraint::StudentsMaxGapsPerWeek { max_gaps, .. }
            | TimeConstraint::TeachersMaxGapsPerWeek { max_gaps, .. } => {
                text_element(w, "Max_Gaps", &max_gaps.to_string())?;
            }
            TimeConstraint::MinDaysBetweenActivities {
                consecutive_if_same_day,
                min_days,
                activity_ids,
                ..
            } => {
                text_element(
                    w,
                    "Consecutive_If_Same_Day",
                    bool_token(*consecutive_if_same_day),
                )?;
                text_element(w, "Min_Days", &min_days.to_string())?;
                text_element(w, "Number_of_Activities", &activity_ids.len().to_string())?;
                for id in activity_ids {
                    text_element(w, "Activity_Id", &id.to_string())?;
                }
            }
            TimeConstraint::TeacherNotAvailableTimes {
                teacher,
                not_available_times,
                ..
            } => {
                text_element(w, "Teacher", teacher)?;
                write_slots(w, not_available_times)?;
            }
            TimeConstraint::TeacherMaxDaysPerWeek {
                teacher,
                max_days_per_week,
                ..
            } => {
                text_element(w, "Teacher_Name", teacher)?;
                text_element(w, "Max_Days_Per_Week", &max_days_per_week.to_string())?;
            }
            TimeConstraint::ActivityPreferredStartingTime {
                activity_id,
                preferred_day,
                preferred_hour,
                permanently_locked,
                ..
            } => {
                text_element(w, "Activity_Id", &activity_id.to_string())?;
                text_element(w, "Day", &preferred_day.to_string())?;
                text_element(w, "Hour", &preferred_hour.to_string())?;
                if let Some(locked) = permanently_locked {
                    text_element(w, "Permanently_Locked", bool_token(*locked))?;
                }
            }
        }
        write_footer(w, constraint.base())
    })?;
    Ok(())
}

fn write_space_constraint<W: Write>(
    w: &mut Writer<W>,
    constraint: &SpaceConstraint,
) -> Result<(), quick_xml::Error> {
    let tag = format!("Constraint{}", constraint.kind());
    w.create_element(tag.as_str()).write_inner_content(|w| {
        text_element(
            w,
            "Weight_Percentage",
            &constraint.base().weight_percentage.to_string(),
        )?;
        match constraint {
            SpaceConstraint::BasicCompulsorySpace { .. } => {}
            SpaceConstraint::RoomNotAvailableTimes {
                room,
                not_available_times,
                ..
            } => {
                text_element(w, "Room", room)?;
                write_slots(w, not_available_times)?;
            }
            SpaceConstraint::ActivityPreferredRoom {
                activity_id, room, ..
            } => {
                text_element(w, "Activity_Id", &activity_id.to_string())?;
                text_element(w, "Room", room)?;
            }
            SpaceConstraint::SubjectPreferredRoom { subject, room, .. } => {
                text_element(w, "Subject", subject)?;
                text_element(w, "Room", room)?;
            }
            SpaceConstraint::SubjectPreferredRooms { subject, rooms, .. } => {
                text_element(w, "Subject", subject)?;
                text_element(w, "Number_of_Preferred_Rooms", &rooms.len().to_string())?;
                for room in rooms {
                    text_element(w, "Preferred_Room", room)?;
                }
            }
        }
        write_footer(w, constraint.base())
    })?;
    Ok(())
}
