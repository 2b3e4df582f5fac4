//! Process-wide catalog of supported constraint kinds.
//!
//! Maps a constraint-kind identifier to a validation schema plus an
//! optional specialized editing capability, replacing per-kind dispatch
//! branches with a single lookup. The registry is initialized once and
//! read-only afterwards, so concurrent export requests may consult it
//! without locking.
//!
//! Validators operate on untyped [`serde_json::Value`] payloads because
//! that is what arrives from constraint-editing forms; the exporter runs
//! the same validators over serialized typed constraints so that both
//! paths share one schema.

use crate::models::constraints::FieldError;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

type Validator = fn(&Value) -> Vec<FieldError>;

/// Validation schema and editing capability for one constraint kind.
pub struct ConstraintSpec {
    pub kind: &'static str,
    /// Whether a specialized editor exists for this kind; unregistered
    /// kinds fall back to the generic editor.
    pub has_custom_editor: bool,
    validator: Validator,
}

impl ConstraintSpec {
    /// Validate a payload against this kind's schema. Returns all field
    /// errors at once so the caller can surface them together.
    pub fn validate(&self, payload: &Value) -> Result<(), Vec<FieldError>> {
        let errors = (self.validator)(payload);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Look up the spec for a constraint kind.
///
/// Unknown kinds return the generic spec (base fields only, no custom
/// editor); this never fails.
pub fn lookup(kind: &str) -> &'static ConstraintSpec {
    REGISTRY.get(kind).copied().unwrap_or(&GENERIC)
}

/// Pure membership check against the registered kind set.
pub fn is_implemented(kind: &str) -> bool {
    REGISTRY.contains_key(kind)
}

/// All registered kinds, in registration order.
pub fn registered_kinds() -> impl Iterator<Item = &'static str> {
    KINDS.iter().map(|spec| spec.kind)
}

static GENERIC: ConstraintSpec = ConstraintSpec {
    kind: "Generic",
    has_custom_editor: false,
    validator: validate_base,
};

static KINDS: &[ConstraintSpec] = &[
    ConstraintSpec {
        kind: "BasicCompulsoryTime",
        has_custom_editor: false,
        validator: validate_base,
    },
    ConstraintSpec {
        kind: "BasicCompulsorySpace",
        has_custom_editor: false,
        validator: validate_base,
    },
    ConstraintSpec {
        kind: "StudentsMaxGapsPerWeek",
        has_custom_editor: true,
        validator: validate_max_gaps,
    },
    ConstraintSpec {
        kind: "TeachersMaxGapsPerWeek",
        has_custom_editor: true,
        validator: validate_max_gaps,
    },
    ConstraintSpec {
        kind: "MinDaysBetweenActivities",
        has_custom_editor: true,
        validator: validate_min_days_between_activities,
    },
    ConstraintSpec {
        kind: "TeacherNotAvailableTimes",
        has_custom_editor: true,
        validator: validate_teacher_not_available,
    },
    ConstraintSpec {
        kind: "RoomNotAvailableTimes",
        has_custom_editor: true,
        validator: validate_room_not_available,
    },
    ConstraintSpec {
        kind: "TeacherMaxDaysPerWeek",
        has_custom_editor: true,
        validator: validate_teacher_max_days,
    },
    ConstraintSpec {
        kind: "ActivityPreferredStartingTime",
        has_custom_editor: true,
        validator: validate_preferred_starting_time,
    },
    ConstraintSpec {
        kind: "ActivityPreferredRoom",
        has_custom_editor: true,
        validator: validate_activity_preferred_room,
    },
    ConstraintSpec {
        kind: "SubjectPreferredRoom",
        has_custom_editor: true,
        validator: validate_subject_preferred_room,
    },
    ConstraintSpec {
        kind: "SubjectPreferredRooms",
        has_custom_editor: true,
        validator: validate_subject_preferred_rooms,
    },
];

static REGISTRY: Lazy<HashMap<&'static str, &'static ConstraintSpec>> =
    Lazy::new(|| KINDS.iter().map(|spec| (spec.kind, spec)).collect());

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

fn require_int(
    payload: &Value,
    field: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<FieldError>,
) {
    match payload.get(field).and_then(Value::as_i64) {
        Some(v) if (min..=max).contains(&v) => {}
        Some(v) => errors.push(FieldError::new(
            field,
            format!("must be between {min} and {max}, got {v}"),
        )),
        None => errors.push(FieldError::new(
            field,
            format!("required integer between {min} and {max}"),
        )),
    }
}

fn require_bool(payload: &Value, field: &str, errors: &mut Vec<FieldError>) {
    if payload.get(field).and_then(Value::as_bool).is_none() {
        errors.push(FieldError::new(field, "required boolean"));
    }
}

fn require_string(payload: &Value, field: &str, errors: &mut Vec<FieldError>) {
    match payload.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => {}
        _ => errors.push(FieldError::new(field, "required non-empty string")),
    }
}

fn validate_base(payload: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !payload.is_object() {
        return vec![FieldError::new("payload", "constraint payload must be an object")];
    }
    require_int(payload, "weight_percentage", 0, 100, &mut errors);
    require_bool(payload, "active", &mut errors);
    if let Some(comments) = payload.get("comments") {
        if !comments.is_string() && !comments.is_null() {
            errors.push(FieldError::new("comments", "must be a string when present"));
        }
    }
    errors
}

fn validate_max_gaps(payload: &Value) -> Vec<FieldError> {
    let mut errors = validate_base(payload);
    require_int(payload, "max_gaps", 0, i64::MAX, &mut errors);
    errors
}

fn validate_min_days_between_activities(payload: &Value) -> Vec<FieldError> {
    let mut errors = validate_base(payload);
    require_bool(payload, "consecutive_if_same_day", &mut errors);
    require_int(payload, "min_days", 1, i64::MAX, &mut errors);
    match payload.get("activity_ids").and_then(Value::as_array) {
        Some(ids) if !ids.is_empty() => {
            if !ids.iter().all(|id| id.as_i64().is_some()) {
                errors.push(FieldError::new(
                    "activity_ids",
                    "every entry must be an integer activity id",
                ));
            }
        }
        _ => errors.push(FieldError::new(
            "activity_ids",
            "required non-empty list of activity ids",
        )),
    }
    errors
}

fn validate_slots(payload: &Value, errors: &mut Vec<FieldError>) {
    match payload.get("not_available_times").and_then(Value::as_array) {
        Some(slots) if !slots.is_empty() => {
            for (i, slot) in slots.iter().enumerate() {
                let day = slot.get("day").and_then(Value::as_i64);
                let hour = slot.get("hour").and_then(Value::as_i64);
                if !matches!((day, hour), (Some(d), Some(h)) if d >= 0 && h >= 0) {
                    errors.push(FieldError::new(
                        "not_available_times",
                        format!("entry {i} must be a {{day, hour}} pair of non-negative integers"),
                    ));
                }
            }
            // The echoed count must agree with the slot list when present.
            if let Some(count) = payload
                .get("number_of_not_available_times")
                .and_then(Value::as_i64)
            {
                if count != slots.len() as i64 {
                    errors.push(FieldError::new(
                        "number_of_not_available_times",
                        format!("declared {count} slots but list holds {}", slots.len()),
                    ));
                }
            }
        }
        _ => errors.push(FieldError::new(
            "not_available_times",
            "required non-empty list of {day, hour} pairs",
        )),
    }
}

fn validate_teacher_not_available(payload: &Value) -> Vec<FieldError> {
    let mut errors = validate_base(payload);
    require_string(payload, "teacher", &mut errors);
    validate_slots(payload, &mut errors);
    errors
}

fn validate_room_not_available(payload: &Value) -> Vec<FieldError> {
    let mut errors = validate_base(payload);
    require_string(payload, "room", &mut errors);
    validate_slots(payload, &mut errors);
    errors
}

fn validate_teacher_max_days(payload: &Value) -> Vec<FieldError> {
    let mut errors = validate_base(payload);
    require_string(payload, "teacher", &mut errors);
    require_int(payload, "max_days_per_week", 1, 7, &mut errors);
    errors
}

fn validate_preferred_starting_time(payload: &Value) -> Vec<FieldError> {
    let mut errors = validate_base(payload);
    require_int(payload, "activity_id", 1, i64::MAX, &mut errors);
    require_int(payload, "preferred_day", 0, i64::MAX, &mut errors);
    require_int(payload, "preferred_hour", 0, i64::MAX, &mut errors);
    if let Some(locked) = payload.get("permanently_locked") {
        if !locked.is_boolean() && !locked.is_null() {
            errors.push(FieldError::new(
                "permanently_locked",
                "must be a boolean when present",
            ));
        }
    }
    errors
}

fn validate_activity_preferred_room(payload: &Value) -> Vec<FieldError> {
    let mut errors = validate_base(payload);
    require_int(payload, "activity_id", 1, i64::MAX, &mut errors);
    require_string(payload, "room", &mut errors);
    errors
}

fn validate_subject_preferred_room(payload: &Value) -> Vec<FieldError> {
    let mut errors = validate_base(payload);
    require_string(payload, "subject", &mut errors);
    require_string(payload, "room", &mut errors);
    errors
}

fn validate_subject_preferred_rooms(payload: &Value) -> Vec<FieldError> {
    let mut errors = validate_base(payload);
    require_string(payload, "subject", &mut errors);
    match payload.get("rooms").and_then(Value::as_array) {
        Some(rooms) if !rooms.is_empty() => {
            if !rooms
                .iter()
                .all(|r| r.as_str().is_some_and(|s| !s.trim().is_empty()))
            {
                errors.push(FieldError::new(
                    "rooms",
                    "every entry must be a non-empty room name",
                ));
            }
        }
        _ => errors.push(FieldError::new(
            "rooms",
            "required non-empty list of room names",
        )),
    }
    errors
}
