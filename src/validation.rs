//! Input validation for timetable problems.
//!
//! Checks structural integrity of classes, curricula, faculty, rooms and
//! the time grid before any search starts. Detects:
//! - Duplicate or empty IDs
//! - Curricula and preferences that reference unknown classes
//! - Classes with nothing to schedule
//! - Durations outside 1..=4 slots and weekly hours that do not divide
//! - Empty, oversized or time-inconsistent grids
//! - Unavailability entries outside the grid
//!
//! All findings are collected; validation does not stop at the first one.
//! Whether a well-formed problem can actually be solved (e.g. a subject
//! nobody can teach) is decided by the scheduler, not here.

use std::collections::HashSet;

use crate::models::{
    SlotKind, SlotRef, TimetableInput, MAX_DURATION_SLOTS, MAX_LECTURES_PER_DAY,
    MIN_DURATION_SLOTS,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An entity has an empty ID.
    MissingId,
    /// A curriculum or preference references a class that doesn't exist.
    UnknownClass,
    /// A class has no subject with weekly hours.
    EmptyCurriculum,
    /// A subject span is outside the allowed range.
    InvalidDuration,
    /// Weekly hours are not a whole number of occurrences.
    HoursNotDivisible,
    /// The grid contains no lecture slot.
    NoLectureSlots,
    /// The grid contains more lecture slots than can be tracked.
    TooManyLectures,
    /// A grid slot ends before it starts or overlaps its predecessor.
    InvalidTimeRange,
    /// An unavailability entry points outside the grid.
    SlotOutOfRange,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input snapshot of a scheduling run.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(input: &TimetableInput) -> ValidationResult {
    let mut errors = Vec::new();

    let lectures = validate_grid(input, &mut errors);

    // Classes
    let mut class_ids = HashSet::new();
    for class in &input.classes {
        if class.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingId,
                "Class group with empty ID",
            ));
        } else if !class_ids.insert(class.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate class ID: {}", class.id),
            ));
        }
    }

    // Curricula
    for (class_id, subjects) in &input.curriculum {
        if !class_ids.contains(class_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownClass,
                format!("Curriculum references unknown class '{class_id}'"),
            ));
        }

        let mut names = HashSet::new();
        for subject in subjects {
            if subject.name.trim().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingId,
                    format!("Class '{class_id}' has a subject with an empty name"),
                ));
                continue;
            }
            if !names.insert(subject.name.to_lowercase()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate subject '{}' in class '{class_id}'", subject.name),
                ));
            }

            let duration = subject.resolved_duration();
            if !(MIN_DURATION_SLOTS..=MAX_DURATION_SLOTS).contains(&duration) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDuration,
                    format!(
                        "Subject '{}' of class '{class_id}' spans {duration} slots \
                         (allowed {MIN_DURATION_SLOTS}..={MAX_DURATION_SLOTS})",
                        subject.name
                    ),
                ));
            } else if subject.weekly_hours % u32::from(duration) != 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::HoursNotDivisible,
                    format!(
                        "Subject '{}' of class '{class_id}' needs {} hours/week, \
                         not a multiple of its {duration}-slot duration",
                        subject.name, subject.weekly_hours
                    ),
                ));
            }
        }
    }

    for class in &input.classes {
        let has_work = input
            .curriculum
            .get(&class.id)
            .map(|subjects| subjects.iter().any(|s| s.weekly_hours > 0))
            .unwrap_or(false);
        if !has_work {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCurriculum,
                format!("Class '{}' has no lectures configured", class.id),
            ));
        }
    }

    // Faculty
    let mut faculty_ids = HashSet::new();
    for faculty in &input.faculty {
        if faculty.short.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingId,
                format!("Faculty '{}' has an empty short code", faculty.name),
            ));
        } else if !faculty_ids.insert(faculty.short.to_lowercase()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate faculty short code: {}", faculty.short),
            ));
        }

        for class_id in faculty.preferences.keys() {
            if !class_ids.contains(class_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownClass,
                    format!(
                        "Faculty '{}' has preferences for unknown class '{class_id}'",
                        faculty.short
                    ),
                ));
            }
        }

        check_slots(&faculty.unavailable, lectures, &faculty.short, &mut errors);
    }

    // Rooms
    let mut room_ids = HashSet::new();
    for room in &input.rooms {
        if room.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingId,
                "Room with empty ID",
            ));
        } else if !room_ids.insert(room.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", room.id),
            ));
        }
        check_slots(&room.unavailable, lectures, &room.id, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks the grid and returns its lecture count.
fn validate_grid(input: &TimetableInput, errors: &mut Vec<ValidationError>) -> usize {
    let lectures = input.grid.lecture_count();
    if lectures == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoLectureSlots,
            "Time grid has no lecture slots",
        ));
    } else if lectures > MAX_LECTURES_PER_DAY {
        errors.push(ValidationError::new(
            ValidationErrorKind::TooManyLectures,
            format!("Time grid has {lectures} lecture slots (max {MAX_LECTURES_PER_DAY})"),
        ));
    }

    let mut previous_end = None;
    for (i, slot) in input.grid.slots.iter().enumerate() {
        if slot.end <= slot.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeRange,
                format!(
                    "Grid slot {} ({}) ends at {} before it starts at {}",
                    i + 1,
                    match slot.kind {
                        SlotKind::Lecture => "lecture",
                        SlotKind::Break => "break",
                    },
                    slot.end,
                    slot.start
                ),
            ));
        }
        if let Some(end) = previous_end {
            if slot.start < end {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTimeRange,
                    format!("Grid slot {} starts at {} before the previous one ends", i + 1, slot.start),
                ));
            }
        }
        previous_end = Some(slot.end);
    }

    lectures
}

fn check_slots(slots: &[SlotRef], lectures: usize, owner: &str, errors: &mut Vec<ValidationError>) {
    for slot in slots {
        if slot.lecture >= lectures {
            errors.push(ValidationError::new(
                ValidationErrorKind::SlotOutOfRange,
                format!(
                    "'{owner}' marks {} L{} unavailable, but the grid has {lectures} lectures",
                    slot.day,
                    slot.lecture + 1
                ),
            ));
        }
    }
}
