//! Timetable (solution) model.
//!
//! A timetable is the complete set of lesson assignments for all class
//! groups over one week. It is produced only by a successful scheduling run
//! and is immutable afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Day;

/// One committed lesson placement.
///
/// A lesson of `duration` slots occupies lecture indices
/// `start..start + duration` on `day`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Assignment {
    /// Class group id.
    pub class_id: String,
    /// Teaching day.
    pub day: Day,
    /// First lecture index (`0` is `L1`).
    pub start: usize,
    /// Number of consecutive lecture slots.
    pub duration: usize,
    /// Subject name.
    pub subject: String,
    /// Faculty short code.
    pub faculty: String,
    /// Room id.
    pub room: String,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(
        class_id: impl Into<String>,
        day: Day,
        start: usize,
        duration: usize,
        subject: impl Into<String>,
        faculty: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            day,
            start,
            duration,
            subject: subject.into(),
            faculty: faculty.into(),
            room: room.into(),
        }
    }

    /// One past the last occupied lecture index.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.duration
    }

    /// Whether the lesson occupies `lecture` on `day`.
    #[inline]
    pub fn covers(&self, day: Day, lecture: usize) -> bool {
        self.day == day && lecture >= self.start && lecture < self.end()
    }

    /// Whether two lessons share at least one (day, lecture) slot.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day && self.start < other.end() && other.start < self.end()
    }
}

/// A hard-constraint finding on a timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity id (class, faculty short code, or room id).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of hard-constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Faculty teaches two overlapping lessons.
    FacultyDoubleBooked,
    /// Room hosts two overlapping lessons.
    RoomDoubleBooked,
    /// Class attends two overlapping lessons.
    ClassDoubleBooked,
    /// Placed occurrences differ from the weekly requirement.
    OccurrenceMismatch,
    /// Room kind does not suit the subject (e.g. lab in a classroom).
    RoomKindMismatch,
    /// Faculty is not capable of teaching the subject.
    FacultyNotCapable,
    /// Lesson crosses a break or runs past the end of the day.
    InvalidSpan,
    /// Lesson uses a slot its faculty or room marked unavailable.
    Unavailable,
    /// Room has fewer seats than the class has students.
    RoomTooSmall,
    /// Assignment names a class, subject, faculty or room that does not exist.
    UnknownEntity,
}

impl Violation {
    /// Creates a violation with the default severity for its type.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let severity = match violation_type {
            ViolationType::FacultyDoubleBooked
            | ViolationType::RoomDoubleBooked
            | ViolationType::ClassDoubleBooked => 95,
            ViolationType::OccurrenceMismatch | ViolationType::UnknownEntity => 90,
            ViolationType::InvalidSpan | ViolationType::Unavailable => 85,
            ViolationType::RoomKindMismatch
            | ViolationType::FacultyNotCapable
            | ViolationType::RoomTooSmall => 80,
        };
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }
}

/// A complete weekly timetable.
///
/// Assignments are kept sorted by class, day and start slot so that equal
/// inputs compare equal regardless of search order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    assignments: Vec<Assignment>,
}

impl Timetable {
    /// Creates a timetable from a set of assignments.
    pub fn new(mut assignments: Vec<Assignment>) -> Self {
        assignments.sort();
        Self { assignments }
    }

    /// All assignments, sorted.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Assignments of a class.
    pub fn for_class(&self, class_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.class_id == class_id)
            .collect()
    }

    /// Assignments taught by a faculty (short code).
    pub fn for_faculty(&self, faculty: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.faculty == faculty)
            .collect()
    }

    /// Assignments hosted by a room.
    pub fn for_room(&self, room: &str) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| a.room == room).collect()
    }

    /// The lesson a class attends at a given slot, if any.
    pub fn entry_at(&self, class_id: &str, day: Day, lecture: usize) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.class_id == class_id && a.covers(day, lecture))
    }

    /// Number of placed occurrences of a subject for a class.
    pub fn occurrences(&self, class_id: &str, subject: &str) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.class_id == class_id && a.subject.eq_ignore_ascii_case(subject))
            .count()
    }

    /// Number of lecture slots a faculty teaches per week.
    pub fn faculty_load(&self, faculty: &str) -> usize {
        self.for_faculty(faculty).iter().map(|a| a.duration).sum()
    }

    /// Slot load for every faculty that teaches at least once.
    pub fn faculty_loads(&self) -> BTreeMap<String, usize> {
        let mut loads = BTreeMap::new();
        for a in &self.assignments {
            *loads.entry(a.faculty.clone()).or_insert(0) += a.duration;
        }
        loads
    }
}
