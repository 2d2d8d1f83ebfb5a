//! Scheduling problem: validated input snapshot plus derived requirements.
//!
//! [`TimetableInput`] is the data contract supplied by the persistence
//! layer. [`Problem::new`] validates it once and derives one
//! [`LessonRequirement`] per (class, subject) pair with weekly hours. The
//! problem is read-only for the whole run and can be shared between threads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ClassGroup, Faculty, GridLayout, Room, SubjectKind, SubjectSpec, TimeGrid};
use crate::error::TimetableError;
use crate::validation::validate_input;

/// Input snapshot for one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableInput {
    /// Class groups to schedule.
    pub classes: Vec<ClassGroup>,
    /// Subjects per class id.
    #[serde(default)]
    pub curriculum: BTreeMap<String, Vec<SubjectSpec>>,
    /// Teaching staff.
    #[serde(default)]
    pub faculty: Vec<Faculty>,
    /// Bookable rooms.
    #[serde(default)]
    pub rooms: Vec<Room>,
    /// Daily slot structure (identical Monday to Friday).
    pub grid: TimeGrid,
}

impl TimetableInput {
    /// Creates an empty input over a grid.
    pub fn new(grid: TimeGrid) -> Self {
        Self {
            grid,
            ..Default::default()
        }
    }

    /// Adds a class group.
    pub fn with_class(mut self, class: ClassGroup) -> Self {
        self.classes.push(class);
        self
    }

    /// Adds a subject to a class curriculum.
    pub fn with_subject(mut self, class_id: impl Into<String>, subject: SubjectSpec) -> Self {
        self.curriculum
            .entry(class_id.into())
            .or_default()
            .push(subject);
        self
    }

    /// Adds a faculty member.
    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty.push(faculty);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }
}

/// The need to place one subject for one class a fixed number of times
/// per week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRequirement {
    /// Index of the class in [`Problem::classes`].
    pub class: usize,
    /// Class id.
    pub class_id: String,
    /// Subject name.
    pub subject: String,
    /// Subject short code (name if none given).
    pub subject_short: String,
    /// Teaching format.
    pub kind: SubjectKind,
    /// Consecutive slots per occurrence.
    pub duration: usize,
    /// Occurrences per week.
    pub occurrences: usize,
    /// Indices of faculty able to teach the subject, ordered by short code.
    pub capable_faculty: Vec<usize>,
    /// Indices of rooms of a suitable kind and size, ordered by id.
    pub compatible_rooms: Vec<usize>,
}

impl LessonRequirement {
    /// Lecture slots needed per week.
    pub fn slot_demand(&self) -> usize {
        self.duration * self.occurrences
    }
}

/// Validated, immutable scheduling problem.
#[derive(Debug, Clone)]
pub struct Problem {
    classes: Vec<ClassGroup>,
    faculty: Vec<Faculty>,
    rooms: Vec<Room>,
    grid: TimeGrid,
    layout: GridLayout,
    requirements: Vec<LessonRequirement>,
}

impl Problem {
    /// Validates the input and derives lesson requirements.
    ///
    /// # Errors
    /// [`TimetableError::Validation`] listing every problem found.
    pub fn new(input: TimetableInput) -> Result<Self, TimetableError> {
        validate_input(&input).map_err(TimetableError::Validation)?;

        let TimetableInput {
            classes,
            curriculum,
            faculty,
            rooms,
            grid,
        } = input;

        let mut faculty_order: Vec<usize> = (0..faculty.len()).collect();
        faculty_order.sort_by(|&a, &b| faculty[a].short.cmp(&faculty[b].short));
        let mut room_order: Vec<usize> = (0..rooms.len()).collect();
        room_order.sort_by(|&a, &b| rooms[a].id.cmp(&rooms[b].id));

        let mut requirements = Vec::new();
        for (class_idx, class) in classes.iter().enumerate() {
            let Some(subjects) = curriculum.get(&class.id) else {
                continue;
            };
            for spec in subjects.iter().filter(|s| s.weekly_hours > 0) {
                let kind = spec.resolved_kind();
                let duration = usize::from(spec.resolved_duration());
                let capable_faculty = faculty_order
                    .iter()
                    .copied()
                    .filter(|&f| {
                        faculty[f].can_teach(&spec.name)
                            || (!spec.short.is_empty() && faculty[f].can_teach(&spec.short))
                    })
                    .collect();
                let compatible_rooms = room_order
                    .iter()
                    .copied()
                    .filter(|&r| kind.accepts_room(rooms[r].kind) && rooms[r].fits(class.size))
                    .collect();

                requirements.push(LessonRequirement {
                    class: class_idx,
                    class_id: class.id.clone(),
                    subject: spec.name.clone(),
                    subject_short: spec.display_short().to_string(),
                    kind,
                    duration,
                    occurrences: spec.weekly_hours as usize / duration,
                    capable_faculty,
                    compatible_rooms,
                });
            }
        }

        let layout = grid.layout();
        Ok(Self {
            classes,
            faculty,
            rooms,
            grid,
            layout,
            requirements,
        })
    }

    pub fn classes(&self) -> &[ClassGroup] {
        &self.classes
    }

    pub fn faculty(&self) -> &[Faculty] {
        &self.faculty
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Break-aware lecture layout of the grid.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Lecture slots per day.
    pub fn lectures_per_day(&self) -> usize {
        self.layout.lecture_count()
    }

    pub fn requirements(&self) -> &[LessonRequirement] {
        &self.requirements
    }

    /// Total occurrences that a complete timetable must place.
    pub fn total_occurrences(&self) -> usize {
        self.requirements.iter().map(|r| r.occurrences).sum()
    }

    /// Index of a class by id.
    pub fn class_index(&self, class_id: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.id == class_id)
    }

    /// Index of a faculty member by short code.
    pub fn faculty_index(&self, short: &str) -> Option<usize> {
        self.faculty
            .iter()
            .position(|f| f.short.eq_ignore_ascii_case(short))
    }

    /// Index of a room by id.
    pub fn room_index(&self, room_id: &str) -> Option<usize> {
        self.rooms.iter().position(|r| r.id == room_id)
    }

    /// Requirement for a class/subject pair.
    pub fn requirement(&self, class_id: &str, subject: &str) -> Option<&LessonRequirement> {
        self.requirements
            .iter()
            .find(|r| r.class_id == class_id && r.subject.eq_ignore_ascii_case(subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> TimetableInput {
        TimetableInput::new(TimeGrid::uniform(6))
            .with_class(ClassGroup::new("SEA").with_size(70))
            .with_subject("SEA", SubjectSpec::new("Machine Learning", 3).with_short("ML"))
            .with_subject("SEA", SubjectSpec::new("ML Lab", 4))
            .with_subject("SEA", SubjectSpec::new("Seminar", 0))
            .with_faculty(Faculty::new("Prof Y", "PY").with_capability("ML Lab"))
            .with_faculty(Faculty::new("Prof X", "PX").with_capability("ml"))
            .with_room(Room::classroom("302").with_capacity(40))
            .with_room(Room::classroom("301"))
            .with_room(Room::lab("LAB1"))
    }

    #[test]
    fn test_requirements_derived() {
        let p = Problem::new(sample_input()).unwrap();
        // Zero-hour subjects produce no requirement
        assert_eq!(p.requirements().len(), 2);

        let ml = p.requirement("SEA", "machine learning").unwrap();
        assert_eq!(ml.kind, SubjectKind::Lecture);
        assert_eq!(ml.duration, 1);
        assert_eq!(ml.occurrences, 3);
        assert_eq!(ml.subject_short, "ML");
        // Matched through the short code
        assert_eq!(ml.capable_faculty, vec![p.faculty_index("PX").unwrap()]);
        // 302 is too small for 70 students; a lecture may use the lab
        assert_eq!(
            ml.compatible_rooms,
            vec![p.room_index("301").unwrap(), p.room_index("LAB1").unwrap()]
        );

        let lab = p.requirement("SEA", "ML Lab").unwrap();
        assert_eq!(lab.kind, SubjectKind::Lab);
        assert_eq!(lab.duration, 2);
        assert_eq!(lab.occurrences, 2);
        assert_eq!(lab.slot_demand(), 4);
        assert_eq!(lab.compatible_rooms, vec![p.room_index("LAB1").unwrap()]);

        assert_eq!(p.total_occurrences(), 5);
        assert_eq!(p.lectures_per_day(), 6);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let input = sample_input().with_room(Room::classroom("301"));
        match Problem::new(input) {
            Err(TimetableError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_input_json_contract() {
        let json = r#"{
            "classes": [{"id": "SEA", "batches": ["SEA1", "SEA2"]}],
            "curriculum": {"SEA": [{"name": "ML", "short": "ML", "kind": "lecture",
                                     "duration_slots": 1, "weekly_hours": 3}]},
            "faculty": [{"name": "Prof X", "short": "PX", "position": "Professor",
                         "capabilities": ["ML"], "preferences": {"SEA": ["ML"]}}],
            "rooms": [{"id": "R1", "kind": "classroom"}],
            "grid": {"slots": [
                {"kind": "lecture", "start": "09:00", "end": "10:00"},
                {"kind": "break", "start": "10:00", "end": "10:15"},
                {"kind": "lecture", "start": "10:15", "end": "11:15"}
            ]}
        }"#;
        let input: TimetableInput = serde_json::from_str(json).unwrap();
        let p = Problem::new(input).unwrap();
        assert_eq!(p.lectures_per_day(), 2);
        assert_eq!(p.classes()[0].batches.len(), 2);
        assert_eq!(p.requirement("SEA", "ML").unwrap().occurrences, 3);
    }
}
