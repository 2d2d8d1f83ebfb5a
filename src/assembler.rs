//! Result assembly: viewer-facing projections of a timetable.
//!
//! A [`Timetable`] is a flat, sorted list of assignments. Viewers want a
//! grid instead: for each class (or faculty member, or room), for each day
//! Monday to Friday, one cell per lecture label `L1..Ln`. Every cell is
//! present; a lecture with nothing scheduled carries an explicit empty
//! marker rather than being left out.
//!
//! A lesson spanning several lectures appears in each covered cell. The
//! first cell has `continuation: false`, the following ones `true`.
//!
//! All three views are derived from the same timetable, so the faculty and
//! room projections never require another scheduling run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Assignment, Day, Problem, TimeGrid, Timetable};

/// One labelled lecture cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCell<E> {
    /// Lecture label (`"L1"`, `"L2"`, ...).
    pub label: String,
    pub entry: E,
}

/// Cells of one entity for the whole week.
pub type WeekGrid<E> = BTreeMap<Day, Vec<SlotCell<E>>>;

/// Cell content of the class view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotEntry {
    Lesson {
        subject: String,
        /// Faculty name.
        faculty: String,
        room: String,
        /// Second or later lecture of a multi-slot lesson.
        continuation: bool,
    },
    Empty,
}

/// Cell content of the faculty view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FacultySlot {
    Teaching {
        class_id: String,
        subject: String,
        room: String,
        continuation: bool,
    },
    Free,
}

/// Cell content of the room view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomSlot {
    Occupied {
        class_id: String,
        subject: String,
        /// Faculty name.
        faculty: String,
        continuation: bool,
    },
    Free,
}

/// Per-class weekly grid.
///
/// # Example
/// ```
/// use u_timetable::assembler::{SlotEntry, WeeklyTimetable};
/// use u_timetable::models::{ClassGroup, Day, Faculty, Problem, Room, SubjectSpec, TimeGrid, TimetableInput};
/// use u_timetable::scheduler::BacktrackingScheduler;
///
/// let input = TimetableInput::new(TimeGrid::uniform(6))
///     .with_class(ClassGroup::new("SEA"))
///     .with_subject("SEA", SubjectSpec::new("ML", 3))
///     .with_faculty(Faculty::new("Prof X", "PX").with_capability("ML"))
///     .with_room(Room::classroom("R1"));
/// let problem = Problem::new(input).unwrap();
/// let timetable = BacktrackingScheduler::default().solve(&problem).unwrap();
///
/// let weekly = WeeklyTimetable::assemble(&problem, &timetable);
/// let cell = weekly.cell("SEA", Day::Monday, "L2").unwrap();
/// assert_eq!(cell.entry, SlotEntry::Empty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTimetable {
    /// Lecture labels of one day, in order.
    pub labels: Vec<String>,
    /// Grid per class id.
    pub classes: BTreeMap<String, WeekGrid<SlotEntry>>,
}

impl WeeklyTimetable {
    /// Builds the class view of a timetable.
    pub fn assemble(problem: &Problem, timetable: &Timetable) -> Self {
        let classes = problem
            .classes()
            .iter()
            .map(|class| {
                let grid = week_grid(
                    problem,
                    &timetable.for_class(&class.id),
                    |a, continuation| SlotEntry::Lesson {
                        subject: a.subject.clone(),
                        faculty: faculty_name(problem, &a.faculty),
                        room: a.room.clone(),
                        continuation,
                    },
                    SlotEntry::Empty,
                );
                (class.id.clone(), grid)
            })
            .collect();

        Self {
            labels: problem.grid().lecture_labels(),
            classes,
        }
    }

    /// Grid of one class.
    pub fn class(&self, class_id: &str) -> Option<&WeekGrid<SlotEntry>> {
        self.classes.get(class_id)
    }

    /// Cell of a class at a day and lecture label.
    pub fn cell(&self, class_id: &str, day: Day, label: &str) -> Option<&SlotCell<SlotEntry>> {
        self.classes
            .get(class_id)?
            .get(&day)?
            .iter()
            .find(|c| c.label == label)
    }
}

/// Personal timetable of one faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyView {
    pub name: String,
    pub short: String,
    /// Lecture slots taught per week.
    pub load: usize,
    pub days: WeekGrid<FacultySlot>,
}

impl FacultyView {
    /// Builds the view for a faculty short code, `None` if unknown.
    pub fn assemble(problem: &Problem, timetable: &Timetable, short: &str) -> Option<Self> {
        let faculty = &problem.faculty()[problem.faculty_index(short)?];
        let lessons = timetable.for_faculty(&faculty.short);
        let days = week_grid(
            problem,
            &lessons,
            |a, continuation| FacultySlot::Teaching {
                class_id: a.class_id.clone(),
                subject: a.subject.clone(),
                room: a.room.clone(),
                continuation,
            },
            FacultySlot::Free,
        );
        Some(Self {
            name: faculty.name.clone(),
            short: faculty.short.clone(),
            load: lessons.iter().map(|a| a.duration).sum(),
            days,
        })
    }

    /// Views for every faculty member, keyed by short code.
    pub fn assemble_all(problem: &Problem, timetable: &Timetable) -> BTreeMap<String, Self> {
        problem
            .faculty()
            .iter()
            .filter_map(|f| {
                Self::assemble(problem, timetable, &f.short).map(|v| (f.short.clone(), v))
            })
            .collect()
    }
}

/// Occupancy timetable of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    pub id: String,
    pub days: WeekGrid<RoomSlot>,
}

impl RoomView {
    /// Builds the view for a room id, `None` if unknown.
    pub fn assemble(problem: &Problem, timetable: &Timetable, room_id: &str) -> Option<Self> {
        let room = &problem.rooms()[problem.room_index(room_id)?];
        let days = week_grid(
            problem,
            &timetable.for_room(&room.id),
            |a, continuation| RoomSlot::Occupied {
                class_id: a.class_id.clone(),
                subject: a.subject.clone(),
                faculty: faculty_name(problem, &a.faculty),
                continuation,
            },
            RoomSlot::Free,
        );
        Some(Self {
            id: room.id.clone(),
            days,
        })
    }

    /// Views for every room, keyed by id.
    pub fn assemble_all(problem: &Problem, timetable: &Timetable) -> BTreeMap<String, Self> {
        problem
            .rooms()
            .iter()
            .filter_map(|r| Self::assemble(problem, timetable, &r.id).map(|v| (r.id.clone(), v)))
            .collect()
    }
}

fn faculty_name(problem: &Problem, short: &str) -> String {
    problem
        .faculty_index(short)
        .map(|f| problem.faculty()[f].name.clone())
        .unwrap_or_else(|| short.to_string())
}

fn week_grid<E: Clone>(
    problem: &Problem,
    lessons: &[&Assignment],
    lesson: impl Fn(&Assignment, bool) -> E,
    empty: E,
) -> WeekGrid<E> {
    let lectures = problem.lectures_per_day();
    Day::ALL
        .iter()
        .map(|&day| {
            let cells = (0..lectures)
                .map(|l| {
                    let entry = lessons
                        .iter()
                        .find(|a| a.covers(day, l))
                        .map(|a| lesson(*a, l != a.start))
                        .unwrap_or_else(|| empty.clone());
                    SlotCell {
                        label: TimeGrid::label(l),
                        entry,
                    }
                })
                .collect();
            (day, cells)
        })
        .collect()
}
