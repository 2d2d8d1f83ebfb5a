//! Timetabling domain models.
//!
//! Provides the input records supplied by the department's data layer, the
//! validated [`Problem`] a scheduling run works on, and the [`Timetable`]
//! it produces.
//!
//! # Domain Mappings
//!
//! | u-timetable | Meaning |
//! |-------------|---------|
//! | ClassGroup | Student cohort (e.g. a class section) |
//! | SubjectSpec | Curriculum entry of a cohort |
//! | LessonRequirement | Subject × cohort with weekly occurrence count |
//! | Faculty | Teacher with capabilities and preferences |
//! | Room | Classroom or lab |
//! | TimeGrid | Daily lecture/break structure |
//! | Assignment | One placed lesson occurrence |

mod class_group;
mod faculty;
mod problem;
mod room;
mod subject;
mod time_grid;
mod timetable;

pub use class_group::ClassGroup;
pub use faculty::Faculty;
pub use problem::{LessonRequirement, Problem, TimetableInput};
pub use room::{Room, RoomKind};
pub use subject::{SubjectKind, SubjectSpec, MAX_DURATION_SLOTS, MIN_DURATION_SLOTS};
pub use time_grid::{
    ClockTime, ClockTimeParseError, Day, GridLayout, GridSlot, SlotKind, SlotRef, TimeGrid,
    MAX_LECTURES_PER_DAY,
};
pub use timetable::{Assignment, Timetable, Violation, ViolationType};
