//! Weekly timetable construction for academic departments.
//!
//! Given class groups with their curricula, faculty with teaching
//! capabilities and preferences, typed rooms, and a daily grid of lecture
//! and break slots, builds a weekly timetable in which no faculty member,
//! room or class is double-booked, every subject gets its weekly hours, and
//! labs sit in lab rooms. Preferences only order otherwise legal choices.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ClassGroup`, `SubjectSpec`, `Faculty`,
//!   `Room`, `TimeGrid`, `Problem`, `Assignment`, `Timetable`
//! - **`validation`**: Input integrity checks (duplicate IDs, spans, grid shape)
//! - **`availability`**: Bitmask index of who is busy when
//! - **`constraints`**: Hard-constraint predicates and full timetable verification
//! - **`ranking`**: Soft-constraint rules and the weighted rank engine
//! - **`scheduler`**: Backtracking search, budgets, cancellation, KPIs
//! - **`assembler`**: Class, faculty and room grids for viewers
//! - **`config`**: Scheduler configuration
//!
//! # Example
//!
//! ```
//! use u_timetable::assembler::WeeklyTimetable;
//! use u_timetable::models::{ClassGroup, Faculty, Problem, Room, SubjectSpec, TimeGrid, TimetableInput};
//! use u_timetable::scheduler::BacktrackingScheduler;
//!
//! let input = TimetableInput::new(TimeGrid::uniform(6))
//!     .with_class(ClassGroup::new("SEA"))
//!     .with_subject("SEA", SubjectSpec::new("ML", 3))
//!     .with_faculty(Faculty::new("Prof X", "PX").with_capability("ML"))
//!     .with_room(Room::classroom("R1"));
//!
//! let problem = Problem::new(input).unwrap();
//! let timetable = BacktrackingScheduler::default().solve(&problem).unwrap();
//! let weekly = WeeklyTimetable::assemble(&problem, &timetable);
//! assert_eq!(weekly.labels.len(), 6);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

pub mod assembler;
pub mod availability;
pub mod config;
pub mod constraints;
pub mod error;
pub mod models;
pub mod ranking;
pub mod scheduler;
pub mod validation;

pub use error::{FailureCause, FailureReport, TimetableError, UnmetRequirement};

