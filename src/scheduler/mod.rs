//! Timetable search and quality evaluation.
//!
//! # Algorithm
//!
//! `BacktrackingScheduler` places every lesson occurrence with an
//! iterative depth-first search. Occurrences are visited most constrained
//! first, candidates are ordered by the soft-rule ranker, and dead ends are
//! undone through the availability index. The search is complete: given
//! enough budget it either finds a timetable or proves none exists.
//!
//! Counting checks run before the search so that obviously impossible
//! inputs (no capable faculty, no lab room, an overloaded sole lecturer)
//! fail immediately instead of exhausting the budget.
//!
//! # KPI
//!
//! `TimetableKpi` reports fill rate, faculty load, room utilization and
//! idle gaps of a finished timetable.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6

mod backtrack;
mod budget;
mod feasibility;
mod kpi;
mod worklist;

pub use backtrack::BacktrackingScheduler;
pub use budget::{BudgetLimit, CancellationToken, SearchBudget};
pub use kpi::{KpiWarning, TimetableKpi};
