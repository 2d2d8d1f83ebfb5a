//! Search state visible to soft rules.

use crate::availability::AvailabilityIndex;
use crate::models::{LessonRequirement, Problem};

/// Read-only view of the problem and the current partial timetable.
#[derive(Debug, Clone, Copy)]
pub struct RankContext<'a> {
    /// The problem being solved.
    pub problem: &'a Problem,
    /// Occupancy after the placements made so far.
    pub index: &'a AvailabilityIndex,
}

impl<'a> RankContext<'a> {
    /// Creates a context.
    pub fn new(problem: &'a Problem, index: &'a AvailabilityIndex) -> Self {
        Self { problem, index }
    }

    /// Requirement by index.
    #[inline]
    pub fn requirement(&self, requirement: usize) -> &'a LessonRequirement {
        &self.problem.requirements()[requirement]
    }
}
