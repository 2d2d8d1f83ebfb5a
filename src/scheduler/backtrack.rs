//! Backtracking timetable search.
//!
//! # Algorithm
//!
//! 1. Build the work-list (one item per requirement occurrence, most
//!    constrained first).
//! 2. Run the pre-search feasibility checks; stop early with a proof of
//!    infeasibility when one fires.
//! 3. Depth-first search over an explicit stack. Entering a depth
//!    enumerates the legal placements for that work item, ranks them by
//!    soft-rule score and pushes a frame holding the ranked list and a
//!    cursor. Each step undoes the frame's previous placement (if any) and
//!    tries the next candidate. A frame with no candidate left is popped,
//!    which counts as one backtrack.
//! 4. Success when every work item is placed; proven infeasible when the
//!    root frame runs out of candidates. The proof is reported even when
//!    the last backtrack crosses the budget.
//!
//! A placement the availability index refuses after the constraint engine
//! accepted it is an engine defect and aborts the run with
//! [`TimetableError::InvariantViolation`].
//!
//! Occurrence `k + 1` of a requirement must start strictly after
//! occurrence `k` in (day, lecture) order. Occurrences are interchangeable,
//! so this prunes only permutations of the same timetable.
//!
//! A candidate is also dropped when the requirement's later occurrences
//! could no longer fit after it (see [`can_finish`]).
//!
//! # Complexity
//! Exponential in the worst case; bounded by `max_backtracks` and the
//! optional time limit.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", §3

use log::{debug, error, info, trace, warn};

use super::budget::{BudgetLimit, CancellationToken, SearchBudget};
use super::feasibility::{analyse, sort_unmet};
use super::worklist::{build_worklist, can_finish, legal_placements, WorkItem};
use crate::availability::{AvailabilityIndex, Conflict, EntityKind, Placement};
use crate::config::SchedulerConfig;
use crate::constraints::{verify, ConstraintEngine};
use crate::error::{FailureCause, FailureReport, TimetableError, UnmetRequirement};
use crate::models::{
    Assignment, Problem, Timetable, TimetableInput, Violation, ViolationType,
};
use crate::ranking::{RankContext, RankEngine};

/// Search frame: one work item with its ranked candidates.
#[derive(Debug)]
struct Frame {
    item: WorkItem,
    candidates: Vec<Placement>,
    cursor: usize,
    placed: Option<Placement>,
}

/// Complete backtracking scheduler.
///
/// Either returns a timetable that satisfies every hard constraint or an
/// error explaining why none was produced. Identical input and
/// configuration always give an identical result.
///
/// # Example
///
/// ```
/// use u_timetable::config::SchedulerConfig;
/// use u_timetable::models::{ClassGroup, Faculty, Room, SubjectSpec, TimeGrid, TimetableInput};
/// use u_timetable::scheduler::BacktrackingScheduler;
///
/// let input = TimetableInput::new(TimeGrid::uniform(6))
///     .with_class(ClassGroup::new("SEA"))
///     .with_subject("SEA", SubjectSpec::new("ML", 3))
///     .with_faculty(Faculty::new("Prof X", "PX").with_capability("ML"))
///     .with_room(Room::classroom("R1"));
///
/// let scheduler = BacktrackingScheduler::new(SchedulerConfig::default());
/// let timetable = scheduler.schedule(input).unwrap();
/// assert_eq!(timetable.occurrences("SEA", "ML"), 3);
/// ```
#[derive(Debug, Clone)]
pub struct BacktrackingScheduler {
    config: SchedulerConfig,
    ranker: RankEngine,
}

impl BacktrackingScheduler {
    /// Creates a scheduler with the built-in soft rules weighted by
    /// `config.weights`.
    pub fn new(config: SchedulerConfig) -> Self {
        let ranker = RankEngine::from_weights(&config.weights);
        Self { config, ranker }
    }

    /// Replaces the candidate ranker.
    pub fn with_rank_engine(mut self, ranker: RankEngine) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Validates an input snapshot and solves it.
    pub fn schedule(&self, input: TimetableInput) -> Result<Timetable, TimetableError> {
        let problem = Problem::new(input)?;
        self.solve(&problem)
    }

    /// Solves a validated problem.
    pub fn solve(&self, problem: &Problem) -> Result<Timetable, TimetableError> {
        self.solve_with_cancel(problem, &CancellationToken::new())
    }

    /// Solves a validated problem, polling `cancel` at every search step.
    ///
    /// # Errors
    /// - [`TimetableError::Infeasible`] when no complete timetable exists.
    /// - [`TimetableError::BudgetExceeded`] when a bound was hit first.
    /// - [`TimetableError::Cancelled`] when `cancel` was triggered.
    /// - [`TimetableError::InvariantViolation`] if the result fails
    ///   verification.
    pub fn solve_with_cancel(
        &self,
        problem: &Problem,
        cancel: &CancellationToken,
    ) -> Result<Timetable, TimetableError> {
        info!(
            "timetable search started: {} classes, {} requirements, {} occurrences, {} lectures/day",
            problem.classes().len(),
            problem.requirements().len(),
            problem.total_occurrences(),
            problem.lectures_per_day()
        );

        let limit = self.config.max_daily_occurrences;
        let engine = ConstraintEngine::new(problem).with_daily_limit(limit);
        let mut index = AvailabilityIndex::new(problem);
        let worklist = build_worklist(&engine, &index);
        debug!(
            "work-list built: {} items, scarcity {}..{}",
            worklist.len(),
            worklist.first().map_or(0, |i| i.scarcity),
            worklist.last().map_or(0, |i| i.scarcity)
        );

        if let Some(report) = analyse(problem, &index, &worklist, limit) {
            warn!("timetable infeasible before search: {report}");
            return Err(TimetableError::Infeasible(report));
        }

        let mut budget = SearchBudget::from_config(&self.config);
        let mut stack: Vec<Frame> = Vec::with_capacity(worklist.len());
        let mut best_depth = 0;
        let mut descend = true;

        loop {
            if stack.is_empty() && !descend {
                let report = failure_report(
                    problem,
                    &worklist,
                    best_depth,
                    FailureCause::Infeasible,
                    budget.backtracks(),
                );
                warn!("timetable infeasible after exhaustive search: {report}");
                return Err(TimetableError::Infeasible(report));
            }
            if cancel.is_cancelled() {
                info!(
                    "timetable search cancelled after {} backtracks",
                    budget.backtracks()
                );
                return Err(TimetableError::Cancelled);
            }
            if let Some(hit) = budget.tick() {
                let report = failure_report(
                    problem,
                    &worklist,
                    best_depth,
                    FailureCause::BudgetExceeded,
                    budget.backtracks(),
                );
                match hit {
                    BudgetLimit::Backtracks => warn!("backtrack budget exhausted: {report}"),
                    BudgetLimit::Time => warn!(
                        "time budget exhausted after {} ms: {report}",
                        budget.elapsed().as_millis()
                    ),
                }
                return Err(TimetableError::BudgetExceeded(report));
            }

            if descend {
                if stack.len() == worklist.len() {
                    break;
                }
                let item = worklist[stack.len()];
                let after = if item.occurrence > 0 {
                    stack
                        .last()
                        .and_then(|f| f.placed)
                        .map(|p| (p.day, p.start))
                } else {
                    None
                };
                let remaining = problem.requirements()[item.requirement].occurrences
                    - item.occurrence
                    - 1;
                let legal: Vec<Placement> =
                    legal_placements(&engine, &index, item.requirement, after)
                        .into_iter()
                        .filter(|c| can_finish(problem, &index, limit, c, remaining))
                        .collect();
                let candidates = self.ranker.rank(legal, &RankContext::new(problem, &index));
                trace!(
                    "depth {}: {} candidate(s) for requirement {} occurrence {}",
                    stack.len(),
                    candidates.len(),
                    item.requirement,
                    item.occurrence
                );
                stack.push(Frame {
                    item,
                    candidates,
                    cursor: 0,
                    placed: None,
                });
            }

            // An empty stack is reported at the top of the loop
            let Some(frame) = stack.last_mut() else {
                continue;
            };

            let req = &problem.requirements()[frame.item.requirement];
            if let Some(previous) = frame.placed.take() {
                index.unplace(&previous, req.class, req.duration);
            }

            match frame.candidates.get(frame.cursor).copied() {
                Some(candidate) => {
                    frame.cursor += 1;
                    if let Err(conflict) = index.place(&candidate, req.class, req.duration) {
                        error!("accepted candidate refused by the availability index: {conflict}");
                        return Err(TimetableError::InvariantViolation(vec![
                            conflict_violation(problem, &conflict),
                        ]));
                    }
                    frame.placed = Some(candidate);
                    descend = true;
                    best_depth = best_depth.max(stack.len());
                }
                None => {
                    stack.pop();
                    budget.record_backtrack();
                    trace!("backtrack to depth {}", stack.len());
                    descend = false;
                }
            }
        }

        let assignments = stack
            .iter()
            .filter_map(|f| f.placed)
            .map(|p| to_assignment(problem, &p))
            .collect();
        let timetable = Timetable::new(assignments);

        if self.config.verify_result {
            let violations = verify(problem, &timetable);
            if !violations.is_empty() {
                error!(
                    "accepted timetable breaks {} hard constraint(s)",
                    violations.len()
                );
                return Err(TimetableError::InvariantViolation(violations));
            }
        }

        info!(
            "timetable search finished: {} assignments, {} backtracks, {} iterations, {} ms",
            timetable.len(),
            budget.backtracks(),
            budget.iterations(),
            budget.elapsed().as_millis()
        );
        Ok(timetable)
    }
}

impl Default for BacktrackingScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

fn to_assignment(problem: &Problem, p: &Placement) -> Assignment {
    let req = &problem.requirements()[p.requirement];
    Assignment::new(
        req.class_id.clone(),
        p.day,
        p.start,
        req.duration,
        req.subject.clone(),
        problem.faculty()[p.faculty].short.clone(),
        problem.rooms()[p.room].id.clone(),
    )
}

/// Double booking reported by the availability index.
fn conflict_violation(problem: &Problem, conflict: &Conflict) -> Violation {
    let (violation_type, entity) = match conflict.kind {
        EntityKind::Faculty => (
            ViolationType::FacultyDoubleBooked,
            problem.faculty().get(conflict.id).map(|f| f.short.clone()),
        ),
        EntityKind::Room => (
            ViolationType::RoomDoubleBooked,
            problem.rooms().get(conflict.id).map(|r| r.id.clone()),
        ),
        EntityKind::Class => (
            ViolationType::ClassDoubleBooked,
            problem.classes().get(conflict.id).map(|c| c.id.clone()),
        ),
    };
    let entity = entity.unwrap_or_else(|| conflict.id.to_string());
    let message = format!("{} {entity} double-booked at placement: {conflict}", conflict.kind);
    Violation::new(violation_type, entity, message)
}

/// Describes the deepest state reached. The work-list prefix up to
/// `depth` is exactly the set of occurrences placed in that state.
fn failure_report(
    problem: &Problem,
    worklist: &[WorkItem],
    depth: usize,
    cause: FailureCause,
    backtracks: u64,
) -> FailureReport {
    let reqs = problem.requirements();
    let mut placed = vec![0usize; reqs.len()];
    for item in &worklist[..depth] {
        placed[item.requirement] += 1;
    }
    let stuck = worklist.get(depth).map(|i| i.requirement);

    let unmet = reqs
        .iter()
        .enumerate()
        .filter(|(r, req)| placed[*r] < req.occurrences)
        .map(|(r, req)| UnmetRequirement {
            class_id: req.class_id.clone(),
            subject: req.subject.clone(),
            required: req.occurrences,
            placed: placed[r],
            reason: (stuck == Some(r))
                .then(|| "no legal placement left at the deepest point reached".to_string()),
        })
        .collect();

    FailureReport {
        cause,
        unmet: sort_unmet(unmet),
        best_placed: depth,
        total_required: problem.total_occurrences(),
        backtracks,
    }
}
