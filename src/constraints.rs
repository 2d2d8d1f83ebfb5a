//! Hard-constraint engine.
//!
//! Two entry points:
//!
//! - [`ConstraintEngine::check`] / [`ConstraintEngine::can_place`] prune
//!   the search. They test a single candidate placement against the current
//!   [`AvailabilityIndex`] and stop at the first violated rule. Rules are
//!   ordered cheapest first: capability, room kind, room size, span shape,
//!   daily repetition cap, then the three availability lookups.
//! - [`verify`] re-checks a finished [`Timetable`] from scratch, without the
//!   index, against every invariant an accepted timetable must hold.
//!
//! # Invariants checked by `verify`
//! 1. No faculty teaches two overlapping lessons.
//! 2. No room hosts two overlapping lessons.
//! 3. No class attends two overlapping lessons.
//! 4. Every requirement is placed exactly its weekly occurrence count.
//! 5. Room kind suits the subject (lab subject → lab room).
//! 6. Faculty is capable of the subject.
//! 7. No lesson crosses a break or the end of the day.
//!
//! Room size and static unavailability are checked as well.

use itertools::Itertools;
use std::fmt;

use crate::availability::{AvailabilityIndex, EntityKind, Placement};
use crate::models::{Assignment, Problem, Timetable, Violation, ViolationType};

/// First rule a candidate placement breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Faculty is not in the subject's capability set.
    NotCapable,
    /// Room kind does not suit the subject.
    RoomKind,
    /// Room has fewer seats than the class.
    RoomTooSmall,
    /// Span crosses a break or runs past the day.
    InvalidSpan,
    /// The requirement already reached its per-day cap.
    DailyLimit,
    ClassBusy,
    FacultyBusy,
    RoomBusy,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rejection::NotCapable => "faculty not capable",
            Rejection::RoomKind => "room kind mismatch",
            Rejection::RoomTooSmall => "room too small",
            Rejection::InvalidSpan => "span crosses a break or the day end",
            Rejection::DailyLimit => "daily occurrence cap reached",
            Rejection::ClassBusy => "class busy",
            Rejection::FacultyBusy => "faculty busy",
            Rejection::RoomBusy => "room busy",
        })
    }
}

/// Placement predicates bound to one problem.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintEngine<'a> {
    problem: &'a Problem,
    max_daily_occurrences: Option<u32>,
}

impl<'a> ConstraintEngine<'a> {
    /// Creates an engine with no daily cap.
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            max_daily_occurrences: None,
        }
    }

    /// Caps occurrences of one requirement per day.
    pub fn with_daily_limit(mut self, limit: Option<u32>) -> Self {
        self.max_daily_occurrences = limit;
        self
    }

    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Checks a candidate against every hard rule.
    pub fn check(&self, index: &AvailabilityIndex, p: &Placement) -> Result<(), Rejection> {
        let req = &self.problem.requirements()[p.requirement];
        let faculty = &self.problem.faculty()[p.faculty];
        let room = &self.problem.rooms()[p.room];
        let class = &self.problem.classes()[req.class];

        if !(faculty.can_teach(&req.subject) || faculty.can_teach(&req.subject_short)) {
            return Err(Rejection::NotCapable);
        }
        if !req.kind.accepts_room(room.kind) {
            return Err(Rejection::RoomKind);
        }
        if !room.fits(class.size) {
            return Err(Rejection::RoomTooSmall);
        }
        if !self.problem.layout().span_fits(p.start, req.duration) {
            return Err(Rejection::InvalidSpan);
        }
        if let Some(limit) = self.max_daily_occurrences {
            if index.daily_count(p.requirement, p.day) >= limit {
                return Err(Rejection::DailyLimit);
            }
        }
        if !index.is_free(EntityKind::Class, req.class, p.day, p.start, req.duration) {
            return Err(Rejection::ClassBusy);
        }
        if !index.is_free(EntityKind::Faculty, p.faculty, p.day, p.start, req.duration) {
            return Err(Rejection::FacultyBusy);
        }
        if !index.is_free(EntityKind::Room, p.room, p.day, p.start, req.duration) {
            return Err(Rejection::RoomBusy);
        }
        Ok(())
    }

    /// Whether a candidate satisfies every hard rule.
    #[inline]
    pub fn can_place(&self, index: &AvailabilityIndex, p: &Placement) -> bool {
        self.check(index, p).is_ok()
    }
}

/// Checks a finished timetable against all hard constraints.
///
/// Returns every violation found; an empty vector means the timetable is
/// valid for `problem`.
pub fn verify(problem: &Problem, timetable: &Timetable) -> Vec<Violation> {
    let mut violations = Vec::new();
    let layout = problem.layout();

    for a in timetable.assignments() {
        let Some(req) = problem.requirement(&a.class_id, &a.subject) else {
            violations.push(Violation::new(
                ViolationType::UnknownEntity,
                &a.class_id,
                format!("Class '{}' has no requirement for '{}'", a.class_id, a.subject),
            ));
            continue;
        };
        let Some(f) = problem.faculty_index(&a.faculty) else {
            violations.push(Violation::new(
                ViolationType::UnknownEntity,
                &a.faculty,
                format!("Unknown faculty '{}'", a.faculty),
            ));
            continue;
        };
        let Some(r) = problem.room_index(&a.room) else {
            violations.push(Violation::new(
                ViolationType::UnknownEntity,
                &a.room,
                format!("Unknown room '{}'", a.room),
            ));
            continue;
        };
        let faculty = &problem.faculty()[f];
        let room = &problem.rooms()[r];
        let class = &problem.classes()[req.class];

        if a.duration != req.duration || !layout.span_fits(a.start, a.duration) {
            violations.push(Violation::new(
                ViolationType::InvalidSpan,
                &a.class_id,
                format!(
                    "{} {} on {} L{} spans {} slot(s) (needs {} within one break-free run)",
                    a.class_id,
                    a.subject,
                    a.day,
                    a.start + 1,
                    a.duration,
                    req.duration
                ),
            ));
        }
        if !req.capable_faculty.contains(&f) {
            violations.push(Violation::new(
                ViolationType::FacultyNotCapable,
                &faculty.short,
                format!("{} cannot teach {}", faculty.short, a.subject),
            ));
        }
        if !req.kind.accepts_room(room.kind) {
            violations.push(Violation::new(
                ViolationType::RoomKindMismatch,
                &room.id,
                format!("{:?} subject {} placed in {:?} room {}", req.kind, a.subject, room.kind, room.id),
            ));
        }
        if !room.fits(class.size) {
            violations.push(Violation::new(
                ViolationType::RoomTooSmall,
                &room.id,
                format!("Room {} is too small for {}", room.id, class.id),
            ));
        }
        let blocked = faculty
            .unavailable
            .iter()
            .chain(room.unavailable.iter())
            .any(|s| a.covers(s.day, s.lecture));
        if blocked {
            violations.push(Violation::new(
                ViolationType::Unavailable,
                &a.class_id,
                format!(
                    "{} {} on {} L{} uses an unavailable faculty or room slot",
                    a.class_id,
                    a.subject,
                    a.day,
                    a.start + 1
                ),
            ));
        }
    }

    check_overlaps(
        timetable,
        |a| a.faculty.to_lowercase(),
        ViolationType::FacultyDoubleBooked,
        "Faculty",
        &mut violations,
    );
    check_overlaps(
        timetable,
        |a| a.room.clone(),
        ViolationType::RoomDoubleBooked,
        "Room",
        &mut violations,
    );
    check_overlaps(
        timetable,
        |a| a.class_id.clone(),
        ViolationType::ClassDoubleBooked,
        "Class",
        &mut violations,
    );

    for req in problem.requirements() {
        let placed = timetable.occurrences(&req.class_id, &req.subject);
        if placed != req.occurrences {
            violations.push(Violation::new(
                ViolationType::OccurrenceMismatch,
                &req.class_id,
                format!(
                    "{} {}: {placed} of {} weekly occurrences placed",
                    req.class_id, req.subject, req.occurrences
                ),
            ));
        }
    }

    violations
}

fn check_overlaps<K, F>(
    timetable: &Timetable,
    key: F,
    violation_type: ViolationType,
    label: &str,
    violations: &mut Vec<Violation>,
) where
    K: Ord + std::hash::Hash + Eq + fmt::Display,
    F: Fn(&Assignment) -> K,
{
    let groups = timetable
        .assignments()
        .iter()
        .into_group_map_by(|a| key(*a));

    for (entity, lessons) in groups.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
        for (i, a) in lessons.iter().enumerate() {
            for b in &lessons[i + 1..] {
                if a.overlaps(b) {
                    violations.push(Violation::new(
                        violation_type.clone(),
                        entity.to_string(),
                        format!(
                            "{label} {entity} double-booked on {}: {} {} (L{}) and {} {} (L{})",
                            a.day,
                            a.class_id,
                            a.subject,
                            a.start + 1,
                            b.class_id,
                            b.subject,
                            b.start + 1
                        ),
                    ));
                }
            }
        }
    }
}
