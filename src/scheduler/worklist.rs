//! Work-list construction and candidate enumeration.
//!
//! # Ordering
//! One [`WorkItem`] per requirement occurrence, sorted by:
//! 1. Static scarcity ascending: the number of (day, start, faculty, room)
//!    tuples that are legal against static unavailability alone.
//! 2. Duration descending.
//! 3. Class id, subject name, occurrence number.
//!
//! Occurrences of one requirement share every key except the last, so they
//! are always adjacent and in occurrence order. The search relies on this
//! to order occurrence `k + 1` after occurrence `k`.
//!
//! # Reference
//! Brélaz (1979), "New Methods to Color the Vertices of a Graph"
//! (most-constrained-first ordering).

use crate::availability::{span_mask, AvailabilityIndex, EntityKind, Placement};
use crate::constraints::ConstraintEngine;
use crate::models::{Day, Problem};

/// One occurrence of a requirement waiting to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    /// Index into the problem's requirements.
    pub requirement: usize,
    /// Zero-based occurrence number within the requirement.
    pub occurrence: usize,
    /// Legal placements before anything is placed.
    pub scarcity: usize,
}

/// Every legal placement of a requirement in the current index state.
///
/// When `after` is set, only starts strictly later than that (day, lecture)
/// are produced. Results come in (day, start, faculty, room) order.
pub fn legal_placements(
    engine: &ConstraintEngine<'_>,
    index: &AvailabilityIndex,
    requirement: usize,
    after: Option<(Day, usize)>,
) -> Vec<Placement> {
    let problem = engine.problem();
    let req = &problem.requirements()[requirement];
    let starts = problem.layout().valid_starts(req.duration);
    let mut out = Vec::new();

    for day in Day::ALL {
        for &start in &starts {
            if after.is_some_and(|bound| (day, start) <= bound) {
                continue;
            }
            if !index.is_free(EntityKind::Class, req.class, day, start, req.duration) {
                continue;
            }
            for &faculty in &req.capable_faculty {
                for &room in &req.compatible_rooms {
                    let candidate = Placement {
                        requirement,
                        day,
                        start,
                        faculty,
                        room,
                    };
                    if engine.can_place(index, &candidate) {
                        out.push(candidate);
                    }
                }
            }
        }
    }
    out
}

/// Whether the `remaining` later occurrences of the candidate's requirement
/// can still fit after the candidate.
///
/// Later occurrences start after the candidate, so on each day from the
/// candidate's on they are bounded by the free class lectures past that
/// point divided by the duration, and by what is left of the daily cap.
/// The bound is optimistic, so a `false` answer is a proof.
pub fn can_finish(
    problem: &Problem,
    index: &AvailabilityIndex,
    daily_limit: Option<u32>,
    candidate: &Placement,
    remaining: usize,
) -> bool {
    if remaining == 0 {
        return true;
    }
    let req = &problem.requirements()[candidate.requirement];
    let lectures = problem.lectures_per_day();
    let full = span_mask(0, lectures);

    let mut capacity = 0;
    for day in Day::ALL.into_iter().filter(|&d| d >= candidate.day) {
        let (from, used) = if day == candidate.day {
            (candidate.start + req.duration, 1)
        } else {
            (0, 0)
        };
        let past = full & !span_mask(0, from);
        let free = (past & !index.day_mask(EntityKind::Class, req.class, day)).count_ones() as usize;
        let mut fit = free / req.duration;
        if let Some(limit) = daily_limit {
            let taken = index.daily_count(candidate.requirement, day) as usize + used;
            fit = fit.min((limit as usize).saturating_sub(taken));
        }
        capacity += fit;
        if capacity >= remaining {
            return true;
        }
    }
    false
}

/// Builds the ordered work-list for a problem.
///
/// `index` should hold static unavailability only.
pub fn build_worklist(engine: &ConstraintEngine<'_>, index: &AvailabilityIndex) -> Vec<WorkItem> {
    let problem = engine.problem();
    let reqs = problem.requirements();

    let mut items: Vec<WorkItem> = reqs
        .iter()
        .enumerate()
        .flat_map(|(r, req)| {
            let scarcity = legal_placements(engine, index, r, None).len();
            (0..req.occurrences).map(move |occurrence| WorkItem {
                requirement: r,
                occurrence,
                scarcity,
            })
        })
        .collect();

    items.sort_by(|a, b| {
        let ra = &reqs[a.requirement];
        let rb = &reqs[b.requirement];
        a.scarcity
            .cmp(&b.scarcity)
            .then(rb.duration.cmp(&ra.duration))
            .then_with(|| ra.class_id.cmp(&rb.class_id))
            .then_with(|| ra.subject.cmp(&rb.subject))
            .then(a.requirement.cmp(&b.requirement))
            .then(a.occurrence.cmp(&b.occurrence))
    });
    items
}
