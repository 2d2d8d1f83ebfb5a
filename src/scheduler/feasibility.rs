//! Pre-search infeasibility proofs.
//!
//! Cheap counting arguments run before the search starts. Each one is
//! sound: when it fires, no complete timetable exists, so the run can
//! report [`FailureCause::Infeasible`] without exploring the search tree.
//!
//! | Check | Fires when |
//! |-------|------------|
//! | Capability | no faculty can teach the subject |
//! | Room | no room has a suitable kind and size |
//! | Span | the grid has no break-free run long enough |
//! | Placement | every tuple is blocked by static unavailability |
//! | Daily cap | occurrences exceed days times the per-day cap |
//! | Class demand | a class needs more slots than the week has |
//! | Sole faculty | requirements bound to one faculty exceed its free slots |
//! | Sole room | requirements bound to one room exceed its free slots |

use std::collections::BTreeMap;

use crate::availability::{AvailabilityIndex, EntityKind};
use crate::error::{FailureCause, FailureReport, UnmetRequirement};
use crate::models::{Day, LessonRequirement, Problem, SubjectKind};

use super::worklist::WorkItem;

/// Runs every check and returns a report if any of them proves the
/// problem infeasible.
pub fn analyse(
    problem: &Problem,
    index: &AvailabilityIndex,
    worklist: &[WorkItem],
    daily_limit: Option<u32>,
) -> Option<FailureReport> {
    let reqs = problem.requirements();
    let mut reasons: BTreeMap<usize, String> = BTreeMap::new();

    for (r, req) in reqs.iter().enumerate() {
        if let Some(reason) = requirement_reason(problem, req, daily_limit) {
            reasons.insert(r, reason);
        }
    }
    for item in worklist.iter().filter(|item| item.scarcity == 0) {
        reasons.entry(item.requirement).or_insert_with(|| {
            "every slot is blocked for all capable faculty and compatible rooms".to_string()
        });
    }

    let week = problem.lectures_per_day() * Day::COUNT;
    for (c, class) in problem.classes().iter().enumerate() {
        let demand: usize = reqs
            .iter()
            .filter(|r| r.class == c)
            .map(LessonRequirement::slot_demand)
            .sum();
        if demand > week {
            let reason = format!(
                "class {} needs {demand} slots but the week has {week}",
                class.id
            );
            for (r, _) in reqs.iter().enumerate().filter(|(_, r)| r.class == c) {
                reasons.entry(r).or_insert_with(|| reason.clone());
            }
        }
    }

    sole_resource_check(
        reqs,
        |req| &req.capable_faculty,
        |f| index.free_slots(EntityKind::Faculty, f),
        |f| format!("sole faculty {}", problem.faculty()[f].short),
        &mut reasons,
    );
    sole_resource_check(
        reqs,
        |req| &req.compatible_rooms,
        |r| index.free_slots(EntityKind::Room, r),
        |r| format!("sole room {}", problem.rooms()[r].id),
        &mut reasons,
    );

    if reasons.is_empty() {
        return None;
    }

    let unmet = reasons
        .into_iter()
        .map(|(r, reason)| UnmetRequirement {
            class_id: reqs[r].class_id.clone(),
            subject: reqs[r].subject.clone(),
            required: reqs[r].occurrences,
            placed: 0,
            reason: Some(reason),
        })
        .collect();

    Some(FailureReport {
        cause: FailureCause::Infeasible,
        unmet: sort_unmet(unmet),
        best_placed: 0,
        total_required: problem.total_occurrences(),
        backtracks: 0,
    })
}

fn requirement_reason(
    problem: &Problem,
    req: &LessonRequirement,
    daily_limit: Option<u32>,
) -> Option<String> {
    if req.capable_faculty.is_empty() {
        return Some("no capable faculty".to_string());
    }
    if req.compatible_rooms.is_empty() {
        let wanted = match req.kind {
            SubjectKind::Lab => "lab room",
            SubjectKind::Lecture | SubjectKind::Project => "room",
        };
        let any_kind = problem
            .rooms()
            .iter()
            .any(|room| req.kind.accepts_room(room.kind));
        return Some(if any_kind {
            format!("no {wanted} large enough for the class")
        } else {
            format!("no {wanted} available")
        });
    }
    if problem.layout().valid_starts(req.duration).is_empty() {
        return Some(format!(
            "no break-free run of {} lecture slot(s) in the day",
            req.duration
        ));
    }
    if let Some(limit) = daily_limit {
        let max = limit as usize * Day::COUNT;
        if req.occurrences > max {
            return Some(format!(
                "{} occurrences exceed {limit} per day over {} days",
                req.occurrences,
                Day::COUNT
            ));
        }
    }
    None
}

fn sole_resource_check<'p>(
    reqs: &'p [LessonRequirement],
    candidates: impl Fn(&'p LessonRequirement) -> &'p Vec<usize>,
    free_slots: impl Fn(usize) -> usize,
    describe: impl Fn(usize) -> String,
    reasons: &mut BTreeMap<usize, String>,
) {
    let mut bound: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (r, req) in reqs.iter().enumerate() {
        if let [only] = candidates(req).as_slice() {
            bound.entry(*only).or_default().push(r);
        }
    }
    for (resource, bound_reqs) in bound {
        let demand: usize = bound_reqs.iter().map(|&r| reqs[r].slot_demand()).sum();
        let free = free_slots(resource);
        if demand > free {
            let reason = format!(
                "{} has {free} free slots for {demand} required",
                describe(resource)
            );
            for r in bound_reqs {
                reasons.entry(r).or_insert_with(|| reason.clone());
            }
        }
    }
}

/// Orders unmet requirements by class and subject.
pub fn sort_unmet(mut unmet: Vec<UnmetRequirement>) -> Vec<UnmetRequirement> {
    unmet.sort_by(|a, b| {
        a.class_id
            .cmp(&b.class_id)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    unmet
}
