//! Built-in soft rules.
//!
//! | Rule | Prefers |
//! |------|---------|
//! | `PREF` | Faculty who ranked this subject high for this class |
//! | `LOAD` | Faculty with fewer slots taught so far |
//! | `CONTIG` | Lessons adjacent to the class's other lessons that day |
//! | `SPREAD` | Days on which the subject is not yet taught |
//! | `ROOM` | Rooms of the subject's natural kind |
//!
//! # Score Convention
//! All rules return higher scores for more desirable candidates, in
//! `0.0..=1.0`.

use super::{RankContext, RuleScore, SoftRule};
use crate::availability::{span_mask, EntityKind, Placement};

/// Faculty preference rank.
///
/// A faculty member's preference list for the class scores its first entry
/// `1.0`, then linearly less: rank `r` of `n` scores `(n - r) / n`. Subjects
/// missing from the list score `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct FacultyPreference;

impl SoftRule for FacultyPreference {
    fn name(&self) -> &'static str {
        "PREF"
    }

    fn evaluate(&self, candidate: &Placement, context: &RankContext<'_>) -> RuleScore {
        let req = context.requirement(candidate.requirement);
        let faculty = &context.problem.faculty()[candidate.faculty];
        let rank = faculty
            .preference_rank(&req.class_id, &req.subject)
            .or_else(|| faculty.preference_rank(&req.class_id, &req.subject_short));
        match rank {
            Some((r, n)) if n > 0 => (n - r) as f64 / n as f64,
            _ => 0.0,
        }
    }

    fn description(&self) -> &'static str {
        "Faculty Preference Rank"
    }
}

/// Teaching load balance.
///
/// Scores `1 / (1 + load)` where `load` is the number of slots the faculty
/// already teaches in the partial timetable.
#[derive(Debug, Clone, Copy)]
pub struct LoadBalance;

impl SoftRule for LoadBalance {
    fn name(&self) -> &'static str {
        "LOAD"
    }

    fn evaluate(&self, candidate: &Placement, context: &RankContext<'_>) -> RuleScore {
        1.0 / (1.0 + context.index.faculty_load(candidate.faculty) as f64)
    }

    fn description(&self) -> &'static str {
        "Faculty Load Balance"
    }
}

/// Contiguity of a class's day.
///
/// `1.0` when the lesson directly follows or precedes another lesson of
/// the class on that day, `0.5` when the class has nothing else that day,
/// `0.0` when it would leave a gap. Adjacency is by lecture number, so a
/// break between two lectures is not a gap.
#[derive(Debug, Clone, Copy)]
pub struct Contiguity;

impl SoftRule for Contiguity {
    fn name(&self) -> &'static str {
        "CONTIG"
    }

    fn evaluate(&self, candidate: &Placement, context: &RankContext<'_>) -> RuleScore {
        let req = context.requirement(candidate.requirement);
        let busy = context
            .index
            .day_mask(EntityKind::Class, req.class, candidate.day);
        if busy == 0 {
            return 0.5;
        }
        let span = span_mask(candidate.start, req.duration);
        if busy & ((span << 1) | (span >> 1)) != 0 {
            1.0
        } else {
            0.0
        }
    }

    fn description(&self) -> &'static str {
        "Class Day Contiguity"
    }
}

/// Spread of a subject over the week.
///
/// `1.0` on days where the requirement has no occurrence yet, `0.0`
/// otherwise.
#[derive(Debug, Clone, Copy)]
pub struct DaySpread;

impl SoftRule for DaySpread {
    fn name(&self) -> &'static str {
        "SPREAD"
    }

    fn evaluate(&self, candidate: &Placement, context: &RankContext<'_>) -> RuleScore {
        if context
            .index
            .daily_count(candidate.requirement, candidate.day)
            == 0
        {
            1.0
        } else {
            0.0
        }
    }

    fn description(&self) -> &'static str {
        "Subject Day Spread"
    }
}

/// Room kind fit.
///
/// `1.0` when the room is of the kind the subject prefers (or the subject
/// has no preference), `0.0` otherwise. Keeps lectures out of lab rooms
/// while a classroom is available.
#[derive(Debug, Clone, Copy)]
pub struct RoomFit;

impl SoftRule for RoomFit {
    fn name(&self) -> &'static str {
        "ROOM"
    }

    fn evaluate(&self, candidate: &Placement, context: &RankContext<'_>) -> RuleScore {
        let req = context.requirement(candidate.requirement);
        let room = &context.problem.rooms()[candidate.room];
        match req.kind.preferred_room() {
            Some(kind) if kind != room.kind => 0.0,
            _ => 1.0,
        }
    }

    fn description(&self) -> &'static str {
        "Room Kind Fit"
    }
}
