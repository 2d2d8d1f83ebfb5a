//! Availability index.
//!
//! Tracks which faculty, rooms and classes are busy at which lecture slot
//! while the scheduler builds a timetable. Each (entity, day) pair is a
//! `u64` bitmask over lecture indices, so a free-check or a reservation of a
//! span is a constant number of mask operations.
//!
//! Static unavailability (faculty and room `unavailable` slots) is reserved
//! once at construction and never released.
//!
//! The index also keeps two counters the ranker and the constraint engine
//! read: per-faculty weekly load in slots and per-(requirement, day)
//! occurrence counts. Both move in lock-step with [`AvailabilityIndex::place`]
//! and [`AvailabilityIndex::unplace`].

use std::fmt;

use crate::models::{Day, Problem, SlotRef};

/// Kind of entity whose time is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Faculty,
    Room,
    Class,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Faculty => "faculty",
            EntityKind::Room => "room",
            EntityKind::Class => "class",
        })
    }
}

/// One occurrence of a requirement placed at a concrete slot with a
/// concrete faculty and room. All fields are indices into the [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Placement {
    /// Index into [`Problem::requirements`].
    pub requirement: usize,
    pub day: Day,
    /// First lecture index.
    pub start: usize,
    /// Index into [`Problem::faculty`].
    pub faculty: usize,
    /// Index into [`Problem::rooms`].
    pub room: usize,
}

/// A reservation hit a slot that was already taken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} #{id} is already booked on {day} within L{}..L{}", .start + 1, .start + .duration)]
pub struct Conflict {
    pub kind: EntityKind,
    pub id: usize,
    pub day: Day,
    pub start: usize,
    pub duration: usize,
}

type WeekMask = [u64; Day::COUNT];

/// Busy-slot bitmasks for every faculty, room and class.
#[derive(Debug, Clone)]
pub struct AvailabilityIndex {
    lectures: usize,
    faculty: Vec<WeekMask>,
    rooms: Vec<WeekMask>,
    classes: Vec<WeekMask>,
    faculty_load: Vec<usize>,
    daily_count: Vec<[u32; Day::COUNT]>,
}

/// Bitmask of lectures `start..start + duration`.
#[inline]
pub fn span_mask(start: usize, duration: usize) -> u64 {
    if duration == 0 || start >= 64 {
        return 0;
    }
    let width = if duration >= 64 {
        u64::MAX
    } else {
        (1u64 << duration) - 1
    };
    width << start
}

impl AvailabilityIndex {
    /// Creates an index with every static unavailability already reserved.
    pub fn new(problem: &Problem) -> Self {
        let mut index = Self {
            lectures: problem.lectures_per_day(),
            faculty: vec![[0; Day::COUNT]; problem.faculty().len()],
            rooms: vec![[0; Day::COUNT]; problem.rooms().len()],
            classes: vec![[0; Day::COUNT]; problem.classes().len()],
            faculty_load: vec![0; problem.faculty().len()],
            daily_count: vec![[0; Day::COUNT]; problem.requirements().len()],
        };

        for (f, faculty) in problem.faculty().iter().enumerate() {
            index.block(EntityKind::Faculty, f, &faculty.unavailable);
        }
        for (r, room) in problem.rooms().iter().enumerate() {
            index.block(EntityKind::Room, r, &room.unavailable);
        }
        index
    }

    fn block(&mut self, kind: EntityKind, id: usize, slots: &[SlotRef]) {
        for slot in slots {
            if slot.lecture < self.lectures {
                self.masks_mut(kind)[id][slot.day.index()] |= span_mask(slot.lecture, 1);
            }
        }
    }

    fn masks(&self, kind: EntityKind) -> &[WeekMask] {
        match kind {
            EntityKind::Faculty => &self.faculty,
            EntityKind::Room => &self.rooms,
            EntityKind::Class => &self.classes,
        }
    }

    fn masks_mut(&mut self, kind: EntityKind) -> &mut Vec<WeekMask> {
        match kind {
            EntityKind::Faculty => &mut self.faculty,
            EntityKind::Room => &mut self.rooms,
            EntityKind::Class => &mut self.classes,
        }
    }

    /// Lecture slots per day.
    pub fn lectures_per_day(&self) -> usize {
        self.lectures
    }

    /// Whether the entity is free for the whole span.
    #[inline]
    pub fn is_free(
        &self,
        kind: EntityKind,
        id: usize,
        day: Day,
        start: usize,
        duration: usize,
    ) -> bool {
        self.masks(kind)
            .get(id)
            .map(|week| week[day.index()] & span_mask(start, duration) == 0)
            .unwrap_or(false)
    }

    /// Whether the entity is busy at a single lecture.
    #[inline]
    pub fn is_busy(&self, kind: EntityKind, id: usize, day: Day, lecture: usize) -> bool {
        !self.is_free(kind, id, day, lecture, 1)
    }

    /// Busy mask of an entity on a day.
    pub fn day_mask(&self, kind: EntityKind, id: usize, day: Day) -> u64 {
        self.masks(kind)
            .get(id)
            .map(|week| week[day.index()])
            .unwrap_or(0)
    }

    /// Free lecture slots of an entity over the whole week.
    pub fn free_slots(&self, kind: EntityKind, id: usize) -> usize {
        let full = span_mask(0, self.lectures);
        self.masks(kind)
            .get(id)
            .map(|week| {
                week.iter()
                    .map(|m| (full & !m).count_ones() as usize)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Marks a span busy.
    ///
    /// # Errors
    /// [`Conflict`] if any slot of the span is already taken; the index is
    /// left unchanged.
    pub fn reserve(
        &mut self,
        kind: EntityKind,
        id: usize,
        day: Day,
        start: usize,
        duration: usize,
    ) -> Result<(), Conflict> {
        if !self.is_free(kind, id, day, start, duration) {
            return Err(Conflict {
                kind,
                id,
                day,
                start,
                duration,
            });
        }
        self.masks_mut(kind)[id][day.index()] |= span_mask(start, duration);
        Ok(())
    }

    /// Marks a span free again.
    pub fn release(&mut self, kind: EntityKind, id: usize, day: Day, start: usize, duration: usize) {
        if let Some(week) = self.masks_mut(kind).get_mut(id) {
            week[day.index()] &= !span_mask(start, duration);
        }
    }

    /// Reserves class, faculty and room for a placement, all or nothing,
    /// and updates the load counters.
    pub fn place(&mut self, placement: &Placement, class: usize, duration: usize) -> Result<(), Conflict> {
        let Placement {
            day,
            start,
            faculty,
            room,
            requirement,
        } = *placement;

        for (kind, id) in [
            (EntityKind::Class, class),
            (EntityKind::Faculty, faculty),
            (EntityKind::Room, room),
        ] {
            if !self.is_free(kind, id, day, start, duration) {
                return Err(Conflict {
                    kind,
                    id,
                    day,
                    start,
                    duration,
                });
            }
        }

        self.reserve(EntityKind::Class, class, day, start, duration)?;
        self.reserve(EntityKind::Faculty, faculty, day, start, duration)?;
        self.reserve(EntityKind::Room, room, day, start, duration)?;
        self.faculty_load[faculty] += duration;
        self.daily_count[requirement][day.index()] += 1;
        Ok(())
    }

    /// Undoes [`AvailabilityIndex::place`].
    pub fn unplace(&mut self, placement: &Placement, class: usize, duration: usize) {
        let Placement {
            day,
            start,
            faculty,
            room,
            requirement,
        } = *placement;
        self.release(EntityKind::Class, class, day, start, duration);
        self.release(EntityKind::Faculty, faculty, day, start, duration);
        self.release(EntityKind::Room, room, day, start, duration);
        self.faculty_load[faculty] = self.faculty_load[faculty].saturating_sub(duration);
        let count = &mut self.daily_count[requirement][day.index()];
        *count = count.saturating_sub(1);
    }

    /// Slots currently taught by a faculty member.
    pub fn faculty_load(&self, faculty: usize) -> usize {
        self.faculty_load.get(faculty).copied().unwrap_or(0)
    }

    /// Occurrences of a requirement currently placed on a day.
    pub fn daily_count(&self, requirement: usize, day: Day) -> u32 {
        self.daily_count
            .get(requirement)
            .map(|days| days[day.index()])
            .unwrap_or(0)
    }
}
