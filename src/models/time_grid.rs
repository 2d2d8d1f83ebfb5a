//! Weekly time structure.
//!
//! A [`TimeGrid`] describes one teaching day as an ordered sequence of
//! lecture and break slots. The same grid applies to every weekday.
//! Lecture slots are numbered `L1..Ln` in order of appearance; breaks are
//! never assignment targets and are not numbered.
//!
//! # Spans
//!
//! A lesson of duration `d` starting at lecture index `i` occupies lectures
//! `i..i + d`. The span is legal only if all of them fall on the same day and
//! no break slot sits between the first and the last one. [`GridLayout`]
//! answers this in O(1) after a single pass over the grid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of lecture slots per day.
///
/// Availability is tracked with one `u64` bitmask per entity per day.
pub const MAX_LECTURES_PER_DAY: usize = 64;

/// A teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    /// All teaching days, Monday first.
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Number of teaching days per week.
    pub const COUNT: usize = 5;

    /// Zero-based position in the week.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day at a zero-based position.
    pub fn from_index(index: usize) -> Option<Day> {
        Self::ALL.get(index).copied()
    }

    /// English day name.
    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wall-clock time of day with minute precision.
///
/// Serialised as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

/// Error returned when a clock time cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock time '{0}', expected HH:MM")]
pub struct ClockTimeParseError(pub String);

impl ClockTime {
    /// Creates a clock time, returning `None` when out of range.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self {
                minutes: u16::from(hour) * 60 + u16::from(minute),
            })
        } else {
            None
        }
    }

    /// Creates a clock time from minutes after midnight (clamped to 23:59).
    pub fn from_minutes(minutes: u16) -> Self {
        Self {
            minutes: minutes.min(24 * 60 - 1),
        }
    }

    /// Minutes after midnight.
    #[inline]
    pub fn minutes(self) -> u16 {
        self.minutes
    }

    pub fn hour(self) -> u8 {
        (self.minutes / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.minutes % 60) as u8
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ClockTimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ClockTimeParseError(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        let hour: u8 = h.parse().map_err(|_| err())?;
        let minute: u8 = m.parse().map_err(|_| err())?;
        ClockTime::new(hour, minute).ok_or_else(err)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ClockTimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Whether a grid slot holds teaching or is a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Lecture,
    Break,
}

/// One entry of the daily grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSlot {
    /// Lecture or break.
    pub kind: SlotKind,
    /// Start time (inclusive).
    pub start: ClockTime,
    /// End time (exclusive).
    pub end: ClockTime,
}

impl GridSlot {
    /// Length of the slot in minutes (0 if the times are reversed).
    pub fn length_minutes(&self) -> u16 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }
}

/// Daily slot structure shared by all weekdays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrid {
    /// Ordered grid entries for one day.
    pub slots: Vec<GridSlot>,
}

impl TimeGrid {
    /// Creates an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `lectures` back-to-back one-hour lectures starting at 09:00.
    pub fn uniform(lectures: usize) -> Self {
        let mut grid = Self::new();
        let mut start = 9 * 60u16;
        for _ in 0..lectures {
            let from = ClockTime::from_minutes(start);
            let to = ClockTime::from_minutes(start.saturating_add(60));
            grid = grid.with_lecture(from, to);
            start = start.saturating_add(60);
        }
        grid
    }

    /// Appends a lecture slot.
    pub fn with_lecture(mut self, start: ClockTime, end: ClockTime) -> Self {
        self.slots.push(GridSlot {
            kind: SlotKind::Lecture,
            start,
            end,
        });
        self
    }

    /// Appends a break slot.
    pub fn with_break(mut self, start: ClockTime, end: ClockTime) -> Self {
        self.slots.push(GridSlot {
            kind: SlotKind::Break,
            start,
            end,
        });
        self
    }

    /// Number of lecture slots per day.
    pub fn lecture_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.kind == SlotKind::Lecture)
            .count()
    }

    /// Label of a lecture index (`0 → "L1"`).
    pub fn label(lecture: usize) -> String {
        format!("L{}", lecture + 1)
    }

    /// Labels of all lecture slots in order.
    pub fn lecture_labels(&self) -> Vec<String> {
        (0..self.lecture_count()).map(Self::label).collect()
    }

    /// Start and end time of a lecture slot.
    pub fn lecture_time(&self, lecture: usize) -> Option<(ClockTime, ClockTime)> {
        self.slots
            .iter()
            .filter(|s| s.kind == SlotKind::Lecture)
            .nth(lecture)
            .map(|s| (s.start, s.end))
    }

    /// Precomputes span legality.
    pub fn layout(&self) -> GridLayout {
        let mut run_of = Vec::new();
        let mut run = 0;
        let mut previous_was_break = false;
        for slot in &self.slots {
            match slot.kind {
                SlotKind::Lecture => {
                    if previous_was_break && !run_of.is_empty() {
                        run += 1;
                    }
                    run_of.push(run);
                    previous_was_break = false;
                }
                SlotKind::Break => previous_was_break = true,
            }
        }
        GridLayout { run_of }
    }
}

/// Break-aware view of the lecture slots of a [`TimeGrid`].
///
/// Lectures that are not separated by a break share a run id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    run_of: Vec<usize>,
}

impl GridLayout {
    /// Number of lecture slots per day.
    #[inline]
    pub fn lecture_count(&self) -> usize {
        self.run_of.len()
    }

    /// Whether a span of `duration` lectures starting at `start` stays
    /// within the day and does not cross a break.
    #[inline]
    pub fn span_fits(&self, start: usize, duration: usize) -> bool {
        if duration == 0 {
            return false;
        }
        let last = start + duration - 1;
        last < self.run_of.len() && self.run_of[start] == self.run_of[last]
    }

    /// All legal start indices for a span of `duration` lectures.
    pub fn valid_starts(&self, duration: usize) -> Vec<usize> {
        (0..self.lecture_count())
            .filter(|&s| self.span_fits(s, duration))
            .collect()
    }
}

/// Reference to one lecture slot of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRef {
    /// Teaching day.
    pub day: Day,
    /// Zero-based lecture index (`0` is `L1`).
    pub lecture: usize,
}

impl SlotRef {
    /// Creates a slot reference.
    pub fn new(day: Day, lecture: usize) -> Self {
        Self { day, lecture }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_clock_time_parse() {
        let c = t("09:30");
        assert_eq!(c.hour(), 9);
        assert_eq!(c.minute(), 30);
        assert_eq!(c.to_string(), "09:30");
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("9h30".parse::<ClockTime>().is_err());
        assert!("".parse::<ClockTime>().is_err());
    }

    #[test]
    fn test_clock_time_serde() {
        let json = serde_json::to_string(&t("13:05")).unwrap();
        assert_eq!(json, "\"13:05\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t("13:05"));
        assert!(serde_json::from_str::<ClockTime>("\"25:00\"").is_err());
    }

    #[test]
    fn test_uniform_grid() {
        let grid = TimeGrid::uniform(6);
        assert_eq!(grid.lecture_count(), 6);
        assert_eq!(grid.lecture_labels()[5], "L6");
        assert_eq!(grid.lecture_time(0), Some((t("09:00"), t("10:00"))));
        assert_eq!(grid.lecture_time(6), None);
    }

    #[test]
    fn test_layout_breaks_split_runs() {
        // L1 L2 | break | L3 L4 L5
        let grid = TimeGrid::new()
            .with_lecture(t("09:00"), t("10:00"))
            .with_lecture(t("10:00"), t("11:00"))
            .with_break(t("11:00"), t("11:30"))
            .with_lecture(t("11:30"), t("12:30"))
            .with_lecture(t("12:30"), t("13:30"))
            .with_lecture(t("13:30"), t("14:30"));
        let layout = grid.layout();

        assert_eq!(layout.lecture_count(), 5);
        assert!(layout.span_fits(0, 2));
        assert!(!layout.span_fits(1, 2)); // crosses the break
        assert!(layout.span_fits(2, 3));
        assert!(!layout.span_fits(3, 3)); // runs past the day
        assert!(!layout.span_fits(0, 0));
        assert_eq!(layout.valid_starts(2), vec![0, 2, 3]);
    }

    #[test]
    fn test_leading_break_does_not_shift_runs() {
        let grid = TimeGrid::new()
            .with_break(t("08:30"), t("09:00"))
            .with_lecture(t("09:00"), t("10:00"))
            .with_lecture(t("10:00"), t("11:00"));
        assert!(grid.layout().span_fits(0, 2));
    }

    #[test]
    fn test_day_order() {
        assert!(Day::Monday < Day::Friday);
        assert_eq!(Day::from_index(2), Some(Day::Wednesday));
        assert_eq!(Day::from_index(5), None);
        assert_eq!(Day::Thursday.index(), 3);
        assert_eq!(Day::Friday.to_string(), "Friday");
    }
}
