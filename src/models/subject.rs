//! Subject model.
//!
//! A subject is taught to exactly one class group and is placed as a number
//! of weekly occurrences, each spanning `duration_slots` consecutive lecture
//! slots.
//!
//! # Kind detection
//!
//! Input records may omit the kind and duration. They are then inferred
//! from the subject name: practical keywords (`lab`, `laboratory`,
//! `practical`, `workshop`, `hands-on`) give a two-slot lab, project
//! keywords (`project`, `capstone`, `thesis`) a two-slot project, anything
//! else a single-slot lecture.

use serde::{Deserialize, Serialize};

use super::RoomKind;

/// Shortest allowed lesson span in slots.
pub const MIN_DURATION_SLOTS: u8 = 1;
/// Longest allowed lesson span in slots.
pub const MAX_DURATION_SLOTS: u8 = 4;

const LAB_KEYWORDS: [&str; 5] = ["lab", "laboratory", "practical", "workshop", "hands-on"];
const PROJECT_KEYWORDS: [&str; 3] = ["project", "capstone", "thesis"];

/// Teaching format of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// Theory lecture; prefers a classroom but may use any room.
    Lecture,
    /// Practical session; needs a lab room.
    Lab,
    /// Project work; any room will do.
    Project,
}

impl SubjectKind {
    /// Infers the kind from a subject name.
    pub fn detect(name: &str) -> Self {
        let lower = name.to_lowercase();
        if LAB_KEYWORDS.iter().any(|k| lower.contains(k)) {
            SubjectKind::Lab
        } else if PROJECT_KEYWORDS.iter().any(|k| lower.contains(k)) {
            SubjectKind::Project
        } else {
            SubjectKind::Lecture
        }
    }

    /// Span used when the input does not give one.
    pub fn default_duration(self) -> u8 {
        match self {
            SubjectKind::Lecture => 1,
            SubjectKind::Lab | SubjectKind::Project => 2,
        }
    }

    /// Whether a room of the given kind can host this subject.
    ///
    /// Only labs are restricted: a lab runs in a lab room, anything else
    /// may use any room.
    pub fn accepts_room(self, room: RoomKind) -> bool {
        match self {
            SubjectKind::Lab => room == RoomKind::Lab,
            SubjectKind::Lecture | SubjectKind::Project => true,
        }
    }

    /// Room kind this subject should use when there is a choice.
    pub fn preferred_room(self) -> Option<RoomKind> {
        match self {
            SubjectKind::Lecture => Some(RoomKind::Classroom),
            SubjectKind::Lab => Some(RoomKind::Lab),
            SubjectKind::Project => None,
        }
    }
}

/// Curriculum entry for one class group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSpec {
    /// Subject name (unique within the class).
    pub name: String,
    /// Short code used in compact views.
    #[serde(default)]
    pub short: String,
    /// Teaching format; detected from the name when absent.
    #[serde(default)]
    pub kind: Option<SubjectKind>,
    /// Consecutive slots per occurrence; kind default when absent.
    #[serde(default)]
    pub duration_slots: Option<u8>,
    /// Slot-hours per week. Must be a multiple of the duration.
    pub weekly_hours: u32,
}

impl SubjectSpec {
    /// Creates a subject spec with the given weekly hours.
    pub fn new(name: impl Into<String>, weekly_hours: u32) -> Self {
        Self {
            name: name.into(),
            short: String::new(),
            kind: None,
            duration_slots: None,
            weekly_hours,
        }
    }

    /// Sets the short code.
    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    /// Sets the kind explicitly.
    pub fn with_kind(mut self, kind: SubjectKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the span in slots.
    pub fn with_duration(mut self, slots: u8) -> Self {
        self.duration_slots = Some(slots);
        self
    }

    /// Kind after detection.
    pub fn resolved_kind(&self) -> SubjectKind {
        self.kind.unwrap_or_else(|| SubjectKind::detect(&self.name))
    }

    /// Duration after applying the kind default.
    pub fn resolved_duration(&self) -> u8 {
        self.duration_slots
            .unwrap_or_else(|| self.resolved_kind().default_duration())
    }

    /// Short code, falling back to the name.
    pub fn display_short(&self) -> &str {
        if self.short.is_empty() {
            &self.name
        } else {
            &self.short
        }
    }

    /// Whether `key` names this subject (case-insensitive name or short code).
    pub fn matches(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key)
            || (!self.short.is_empty() && self.short.eq_ignore_ascii_case(key))
    }
}
