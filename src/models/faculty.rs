//! Faculty (teaching staff) model.
//!
//! A faculty member can teach the subjects in their capability set and may
//! rank, per class, the subjects they would prefer to take. Preferences are
//! soft: they only order otherwise legal candidates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::SlotRef;

/// A member of the teaching staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    /// Full name.
    pub name: String,
    /// Unique short code (e.g. `"PX"`).
    pub short: String,
    /// Position or title.
    #[serde(default)]
    pub position: String,
    /// Subjects this faculty can teach (names or short codes).
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Ranked subject preferences per class id, most preferred first.
    #[serde(default)]
    pub preferences: BTreeMap<String, Vec<String>>,
    /// Slots in which this faculty cannot teach.
    #[serde(default)]
    pub unavailable: Vec<SlotRef>,
}

impl Faculty {
    /// Creates a faculty member with no capabilities.
    pub fn new(name: impl Into<String>, short: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: short.into(),
            position: String::new(),
            capabilities: Vec::new(),
            preferences: BTreeMap::new(),
            unavailable: Vec::new(),
        }
    }

    /// Sets the position.
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    /// Adds a teachable subject.
    pub fn with_capability(mut self, subject: impl Into<String>) -> Self {
        self.capabilities.push(subject.into());
        self
    }

    /// Sets the ranked preference list for a class.
    pub fn with_preferences<S: Into<String>>(
        mut self,
        class_id: impl Into<String>,
        subjects: impl IntoIterator<Item = S>,
    ) -> Self {
        self.preferences.insert(
            class_id.into(),
            subjects.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Marks a slot as unavailable.
    pub fn with_unavailable(mut self, slot: SlotRef) -> Self {
        self.unavailable.push(slot);
        self
    }

    /// Whether `subject` (name or short code) is in the capability set.
    pub fn can_teach(&self, subject: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(subject))
    }

    /// Zero-based rank of `subject` in the preference list for `class_id`,
    /// together with the length of that list.
    pub fn preference_rank(&self, class_id: &str, subject: &str) -> Option<(usize, usize)> {
        let list = self.preferences.get(class_id)?;
        list.iter()
            .position(|p| p.eq_ignore_ascii_case(subject))
            .map(|rank| (rank, list.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;

    #[test]
    fn test_faculty_builder() {
        let f = Faculty::new("Prof X", "PX")
            .with_position("Professor")
            .with_capability("ML")
            .with_capability("AI")
            .with_preferences("SEA", ["AI", "ML"])
            .with_unavailable(SlotRef::new(Day::Monday, 0));

        assert_eq!(f.short, "PX");
        assert_eq!(f.position, "Professor");
        assert!(f.can_teach("ml"));
        assert!(!f.can_teach("DBMS"));
        assert_eq!(f.preference_rank("SEA", "ai"), Some((0, 2)));
        assert_eq!(f.preference_rank("SEA", "ML"), Some((1, 2)));
        assert_eq!(f.preference_rank("SEB", "ML"), None);
        assert_eq!(f.unavailable.len(), 1);
    }

    #[test]
    fn test_faculty_from_json() {
        let json = r#"{
            "name": "Prof Y",
            "short": "PY",
            "capabilities": ["DBMS"],
            "preferences": {"SEA": ["DBMS"]}
        }"#;
        let f: Faculty = serde_json::from_str(json).unwrap();
        assert!(f.can_teach("DBMS"));
        assert!(f.position.is_empty());
        assert!(f.unavailable.is_empty());
    }
}
