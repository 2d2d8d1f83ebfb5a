//! Class group (student cohort) model.

use serde::{Deserialize, Serialize};

/// A student cohort that needs a weekly timetable (e.g. `"SEA"`).
///
/// Batches are sub-groups used for practical sessions (e.g. `"SEA1"`,
/// `"SEA2"`). They are carried through to the output unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGroup {
    /// Unique class identifier.
    pub id: String,
    /// Ordered batch sub-identifiers.
    #[serde(default)]
    pub batches: Vec<String>,
    /// Number of students, checked against room capacity when both are known.
    #[serde(default)]
    pub size: Option<u32>,
}

impl ClassGroup {
    /// Creates a class group without batches.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            batches: Vec::new(),
            size: None,
        }
    }

    /// Adds a batch.
    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batches.push(batch.into());
        self
    }

    /// Sets the number of students.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}
