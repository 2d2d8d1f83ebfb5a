//! Room model.

use serde::{Deserialize, Serialize};

use super::SlotRef;

/// Physical room classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Classroom,
    Lab,
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier (e.g. `"301"`).
    pub id: String,
    /// Room classification.
    pub kind: RoomKind,
    /// Seats, checked against class size when both are known.
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Slots in which the room cannot be booked.
    #[serde(default)]
    pub unavailable: Vec<SlotRef>,
}

impl Room {
    /// Creates a room of the given kind.
    pub fn new(id: impl Into<String>, kind: RoomKind) -> Self {
        Self {
            id: id.into(),
            kind,
            capacity: None,
            unavailable: Vec::new(),
        }
    }

    /// Creates a classroom.
    pub fn classroom(id: impl Into<String>) -> Self {
        Self::new(id, RoomKind::Classroom)
    }

    /// Creates a lab room.
    pub fn lab(id: impl Into<String>) -> Self {
        Self::new(id, RoomKind::Lab)
    }

    /// Sets the seat count.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Marks a slot as unavailable.
    pub fn with_unavailable(mut self, slot: SlotRef) -> Self {
        self.unavailable.push(slot);
        self
    }

    /// Whether `students` fit. Unknown capacity or size always fits.
    pub fn fits(&self, students: Option<u32>) -> bool {
        match (self.capacity, students) {
            (Some(cap), Some(n)) => n <= cap,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_constructors() {
        assert_eq!(Room::classroom("301").kind, RoomKind::Classroom);
        assert_eq!(Room::lab("L1").kind, RoomKind::Lab);
    }

    #[test]
    fn test_room_fits() {
        let r = Room::classroom("301").with_capacity(60);
        assert!(r.fits(Some(60)));
        assert!(!r.fits(Some(61)));
        assert!(r.fits(None));
        assert!(Room::classroom("302").fits(Some(500)));
    }

    #[test]
    fn test_room_kind_serde() {
        let r: Room = serde_json::from_str(r#"{"id":"L2","kind":"lab"}"#).unwrap();
        assert_eq!(r.kind, RoomKind::Lab);
        assert_eq!(r.capacity, None);
    }
}
