//! Identity of anything placed on the floor.

use serde::{Deserialize, Serialize};

use super::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupantKind {
    Storage,
    Vehicle,
}

/// Kind plus id. Ids are unique per kind, so this pair names one occupant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupantId {
    pub kind: OccupantKind,
    pub id: String,
}

impl OccupantId {
    pub fn storage(id: impl Into<String>) -> Self {
        Self {
            kind: OccupantKind::Storage,
            id: id.into(),
        }
    }

    pub fn vehicle(id: impl Into<String>) -> Self {
        Self {
            kind: OccupantKind::Vehicle,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for OccupantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            OccupantKind::Storage => write!(f, "Storage Unit ID#{}", self.id),
            OccupantKind::Vehicle => write!(f, "Vehicle ID#{}", self.id),
        }
    }
}

/// Borrowed view of an occupant for collision tests.
#[derive(Debug, Clone, Copy)]
pub struct OccupantRef<'a> {
    pub kind: OccupantKind,
    pub id: &'a str,
    pub shape: &'a Shape,
}

impl OccupantRef<'_> {
    pub fn to_id(&self) -> OccupantId {
        OccupantId {
            kind: self.kind,
            id: self.id.to_string(),
        }
    }
}

/// A vehicle ran into another occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub vehicle_id: String,
    pub other: OccupantId,
}

impl std::fmt::Display for Collision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vehicle ID#{} collides with {}", self.vehicle_id, self.other)
    }
}
