//! Error taxonomy for the simulation core.
//!
//! Every failure here is plain data: callers get a value back and decide
//! what to show. Snapshot errors live in [`crate::persistence`].

use std::fmt;

/// Invalid shape or coordinate construction.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    NonPositiveDimension { name: &'static str, value: f64 },
    InvalidRefPointType(String),
    NonFiniteCoordinate { x: f64, y: f64 },
    UnequalSquareSides { length: f64, width: f64 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::NonPositiveDimension { name, value } => {
                write!(f, "{} has to be a positive value (got {})", name, value)
            }
            GeometryError::InvalidRefPointType(kind) => {
                write!(f, "Invalid reference type: {:?}", kind)
            }
            GeometryError::NonFiniteCoordinate { x, y } => {
                write!(f, "Coordinates must be finite (got {}, {})", x, y)
            }
            GeometryError::UnequalSquareSides { length, width } => {
                write!(f, "Square sides must match (got {}x{})", length, width)
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Storage capacity violations and bad load amounts.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    InvalidCapacity(f64),
    NegativeAmount { id: String, amount: f64 },
    CapacityOverflow { id: String, load: f64, delta: f64, capacity: f64 },
    CapacityUnderflow { id: String, load: f64, delta: f64 },
    LoadOutOfRange { id: String, load: f64, capacity: f64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidCapacity(cap) => {
                write!(f, "Capacity needs to be a positive number (got {})", cap)
            }
            StorageError::NegativeAmount { id, amount } => {
                write!(f, "Negative amount {} for shelf {}", amount, id)
            }
            StorageError::CapacityOverflow { id, .. } => {
                write!(f, "Overflow shelf {}'s capacity", id)
            }
            StorageError::CapacityUnderflow { id, .. } => {
                write!(f, "Underflow shelf {}'s capacity", id)
            }
            StorageError::LoadOutOfRange { id, load, capacity } => {
                write!(f, "Shelf {} load {} is outside [0, {}]", id, load, capacity)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Stepping past the end of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    EndOfPath,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::EndOfPath => write!(f, "End of path reached"),
        }
    }
}

impl std::error::Error for PathError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleError {
    /// Paths can only be handed to active vehicles.
    PathInactive { id: String },
}

impl fmt::Display for VehicleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleError::PathInactive { id } => write!(
                f,
                "Unable to set new path for vehicle {} due to unit's inactivity! \
                 Resolve inactivity before attempting to set new path",
                id
            ),
        }
    }
}

impl std::error::Error for VehicleError {}

/// One failed placement check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementIssue {
    NoLayout,
    DuplicateId(String),
    OutOfBounds,
    Collision,
    DockOccupied,
}

impl fmt::Display for PlacementIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementIssue::NoLayout => write!(f, "No warehouse layout defined"),
            PlacementIssue::DuplicateId(id) => {
                write!(f, "ID# {} is already in the dataframe", id)
            }
            PlacementIssue::OutOfBounds => write!(f, "Out of bound! Violation of Warehouse Space"),
            PlacementIssue::Collision => write!(f, "Collision with existing object(s)"),
            PlacementIssue::DockOccupied => {
                write!(f, "Docking location violation! Docking space is occupied")
            }
        }
    }
}

/// A placement that failed one or more checks. Nothing was inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRejected {
    pub id: String,
    pub issues: Vec<PlacementIssue>,
}

impl PlacementRejected {
    /// Human-readable reasons, in check order.
    pub fn reasons(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.to_string()).collect()
    }

    pub fn has(&self, issue: &PlacementIssue) -> bool {
        self.issues.contains(issue)
    }
}

impl fmt::Display for PlacementRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Placement of {} rejected: {}", self.id, self.reasons().join("; "))
    }
}

impl std::error::Error for PlacementRejected {}

/// Why a storage load batch stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionError {
    NegativeAmount,
    InvalidAmount(String),
    InvalidAction(String),
    InvalidId(String),
    Storage(StorageError),
}

impl From<StorageError> for TransactionError {
    fn from(e: StorageError) -> Self {
        TransactionError::Storage(e)
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::NegativeAmount => write!(f, "Negative load detected!!!"),
            TransactionError::InvalidAmount(raw) => write!(f, "Invalid amount: {:?}", raw),
            TransactionError::InvalidAction(_) => write!(f, "Invalid action!!!"),
            TransactionError::InvalidId(_) => write!(f, "Invalid ID detected!!!"),
            TransactionError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TransactionError {}

/// Errors surfaced by [`crate::warehouse::Warehouse`] operations.
#[derive(Debug, Clone, PartialEq)]
pub enum WarehouseError {
    NotFound(String),
    /// Replacing a layout wipes both registries and must be confirmed.
    LayoutReplaceUnconfirmed,
    Vehicle(VehicleError),
    Placement(PlacementRejected),
}

impl From<VehicleError> for WarehouseError {
    fn from(e: VehicleError) -> Self {
        WarehouseError::Vehicle(e)
    }
}

impl From<PlacementRejected> for WarehouseError {
    fn from(e: PlacementRejected) -> Self {
        WarehouseError::Placement(e)
    }
}

impl fmt::Display for WarehouseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarehouseError::NotFound(id) => write!(f, "The requested ID {} does not exist", id),
            WarehouseError::LayoutReplaceUnconfirmed => write!(
                f,
                "A layout already exists; replacing it removes every unit and must be confirmed"
            ),
            WarehouseError::Vehicle(e) => write!(f, "{}", e),
            WarehouseError::Placement(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WarehouseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_reasons_keep_order() {
        let rejected = PlacementRejected {
            id: "S1".into(),
            issues: vec![
                PlacementIssue::DuplicateId("S1".into()),
                PlacementIssue::OutOfBounds,
            ],
        };
        let reasons = rejected.reasons();
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].contains("already in the dataframe"));
        assert!(reasons[1].contains("Out of bound"));
        assert!(rejected.has(&PlacementIssue::OutOfBounds));
    }

    #[test]
    fn test_storage_error_wording() {
        let e = StorageError::CapacityOverflow {
            id: "S9".into(),
            load: 9.0,
            delta: 2.0,
            capacity: 10.0,
        };
        assert_eq!(e.to_string(), "Overflow shelf S9's capacity");
    }
}
