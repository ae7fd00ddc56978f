//! Fixed shelves with a capacity and a current load.

use serde::{Deserialize, Serialize};

use super::common::Position;
use super::shape::{RefPointType, Shape, ShapeRecord};
use crate::error::{GeometryError, StorageError};

pub const DEFAULT_CATEGORY: &str = "Generic";

/// A square shelf. Load always stays within `[0, capacity]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageUnit {
    id: String,
    shape: Shape,
    load_location: Position,
    capacity: f64,
    load: f64,
    category: String,
}

/// Persisted form of a shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageRecord {
    pub id: String,
    pub cap: f64,
    #[serde(default)]
    pub load_location: [f64; 2],
    pub geo: ShapeRecord,
    #[serde(default)]
    pub load: f64,
    #[serde(rename = "type", default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Human-facing row for tables and dialogs.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSummary {
    pub id: String,
    /// "load / capacity"
    pub load: String,
    pub category: String,
    pub shape: String,
}

impl std::fmt::Display for StorageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID: {} | Current load: {} | Category: {} | Shape: {}",
            self.id, self.load, self.category, self.shape
        )
    }
}

/// Construction failed either on geometry or on capacity.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBuildError {
    Geometry(GeometryError),
    Storage(StorageError),
}

impl From<GeometryError> for StorageBuildError {
    fn from(e: GeometryError) -> Self {
        StorageBuildError::Geometry(e)
    }
}

impl From<StorageError> for StorageBuildError {
    fn from(e: StorageError) -> Self {
        StorageBuildError::Storage(e)
    }
}

impl std::fmt::Display for StorageBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBuildError::Geometry(e) => write!(f, "{}", e),
            StorageBuildError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StorageBuildError {}

impl StorageUnit {
    /// A shelf of side `size` centered on `center`, empty, category "Generic".
    pub fn new(
        id: impl Into<String>,
        center: Position,
        load_location: Position,
        size: f64,
        capacity: f64,
    ) -> Result<Self, StorageBuildError> {
        let id = id.into();
        let shape = Shape::square(size, center, RefPointType::Center)?;
        if !(capacity > 0.0) || !capacity.is_finite() {
            return Err(StorageError::InvalidCapacity(capacity).into());
        }
        Ok(Self {
            id,
            shape,
            load_location,
            capacity,
            load: 0.0,
            category: DEFAULT_CATEGORY.to_string(),
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the initial load; it must lie within `[0, capacity]`.
    pub fn with_load(mut self, load: f64) -> Result<Self, StorageError> {
        if !(0.0..=self.capacity).contains(&load) {
            return Err(StorageError::LoadOutOfRange {
                id: self.id.clone(),
                load,
                capacity: self.capacity,
            });
        }
        self.load = load;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn center(&self) -> Position {
        self.shape.reference()
    }

    pub fn load_location(&self) -> Position {
        self.load_location
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    /// Add `delta` to the load. Nothing changes on error.
    pub fn apply_load(&mut self, delta: f64) -> Result<(), StorageError> {
        self.check_amount(delta)?;
        if self.load + delta > self.capacity {
            return Err(StorageError::CapacityOverflow {
                id: self.id.clone(),
                load: self.load,
                delta,
                capacity: self.capacity,
            });
        }
        self.load += delta;
        Ok(())
    }

    /// Remove `delta` from the load. Nothing changes on error.
    pub fn apply_unload(&mut self, delta: f64) -> Result<(), StorageError> {
        self.check_amount(delta)?;
        if self.load - delta < 0.0 {
            return Err(StorageError::CapacityUnderflow {
                id: self.id.clone(),
                load: self.load,
                delta,
            });
        }
        self.load -= delta;
        Ok(())
    }

    fn check_amount(&self, delta: f64) -> Result<(), StorageError> {
        if !(delta >= 0.0) || !delta.is_finite() {
            return Err(StorageError::NegativeAmount {
                id: self.id.clone(),
                amount: delta,
            });
        }
        Ok(())
    }

    /// Overwrite the load without bound checks. Only used to roll back a
    /// transaction to values that were valid before it started.
    pub(crate) fn restore_load(&mut self, load: f64) {
        self.load = load;
    }

    pub fn load_percent(&self) -> f64 {
        100.0 * self.load / self.capacity
    }

    pub fn record(&self) -> StorageRecord {
        StorageRecord {
            id: self.id.clone(),
            cap: self.capacity,
            load_location: self.load_location.to_array(),
            geo: self.shape.record(),
            load: self.load,
            category: self.category.clone(),
        }
    }

    pub fn summary(&self) -> StorageSummary {
        StorageSummary {
            id: self.id.clone(),
            load: format!("{} / {}", self.load, self.capacity),
            category: self.category.clone(),
            shape: self.shape.description(),
        }
    }

    /// Rebuild a shelf from its record. The square is always centered on
    /// `geo.ref_pt` with side `geo.dimension[0]`.
    pub fn from_record(record: &StorageRecord) -> Result<Self, StorageBuildError> {
        let center = Position::try_from(record.geo.ref_pt)?;
        let load_location = Position::try_from(record.load_location)?;
        let unit = Self::new(
            record.id.clone(),
            center,
            load_location,
            record.geo.dimension[0],
            record.cap,
        )?
        .with_category(record.category.clone())
        .with_load(record.load)?;
        Ok(unit)
    }
}

impl std::fmt::Display for StorageUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Storage Unit ID#{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf(capacity: f64) -> StorageUnit {
        StorageUnit::new("S1", Position::new(2.0, 2.0), Position::new(2.0, 3.0), 1.0, capacity)
            .unwrap()
    }

    #[test]
    fn test_rejects_bad_capacity_and_size() {
        assert!(matches!(
            StorageUnit::new("S", Position::ORIGIN, Position::ORIGIN, 1.0, 0.0),
            Err(StorageBuildError::Storage(StorageError::InvalidCapacity(_)))
        ));
        assert!(matches!(
            StorageUnit::new("S", Position::ORIGIN, Position::ORIGIN, -1.0, 5.0),
            Err(StorageBuildError::Geometry(_))
        ));
    }

    #[test]
    fn test_load_and_unload_within_bounds() {
        let mut s = shelf(10.0);
        s.apply_load(4.0).unwrap();
        s.apply_load(6.0).unwrap();
        assert_eq!(s.load(), 10.0);
        assert_eq!(s.load_percent(), 100.0);
        s.apply_unload(10.0).unwrap();
        assert_eq!(s.load(), 0.0);
    }

    #[test]
    fn test_overflow_and_underflow_leave_state() {
        let mut s = shelf(10.0);
        s.apply_load(7.0).unwrap();
        let err = s.apply_load(3.5).unwrap_err();
        assert!(matches!(err, StorageError::CapacityOverflow { .. }));
        assert_eq!(s.load(), 7.0);

        let err = s.apply_unload(7.5).unwrap_err();
        assert!(matches!(err, StorageError::CapacityUnderflow { .. }));
        assert_eq!(s.load(), 7.0);

        assert!(matches!(
            s.apply_load(-1.0),
            Err(StorageError::NegativeAmount { .. })
        ));
        assert!(s.apply_unload(f64::NAN).is_err());
        assert_eq!(s.load(), 7.0);
    }

    #[test]
    fn test_summary_and_record() {
        let mut s = shelf(100.0).with_category("Parts");
        s.apply_load(25.0).unwrap();
        let summary = s.summary();
        assert_eq!(summary.load, "25 / 100");
        assert_eq!(summary.category, "Parts");
        assert_eq!(summary.shape, "Square of size (1)");

        let record = s.record();
        assert_eq!(record.cap, 100.0);
        assert_eq!(record.load_location, [2.0, 3.0]);
        let back = StorageUnit::from_record(&record).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_record_load_out_of_range() {
        let mut record = shelf(10.0).record();
        record.load = 11.0;
        assert!(matches!(
            StorageUnit::from_record(&record),
            Err(StorageBuildError::Storage(StorageError::LoadOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_record_json_defaults() {
        let json = r#"{"id":"A","cap":5,"geo":{"type":"Square","dimension":[1,1],"ref_pt":[3,3]}}"#;
        let record: StorageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.category, "Generic");
        let unit = StorageUnit::from_record(&record).unwrap();
        assert_eq!(unit.center(), Position::new(3.0, 3.0));
        assert_eq!(unit.load(), 0.0);
    }
}
