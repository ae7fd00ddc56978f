//! The capability a registry needs from what it holds.

use crate::components::{
    OccupantKind, OccupantRef, Shape, StorageBuildError, StorageRecord, StorageSummary,
    StorageUnit, VehicleRecord, VehicleSummary, VehicleUnit,
};
use crate::error::GeometryError;

/// Something that takes up floor space and can be stored in a [`super::Registry`].
pub trait Occupant: Sized {
    const KIND: OccupantKind;

    type Record;
    type Summary;
    type BuildError;

    fn id(&self) -> &str;

    fn shape(&self) -> &Shape;

    /// Every shape that has to fit inside the layout.
    fn footprints(&self) -> Vec<Shape> {
        vec![self.shape().clone()]
    }

    /// What this occupant reserves in the occupied-zone list.
    fn zone(&self) -> Shape {
        self.shape().clone()
    }

    /// Would `existing` block this candidate's home slot? Only vehicles have one.
    fn dock_conflict(&self, _existing: &Self) -> bool {
        false
    }

    fn as_occupant(&self) -> OccupantRef<'_> {
        OccupantRef {
            kind: Self::KIND,
            id: self.id(),
            shape: self.shape(),
        }
    }

    fn record(&self) -> Self::Record;

    fn summary(&self) -> Self::Summary;

    fn from_record(record: &Self::Record) -> Result<Self, Self::BuildError>;
}

impl Occupant for StorageUnit {
    const KIND: OccupantKind = OccupantKind::Storage;
    type Record = StorageRecord;
    type Summary = StorageSummary;
    type BuildError = StorageBuildError;

    fn id(&self) -> &str {
        StorageUnit::id(self)
    }

    fn shape(&self) -> &Shape {
        StorageUnit::shape(self)
    }

    fn record(&self) -> StorageRecord {
        StorageUnit::record(self)
    }

    fn summary(&self) -> StorageSummary {
        StorageUnit::summary(self)
    }

    fn from_record(record: &StorageRecord) -> Result<Self, StorageBuildError> {
        StorageUnit::from_record(record)
    }
}

impl Occupant for VehicleUnit {
    const KIND: OccupantKind = OccupantKind::Vehicle;
    type Record = VehicleRecord;
    type Summary = VehicleSummary;
    type BuildError = GeometryError;

    fn id(&self) -> &str {
        VehicleUnit::id(self)
    }

    fn shape(&self) -> &Shape {
        VehicleUnit::shape(self)
    }

    /// Current footprint and the docking slot.
    fn footprints(&self) -> Vec<Shape> {
        vec![self.shape().clone(), self.home_shape()]
    }

    /// Vehicles reserve their docking slot, wherever they happen to be.
    fn zone(&self) -> Shape {
        self.home_shape()
    }

    fn dock_conflict(&self, existing: &Self) -> bool {
        self.footprints()
            .iter()
            .any(|candidate| crate::components::would_conflict_at_dock(existing, candidate))
    }

    fn record(&self) -> VehicleRecord {
        VehicleUnit::record(self)
    }

    fn summary(&self) -> VehicleSummary {
        VehicleUnit::summary(self)
    }

    fn from_record(record: &VehicleRecord) -> Result<Self, GeometryError> {
        VehicleUnit::from_record(record)
    }
}
