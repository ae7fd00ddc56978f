//! Save/Load for warehouse state
//!
//! Two formats share one snapshot record: plain JSON in the layout other
//! tools read and write, and a versioned bincode checkpoint that also keeps
//! the tick counter and configuration.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::components::{Shape, ShapeRecord, StorageBuildError, StorageRecord, VehicleRecord};
use crate::config::SimConfig;
use crate::error::{GeometryError, PlacementIssue, PlacementRejected};
use crate::warehouse::Warehouse;

/// Version number for binary checkpoints (increment when the format changes)
const SAVE_VERSION: u32 = 1;

/// Persisted layout, shelves and vehicles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseSnapshot {
    pub layout: Option<ShapeRecord>,
    #[serde(default)]
    pub storage: Vec<StorageRecord>,
    #[serde(default)]
    pub vehicle: Vec<VehicleRecord>,
}

/// Binary checkpoint body.
#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    tick: u64,
    config: SimConfig,
    snapshot: WarehouseSnapshot,
}

/// Units that were well-formed but could not be placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub rejected_storage: Vec<PlacementRejected>,
    pub rejected_vehicles: Vec<PlacementRejected>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rejected_storage.is_empty() && self.rejected_vehicles.is_empty()
    }

    pub fn rejected_ids(&self) -> Vec<&str> {
        self.rejected_storage
            .iter()
            .chain(&self.rejected_vehicles)
            .map(|r| r.id.as_str())
            .collect()
    }
}

impl Warehouse {
    pub fn snapshot(&self) -> WarehouseSnapshot {
        WarehouseSnapshot {
            layout: self.layout_record(),
            storage: self.storage().records(),
            vehicle: self.vehicles().records(),
        }
    }

    /// Rebuild a warehouse from a snapshot.
    ///
    /// Each unit goes through the registry placement checks against the
    /// layout; units that fail are left out and listed in the report. A
    /// malformed record aborts the whole load. Without a layout every unit
    /// is rejected.
    pub fn from_snapshot(
        snapshot: &WarehouseSnapshot,
        config: SimConfig,
    ) -> Result<(Warehouse, LoadReport), SaveError> {
        let mut warehouse = Warehouse::with_config(config);
        let mut report = LoadReport::default();

        let Some(record) = snapshot.layout.as_ref() else {
            report.rejected_storage = snapshot.storage.iter().map(|r| unplaced(&r.id)).collect();
            report.rejected_vehicles = snapshot.vehicle.iter().map(|r| unplaced(&r.id)).collect();
            log::warn!("Snapshot has no layout; {} units dropped", report.rejected_ids().len());
            return Ok((warehouse, report));
        };
        let layout = Shape::from_record(record)?;
        warehouse
            .set_layout(layout, true)
            .map_err(|e| SaveError::Corrupt(e.to_string()))?;

        let (layout, storage, vehicles) = warehouse.registries_mut();
        report.rejected_storage = storage.bulk_load_info(&snapshot.storage, layout)?;
        report.rejected_vehicles = vehicles.bulk_load_info(&snapshot.vehicle, layout)?;
        warehouse.recompute_occupied_zones();

        for rejected in report.rejected_storage.iter().chain(&report.rejected_vehicles) {
            log::warn!("Dropped while loading: {}", rejected);
        }
        log::info!(
            "Loaded snapshot: {} storage units, {} vehicles",
            warehouse.storage().len(),
            warehouse.vehicles().len()
        );
        Ok((warehouse, report))
    }

    /// Write the snapshot as pretty JSON.
    pub fn save_json<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        serde_json::to_writer_pretty(writer, &self.snapshot())?;
        Ok(())
    }

    pub fn load_json<R: Read>(
        reader: R,
        config: SimConfig,
    ) -> Result<(Warehouse, LoadReport), SaveError> {
        let snapshot: WarehouseSnapshot = serde_json::from_reader(reader)?;
        Warehouse::from_snapshot(&snapshot, config)
    }

    /// Write a versioned binary checkpoint.
    pub fn save_binary<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        let save_data = SaveData {
            version: SAVE_VERSION,
            tick: self.tick_count(),
            config: self.config().clone(),
            snapshot: self.snapshot(),
        };
        bincode::serialize_into(writer, &save_data)?;
        Ok(())
    }

    pub fn load_binary<R: Read>(reader: R) -> Result<(Warehouse, LoadReport), SaveError> {
        let save_data: SaveData = bincode::deserialize_from(reader)?;

        if save_data.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: save_data.version,
            });
        }

        let (mut warehouse, report) =
            Warehouse::from_snapshot(&save_data.snapshot, save_data.config)?;
        warehouse.set_tick_count(save_data.tick);
        Ok((warehouse, report))
    }
}

fn unplaced(id: &str) -> PlacementRejected {
    PlacementRejected {
        id: id.to_string(),
        issues: vec![PlacementIssue::NoLayout],
    }
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
    Geometry(GeometryError),
    Storage(StorageBuildError),
    Corrupt(String),
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<GeometryError> for SaveError {
    fn from(e: GeometryError) -> Self {
        SaveError::Geometry(e)
    }
}

impl From<StorageBuildError> for SaveError {
    fn from(e: StorageBuildError) -> Self {
        SaveError::Storage(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Json(e) => write!(f, "JSON error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(f, "Save version mismatch: expected {}, found {}", expected, found)
            }
            SaveError::Geometry(e) => write!(f, "Bad geometry in snapshot: {}", e),
            SaveError::Storage(e) => write!(f, "Bad storage record in snapshot: {}", e),
            SaveError::Corrupt(msg) => write!(f, "Corrupt snapshot: {}", msg),
        }
    }
}

impl std::error::Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Position, StorageUnit};

    fn populated() -> Warehouse {
        let mut w = Warehouse::with_layout(10.0, 10.0, Position::ORIGIN).unwrap();
        let shelf =
            StorageUnit::new("S1", Position::new(2.0, 2.0), Position::new(2.0, 3.0), 1.0, 50.0)
                .unwrap()
                .with_category("Parts")
                .with_load(20.0)
                .unwrap();
        w.add_storage_unit(shelf).unwrap();
        let v = w.new_vehicle("V1", Position::new(8.0, 8.0), (1.0, 2.0)).unwrap();
        w.add_vehicle_unit(v).unwrap();
        w
    }

    #[test]
    fn test_json_shape() {
        let w = populated();
        let value = serde_json::to_value(w.snapshot()).unwrap();
        assert_eq!(value["layout"]["ref_pt_type"], "corner");
        assert_eq!(value["storage"][0]["type"], "Parts");
        assert_eq!(value["storage"][0]["cap"], 50.0);
        assert_eq!(value["vehicle"][0]["dock_location"][0], 8.0);
        assert_eq!(value["vehicle"][0]["geometry"]["type"], "Rectangle");
        assert_eq!(value["vehicle"][0]["battery"], 100);
    }

    #[test]
    fn test_json_round_trip() {
        let w = populated();
        let mut buf = Vec::new();
        w.save_json(&mut buf).unwrap();
        let (back, report) = Warehouse::load_json(buf.as_slice(), SimConfig::default()).unwrap();
        assert!(report.is_clean());
        assert_eq!(back.snapshot(), w.snapshot());
        assert_eq!(back.occupied_zones().len(), 2);
    }

    #[test]
    fn test_binary_round_trip_keeps_tick() {
        let mut w = populated();
        w.tick();
        w.tick();
        let mut buf = Vec::new();
        w.save_binary(&mut buf).unwrap();
        let (back, _) = Warehouse::load_binary(buf.as_slice()).unwrap();
        assert_eq!(back.tick_count(), 2);
        assert_eq!(back.snapshot(), w.snapshot());
    }

    #[test]
    fn test_binary_version_mismatch() {
        let w = populated();
        let save_data = SaveData {
            version: SAVE_VERSION + 1,
            tick: 0,
            config: SimConfig::default(),
            snapshot: w.snapshot(),
        };
        let buf = bincode::serialize(&save_data).unwrap();
        assert!(matches!(
            Warehouse::load_binary(buf.as_slice()),
            Err(SaveError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_unit_reported() {
        let mut snapshot = populated().snapshot();
        snapshot.storage[0].geo.ref_pt = [20.0, 20.0];
        let (w, report) = Warehouse::from_snapshot(&snapshot, SimConfig::default()).unwrap();
        assert_eq!(report.rejected_ids(), vec!["S1"]);
        assert!(w.storage().is_empty());
        assert_eq!(w.vehicles().len(), 1);
    }

    #[test]
    fn test_malformed_record_aborts() {
        let mut snapshot = populated().snapshot();
        snapshot.storage[0].load = 99.0;
        assert!(matches!(
            Warehouse::from_snapshot(&snapshot, SimConfig::default()),
            Err(SaveError::Storage(_))
        ));
    }

    #[test]
    fn test_missing_layout_rejects_units() {
        let mut snapshot = populated().snapshot();
        snapshot.layout = None;
        let (w, report) = Warehouse::from_snapshot(&snapshot, SimConfig::default()).unwrap();
        assert_eq!(report.rejected_ids(), vec!["S1", "V1"]);
        assert!(w.layout().is_none());
    }
}
