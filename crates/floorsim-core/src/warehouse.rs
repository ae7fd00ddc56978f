//! Warehouse - composition root for one simulated floor

use crate::components::*;
use crate::config::SimConfig;
use crate::error::{GeometryError, PlacementIssue, PlacementRejected, WarehouseError};
use crate::registry::{Occupant, Storage, Vehicles};
use crate::systems::*;

/// What [`Warehouse::set_layout`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChange {
    Installed,
    /// An existing layout was swapped out and every unit dropped.
    Replaced {
        removed_storage: usize,
        removed_vehicles: usize,
    },
}

/// Everything that happened during one [`Warehouse::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub arrivals: Vec<TripSummary>,
    pub collisions: Vec<Collision>,
}

/// A rectangular floor with shelves and vehicles on it.
///
/// Without a layout nothing can be placed. The driver calls [`Warehouse::tick`]
/// (or [`Warehouse::advance_tick`] and [`Warehouse::collision_sweep`]) once per
/// simulated step.
#[derive(Debug, Clone, Default)]
pub struct Warehouse {
    layout: Option<Shape>,
    storage: Storage,
    vehicles: Vehicles,
    /// Zones of both registries, storage first.
    occupied: Vec<Shape>,
    config: SimConfig,
    tick: u64,
}

impl Warehouse {
    /// An empty warehouse with no layout.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// A warehouse whose floor is `length` x `width` with its lower-left corner at `corner`.
    pub fn with_layout(length: f64, width: f64, corner: Position) -> Result<Self, GeometryError> {
        let layout = Shape::rectangle(length, width, corner, RefPointType::Corner)?;
        Ok(Self {
            layout: Some(layout),
            ..Self::default()
        })
    }

    /// Install a layout. Replacing an existing one clears both registries and
    /// needs `confirm`.
    pub fn set_layout(
        &mut self,
        layout: Shape,
        confirm: bool,
    ) -> Result<LayoutChange, WarehouseError> {
        if self.layout.is_none() {
            log::info!("Installed layout: {}", layout.description());
            self.layout = Some(layout);
            return Ok(LayoutChange::Installed);
        }
        if !confirm {
            return Err(WarehouseError::LayoutReplaceUnconfirmed);
        }
        let change = LayoutChange::Replaced {
            removed_storage: self.storage.len(),
            removed_vehicles: self.vehicles.len(),
        };
        self.clear();
        log::info!("Replaced layout with {} ({:?})", layout.description(), change);
        self.layout = Some(layout);
        Ok(change)
    }

    pub fn layout(&self) -> Option<&Shape> {
        self.layout.as_ref()
    }

    pub fn layout_record(&self) -> Option<ShapeRecord> {
        self.layout.as_ref().map(Shape::record)
    }

    pub fn layout_description(&self) -> Option<String> {
        self.layout.as_ref().map(Shape::description)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn vehicles(&self) -> &Vehicles {
        &self.vehicles
    }

    pub fn vehicle_mut(&mut self, id: &str) -> Option<&mut VehicleUnit> {
        self.vehicles.get_mut(id)
    }

    pub fn occupied_zones(&self) -> &[Shape] {
        &self.occupied
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub(crate) fn set_tick_count(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// A vehicle at its dock with this warehouse's buffer and default battery.
    pub fn new_vehicle(
        &self,
        id: impl Into<String>,
        dock: Position,
        size: (f64, f64),
    ) -> Result<VehicleUnit, GeometryError> {
        Ok(VehicleUnit::new(id, dock, size)?
            .with_buffer(self.config.vehicle_buffer)
            .with_battery(self.config.default_battery))
    }

    pub fn add_storage_unit(&mut self, unit: StorageUnit) -> Result<(), PlacementRejected> {
        let Some(layout) = self.layout.as_ref() else {
            return Err(no_layout(&unit));
        };
        let result = self.storage.add(unit, Some(layout), Some(&self.occupied));
        self.after_add(result)
    }

    pub fn add_vehicle_unit(&mut self, unit: VehicleUnit) -> Result<(), PlacementRejected> {
        let Some(layout) = self.layout.as_ref() else {
            return Err(no_layout(&unit));
        };
        let result = self.vehicles.add(unit, Some(layout), Some(&self.occupied));
        self.after_add(result)
    }

    /// One result per unit, in input order. Earlier units are in place when
    /// later ones are checked.
    pub fn add_storage_units<I>(&mut self, units: I) -> Vec<Result<(), PlacementRejected>>
    where
        I: IntoIterator<Item = StorageUnit>,
    {
        units.into_iter().map(|u| self.add_storage_unit(u)).collect()
    }

    pub fn add_vehicle_units<I>(&mut self, units: I) -> Vec<Result<(), PlacementRejected>>
    where
        I: IntoIterator<Item = VehicleUnit>,
    {
        units.into_iter().map(|u| self.add_vehicle_unit(u)).collect()
    }

    fn after_add(
        &mut self,
        result: Result<(), PlacementRejected>,
    ) -> Result<(), PlacementRejected> {
        match &result {
            Ok(()) => self.recompute_occupied_zones(),
            Err(rejected) => log::warn!("{}", rejected),
        }
        result
    }

    pub fn remove_storage_unit(&mut self, id: &str) -> Result<Option<StorageUnit>, WarehouseError> {
        let removed = self.storage.remove(id, self.config.strict_removal)?;
        self.recompute_occupied_zones();
        Ok(removed)
    }

    pub fn remove_vehicle_unit(&mut self, id: &str) -> Result<Option<VehicleUnit>, WarehouseError> {
        let removed = self.vehicles.remove(id, self.config.strict_removal)?;
        self.recompute_occupied_zones();
        Ok(removed)
    }

    /// Drop every unit; the layout stays.
    pub fn clear(&mut self) {
        self.storage.clear_all();
        self.vehicles.clear_all();
        self.occupied.clear();
    }

    /// Run a load batch using the configured rollback policy.
    pub fn storage_load_change(&mut self, entries: &[LoadEntry]) -> LoadOutcome {
        change_storage_load(&mut self.storage, entries, self.config.abort_on_error)
    }

    pub fn assign_path<I>(&mut self, id: &str, waypoints: I) -> Result<(), WarehouseError>
    where
        I: IntoIterator,
        I::Item: TryInto<Position>,
    {
        let vehicle = self
            .vehicles
            .get_mut(id)
            .ok_or_else(|| WarehouseError::NotFound(id.to_string()))?;
        vehicle.assign_path(waypoints)?;
        Ok(())
    }

    /// Step every vehicle once. Returns the trips completed.
    pub fn advance_tick(&mut self) -> Vec<TripSummary> {
        self.tick += 1;
        log::debug!("Tick {}", self.tick);
        movement_system(&mut self.vehicles)
    }

    pub fn collision_sweep(&mut self) -> Vec<Collision> {
        collision_system(&mut self.vehicles, &self.storage, self.config.collision_strategy)
    }

    /// Advance, then sweep.
    pub fn tick(&mut self) -> TickReport {
        let arrivals = self.advance_tick();
        let collisions = self.collision_sweep();
        TickReport {
            tick: self.tick,
            arrivals,
            collisions,
        }
    }

    /// Rebuild the merged zone list from both registries.
    pub fn recompute_occupied_zones(&mut self) {
        self.storage.rebuild_zones();
        self.vehicles.rebuild_zones();
        self.occupied = self
            .storage
            .zones()
            .iter()
            .chain(self.vehicles.zones())
            .cloned()
            .collect();
    }

    pub(crate) fn registries_mut(&mut self) -> (Option<&Shape>, &mut Storage, &mut Vehicles) {
        (self.layout.as_ref(), &mut self.storage, &mut self.vehicles)
    }
}

fn no_layout<T: Occupant>(unit: &T) -> PlacementRejected {
    log::warn!("Rejected {}: no layout", unit.id());
    PlacementRejected {
        id: unit.id().to_string(),
        issues: vec![PlacementIssue::NoLayout],
    }
}
