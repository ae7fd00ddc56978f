//! Ordered id → occupant registries with placement validation.

mod occupant;

pub use occupant::Occupant;

use indexmap::IndexMap;

use crate::components::{Polygonal, Shape, StorageUnit, VehicleUnit};
use crate::error::{PlacementIssue, PlacementRejected, WarehouseError};

/// Insertion-ordered collection of occupants plus the zones they reserve.
///
/// Every unit in `units` has exactly one entry in `zones`, at the same index.
#[derive(Debug, Clone)]
pub struct Registry<T: Occupant> {
    units: IndexMap<String, T>,
    zones: Vec<Shape>,
}

pub type Storage = Registry<StorageUnit>;
pub type Vehicles = Registry<VehicleUnit>;

impl<T: Occupant> Default for Registry<T> {
    fn default() -> Self {
        Self {
            units: IndexMap::new(),
            zones: Vec::new(),
        }
    }
}

impl<T: Occupant> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every placement check and insert only if all of them pass.
    ///
    /// Checks are not short-circuited, so the rejection lists each distinct
    /// problem once.
    pub fn add(
        &mut self,
        unit: T,
        layout: Option<&Shape>,
        occupied: Option<&[Shape]>,
    ) -> Result<(), PlacementRejected> {
        let issues = self.placement_issues(&unit, layout, occupied);
        if !issues.is_empty() {
            return Err(PlacementRejected {
                id: unit.id().to_string(),
                issues,
            });
        }
        self.zones.push(unit.zone());
        self.units.insert(unit.id().to_string(), unit);
        Ok(())
    }

    /// Everything wrong with placing `unit` here, in check order.
    pub fn placement_issues(
        &self,
        unit: &T,
        layout: Option<&Shape>,
        occupied: Option<&[Shape]>,
    ) -> Vec<PlacementIssue> {
        let mut issues = Vec::new();
        let mut push = |issue: PlacementIssue| {
            if !issues.iter().any(|known| known == &issue) {
                issues.push(issue);
            }
        };

        if self.units.contains_key(unit.id()) {
            push(PlacementIssue::DuplicateId(unit.id().to_string()));
        }

        if let Some(layout) = layout {
            if !unit.footprints().iter().all(|fp| layout.contains(fp)) {
                push(PlacementIssue::OutOfBounds);
            }
        }

        if let Some(zones) = occupied {
            let footprints = unit.footprints();
            if footprints
                .iter()
                .any(|fp| zones.iter().any(|zone| fp.interferes(zone)))
            {
                push(PlacementIssue::Collision);
            }
        }

        let shape = unit.shape();
        if self.units.values().any(|other| shape.interferes(other.shape())) {
            push(PlacementIssue::Collision);
        }

        if self.units.values().any(|other| unit.dock_conflict(other)) {
            push(PlacementIssue::DockOccupied);
        }

        issues
    }

    /// Remove by id. A missing id is an error only in strict mode.
    pub fn remove(&mut self, id: &str, strict: bool) -> Result<Option<T>, WarehouseError> {
        match self.units.get_index_of(id) {
            Some(index) => {
                self.zones.remove(index);
                Ok(self.units.shift_remove_index(index).map(|(_, unit)| unit))
            }
            None if strict => Err(WarehouseError::NotFound(id.to_string())),
            None => Ok(None),
        }
    }

    /// Build units from records and feed each through [`Registry::add`].
    ///
    /// A malformed record aborts before anything is inserted. Units that
    /// fail placement are skipped and reported.
    pub fn bulk_load_info(
        &mut self,
        records: &[T::Record],
        layout: Option<&Shape>,
    ) -> Result<Vec<PlacementRejected>, T::BuildError> {
        let units = records
            .iter()
            .map(T::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        let mut rejected = Vec::new();
        for unit in units {
            if let Err(e) = self.add(unit, layout, None) {
                rejected.push(e);
            }
        }
        Ok(rejected)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.units.get(id)
    }

    /// Mutable access. Callers must not change what [`Occupant::zone`] reports.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.units.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.units.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.units.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.units.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn clear_all(&mut self) {
        self.units.clear();
        self.zones.clear();
    }

    pub fn zones(&self) -> &[Shape] {
        &self.zones
    }

    pub fn rebuild_zones(&mut self) {
        self.zones = self.units.values().map(Occupant::zone).collect();
    }

    pub fn records(&self) -> Vec<T::Record> {
        self.units.values().map(Occupant::record).collect()
    }

    pub fn summaries(&self) -> Vec<T::Summary> {
        self.units.values().map(Occupant::summary).collect()
    }
}
