//! Collision system - sweep vehicles against every other occupant

use serde::{Deserialize, Serialize};

use crate::components::{Collision, OccupantKind, OccupantRef, Shape};
use crate::registry::{Storage, Vehicles};

/// How much a sweep reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionStrategy {
    /// Stop at the first collision of the tick.
    #[default]
    FirstOnly,
    /// Keep going and report every collision found.
    All,
}

/// Test each active vehicle against all vehicles, then all shelves.
///
/// A vehicle that collides is deactivated on the spot, so it reports at
/// most one collision per sweep but keeps blocking the others.
pub fn collision_system(
    vehicles: &mut Vehicles,
    storage: &Storage,
    strategy: CollisionStrategy,
) -> Vec<Collision> {
    // Shapes do not change during a sweep; copy them so vehicles can be
    // mutated while testing against each other.
    let obstacles: Vec<(OccupantKind, String, Shape)> = vehicles
        .iter()
        .map(|v| (OccupantKind::Vehicle, v.id().to_string(), v.shape().clone()))
        .chain(
            storage
                .iter()
                .map(|s| (OccupantKind::Storage, s.id().to_string(), s.shape().clone())),
        )
        .collect();

    let mut found = Vec::new();
    for vehicle in vehicles.iter_mut() {
        for (kind, id, shape) in &obstacles {
            let other = OccupantRef {
                kind: *kind,
                id,
                shape,
            };
            if let Some(hit) = vehicle.collide_with(other) {
                log::warn!("{}", hit);
                found.push(hit);
                if strategy == CollisionStrategy::FirstOnly {
                    return found;
                }
                break;
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{OccupantId, Position, StorageUnit, VehicleUnit};

    fn setup() -> (Vehicles, Storage) {
        let mut vehicles = Vehicles::new();
        for (id, x) in [("A", 1.0), ("B", 5.0)] {
            let v = VehicleUnit::new(id, Position::new(x, 1.0), (1.0, 1.0)).unwrap();
            vehicles.add(v, None, None).unwrap();
        }
        let mut storage = Storage::new();
        let shelf =
            StorageUnit::new("S1", Position::new(5.0, 5.0), Position::new(5.0, 6.0), 1.0, 10.0)
                .unwrap();
        storage.add(shelf, None, None).unwrap();
        (vehicles, storage)
    }

    fn drive(vehicles: &mut Vehicles, id: &str, to: (f64, f64)) {
        let v = vehicles.get_mut(id).unwrap();
        v.assign_path([to, (0.5, 9.0)]).unwrap();
        v.step_motion();
    }

    #[test]
    fn test_quiet_floor() {
        let (mut vehicles, storage) = setup();
        assert!(collision_system(&mut vehicles, &storage, CollisionStrategy::All).is_empty());
        assert!(vehicles.iter().all(|v| v.is_active()));
    }

    #[test]
    fn test_first_only_stops_after_one() {
        let (mut vehicles, storage) = setup();
        drive(&mut vehicles, "A", (4.5, 1.0));

        let hits = collision_system(&mut vehicles, &storage, CollisionStrategy::FirstOnly);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].vehicle_id, "A");
        assert_eq!(hits[0].other, OccupantId::vehicle("B"));
        assert!(!vehicles.get("A").unwrap().is_active());
        assert!(vehicles.get("A").unwrap().path().is_empty());
        assert!(vehicles.get("B").unwrap().is_active());
    }

    #[test]
    fn test_all_reports_both_sides() {
        let (mut vehicles, storage) = setup();
        drive(&mut vehicles, "A", (4.5, 1.0));

        let hits = collision_system(&mut vehicles, &storage, CollisionStrategy::All);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].vehicle_id, "B");
        assert_eq!(hits[1].other, OccupantId::vehicle("A"));
        assert!(vehicles.iter().all(|v| !v.is_active()));

        // nothing new once everyone is stopped
        assert!(collision_system(&mut vehicles, &storage, CollisionStrategy::All).is_empty());
    }

    #[test]
    fn test_vehicle_hits_shelf() {
        let (mut vehicles, storage) = setup();
        drive(&mut vehicles, "B", (5.0, 4.5));

        let hits = collision_system(&mut vehicles, &storage, CollisionStrategy::FirstOnly);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].to_string(), "Vehicle ID#B collides with Storage Unit ID#S1");
    }
}
