//! Movement system - advance every vehicle one waypoint per tick

use crate::components::{MotionStep, TripSummary};
use crate::registry::Vehicles;

/// Step every vehicle once, in registration order. Returns the trips that
/// finished this tick.
pub fn movement_system(vehicles: &mut Vehicles) -> Vec<TripSummary> {
    let mut arrivals = Vec::new();
    for vehicle in vehicles.iter_mut() {
        match vehicle.step_motion() {
            MotionStep::Arrived(summary) => {
                log::debug!(
                    "{} arrived at {} after {:.2}",
                    vehicle,
                    summary.destination,
                    summary.distance
                );
                arrivals.push(summary);
            }
            MotionStep::Moved { from, to } => {
                log::debug!("{} moved {} -> {}", vehicle, from, to);
            }
            MotionStep::Idle => {}
        }
    }
    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{MotionState, Position, VehicleUnit};

    #[test]
    fn test_only_vehicles_with_paths_move() {
        let mut vehicles = Vehicles::new();
        for (id, x) in [("A", 1.0), ("B", 4.0)] {
            let v = VehicleUnit::new(id, Position::new(x, 1.0), (1.0, 1.0)).unwrap();
            vehicles.add(v, None, None).unwrap();
        }
        vehicles
            .get_mut("A")
            .unwrap()
            .assign_path([(1.0, 3.0), (1.0, 5.0)])
            .unwrap();

        assert!(movement_system(&mut vehicles).is_empty());
        assert_eq!(vehicles.get("A").unwrap().position(), Position::new(1.0, 3.0));
        assert_eq!(vehicles.get("B").unwrap().position(), Position::new(4.0, 1.0));

        let arrivals = movement_system(&mut vehicles);
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].vehicle_id, "A");
        assert!((arrivals[0].distance - 4.0).abs() < 1e-12);
        assert_eq!(vehicles.get("A").unwrap().motion_state(), MotionState::Resting);
    }
}
