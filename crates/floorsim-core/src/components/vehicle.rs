//! Mobile units that follow assigned waypoint paths.

use serde::{Deserialize, Serialize};

use super::common::{Kinematic, Position};
use super::occupant::{Collision, OccupantKind, OccupantRef};
use super::path::Path;
use super::shape::{Polygonal, RefPointType, Shape, ShapeRecord};
use crate::error::{GeometryError, PathError, VehicleError};

/// Safety margin carried by every vehicle footprint.
pub const VEHICLE_BUFFER: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Moving,
    Resting,
}

impl std::fmt::Display for MotionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotionState::Moving => write!(f, "Moving"),
            MotionState::Resting => write!(f, "Resting"),
        }
    }
}

/// Emitted when a vehicle consumes the last waypoint of its path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub vehicle_id: String,
    pub destination: Position,
    /// Distance covered along the trail, final leg included.
    pub distance: f64,
    pub waypoints: usize,
    pub battery: u8,
}

/// Outcome of a single [`VehicleUnit::step_motion`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionStep {
    Idle,
    Moved { from: Position, to: Position },
    Arrived(TripSummary),
}

/// Persisted form of a vehicle; `geometry.ref_pt` is the current position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: String,
    pub dock_location: [f64; 2],
    pub geometry: ShapeRecord,
    pub battery: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSummary {
    pub id: String,
    pub docking_location: Position,
    pub current_location: Position,
    pub shape: String,
    pub battery: u8,
}

impl std::fmt::Display for VehicleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID: {} | Docking Location: {} | Current Location: {} | Shape: {} | Current battery: {}%",
            self.id, self.docking_location, self.current_location, self.shape, self.battery
        )
    }
}

/// A vehicle: rectangular footprint centered on its current position.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleUnit {
    id: String,
    dock: Position,
    shape: Shape,
    kinematic: Kinematic,
    battery: u8,
    active: bool,
    trail: Vec<Position>,
    path: Path,
}

impl VehicleUnit {
    /// A vehicle parked at its docking position with a full battery.
    pub fn new(
        id: impl Into<String>,
        dock: Position,
        size: (f64, f64),
    ) -> Result<Self, GeometryError> {
        let dock = Position::try_new(dock.x, dock.y)?;
        let shape = Shape::rectangle(size.0, size.1, dock, RefPointType::Center)?
            .with_buffer(VEHICLE_BUFFER);
        Ok(Self {
            id: id.into(),
            dock,
            shape,
            kinematic: Kinematic::at(dock),
            battery: 100,
            active: true,
            trail: Vec::new(),
            path: Path::new(),
        })
    }

    /// Start somewhere other than the dock.
    pub fn placed_at(mut self, position: Position) -> Self {
        self.shape.translate(self.kinematic.position, position);
        self.kinematic = Kinematic::at(position);
        self
    }

    pub fn with_battery(mut self, percent: i64) -> Self {
        self.set_battery(percent);
        self
    }

    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.shape = self.shape.with_buffer(buffer);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dock(&self) -> Position {
        self.dock
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn position(&self) -> Position {
        self.kinematic.position
    }

    pub fn kinematic(&self) -> &Kinematic {
        &self.kinematic
    }

    pub fn battery(&self) -> u8 {
        self.battery
    }

    /// Clamp into [0, 100].
    pub fn set_battery(&mut self, percent: i64) {
        self.battery = percent.clamp(0, 100) as u8;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn trail(&self) -> &[Position] {
        &self.trail
    }

    /// The trail as a drawable line; needs at least two points.
    pub fn trail_polyline(&self) -> Option<&[Position]> {
        if self.trail.len() > 1 {
            Some(&self.trail)
        } else {
            None
        }
    }

    pub fn as_occupant(&self) -> OccupantRef<'_> {
        OccupantRef {
            kind: OccupantKind::Vehicle,
            id: &self.id,
            shape: &self.shape,
        }
    }

    /// Replace the path. Inactive vehicles refuse and end up with an empty path.
    pub fn assign_path<I>(&mut self, waypoints: I) -> Result<(), VehicleError>
    where
        I: IntoIterator,
        I::Item: TryInto<Position>,
    {
        if !self.active {
            self.path = Path::new();
            return Err(VehicleError::PathInactive {
                id: self.id.clone(),
            });
        }
        self.path = Path::from_waypoints(waypoints);
        Ok(())
    }

    pub fn motion_state(&self) -> MotionState {
        if self.path.is_iterable() {
            MotionState::Moving
        } else {
            MotionState::Resting
        }
    }

    /// Advance one waypoint. Consuming the final waypoint ends the session:
    /// path and trail are cleared and a [`TripSummary`] is returned.
    pub fn step_motion(&mut self) -> MotionStep {
        if !self.active {
            return MotionStep::Idle;
        }
        match self.path.step() {
            Ok(next) => {
                let from = self.kinematic.position;
                self.move_to(next);
                if self.path.is_iterable() {
                    MotionStep::Moved { from, to: next }
                } else {
                    MotionStep::Arrived(self.finish_trip())
                }
            }
            Err(PathError::EndOfPath) => {
                self.end_session();
                MotionStep::Idle
            }
        }
    }

    fn move_to(&mut self, to: Position) {
        let from = self.kinematic.position;
        self.trail.push(from);
        self.shape.translate(from, to);
        self.kinematic.relocate(to);
    }

    fn finish_trip(&mut self) -> TripSummary {
        let here = self.kinematic.position;
        let distance: f64 = self
            .trail
            .iter()
            .chain(std::iter::once(&here))
            .collect::<Vec<_>>()
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum();
        let summary = TripSummary {
            vehicle_id: self.id.clone(),
            destination: here,
            distance,
            waypoints: self.path.len(),
            battery: self.battery,
        };
        self.end_session();
        summary
    }

    fn end_session(&mut self) {
        self.path.clear();
        self.trail.clear();
        self.kinematic.halt();
    }

    /// Test against another occupant. On contact the vehicle drops its path
    /// and goes inactive; it still blocks others afterwards.
    pub fn collide_with(&mut self, other: OccupantRef<'_>) -> Option<Collision> {
        if !self.active {
            return None;
        }
        if other.kind == OccupantKind::Vehicle && other.id == self.id {
            return None;
        }
        if !self.shape.interferes(other.shape) {
            return None;
        }
        self.path.clear();
        self.active = false;
        self.kinematic.halt();
        Some(Collision {
            vehicle_id: self.id.clone(),
            other: other.to_id(),
        })
    }

    /// Jump straight back to the dock.
    pub fn force_return_home(&mut self) {
        let dock = self.dock;
        self.move_to(dock);
        self.kinematic.halt();
    }

    /// Copy of the footprint as it would sit on the dock.
    pub fn home_shape(&self) -> Shape {
        self.shape.translated(self.kinematic.position, self.dock)
    }

    pub fn record(&self) -> VehicleRecord {
        VehicleRecord {
            id: self.id.clone(),
            dock_location: self.dock.to_array(),
            geometry: self.shape.record(),
            battery: i64::from(self.battery),
        }
    }

    pub fn summary(&self) -> VehicleSummary {
        VehicleSummary {
            id: self.id.clone(),
            docking_location: self.dock,
            current_location: self.kinematic.position,
            shape: self.shape.description(),
            battery: self.battery,
        }
    }

    pub fn from_record(record: &VehicleRecord) -> Result<Self, GeometryError> {
        let dock = Position::try_from(record.dock_location)?;
        let current = Position::try_from(record.geometry.ref_pt)?;
        let [length, width] = record.geometry.dimension;
        Ok(Self::new(record.id.clone(), dock, (length, width))?
            .placed_at(current)
            .with_buffer(record.geometry.buffer)
            .with_battery(record.battery))
    }
}

impl std::fmt::Display for VehicleUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vehicle ID#{}", self.id)
    }
}

/// Would `existing`, sent back to its dock, overlap `candidate`?
/// Only geometry is copied; `existing` is not touched.
pub fn would_conflict_at_dock(existing: &VehicleUnit, candidate: &Shape) -> bool {
    existing.home_shape().interferes(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::occupant::OccupantId;

    fn vehicle(id: &str, dock: (f64, f64)) -> VehicleUnit {
        VehicleUnit::new(id, Position::new(dock.0, dock.1), (1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_new_vehicle_defaults() {
        let v = vehicle("V1", (9.0, 9.0));
        assert!(v.is_active());
        assert_eq!(v.position(), Position::new(9.0, 9.0));
        assert_eq!(v.shape().buffer(), VEHICLE_BUFFER);
        assert_eq!(v.battery(), 100);
        assert_eq!(v.motion_state(), MotionState::Resting);
    }

    #[test]
    fn test_battery_clamped() {
        let mut v = vehicle("V1", (0.0, 0.0)).with_battery(250);
        assert_eq!(v.battery(), 100);
        v.set_battery(-4);
        assert_eq!(v.battery(), 0);
        v.set_battery(42);
        assert_eq!(v.battery(), 42);
    }

    #[test]
    fn test_step_motion_through_path() {
        let mut v = vehicle("V1", (9.0, 9.0));
        v.assign_path([(5.0, 5.0), (1.0, 1.0)]).unwrap();
        assert_eq!(v.motion_state(), MotionState::Moving);

        let step = v.step_motion();
        assert_eq!(
            step,
            MotionStep::Moved {
                from: Position::new(9.0, 9.0),
                to: Position::new(5.0, 5.0)
            }
        );
        assert_eq!(v.trail(), &[Position::new(9.0, 9.0)]);
        assert_eq!(v.shape().reference(), Position::new(5.0, 5.0));
        assert_eq!(v.kinematic().velocity, (-4.0, -4.0));

        match v.step_motion() {
            MotionStep::Arrived(summary) => {
                assert_eq!(summary.destination, Position::new(1.0, 1.0));
                assert_eq!(summary.waypoints, 2);
                let expected = 2.0 * (32.0f64).sqrt();
                assert!((summary.distance - expected).abs() < 1e-9);
            }
            other => panic!("expected arrival, got {:?}", other),
        }
        assert_eq!(v.position(), Position::new(1.0, 1.0));
        assert!(v.trail().is_empty());
        assert!(v.path().is_empty());
        assert!(v.kinematic().is_still());
        assert_eq!(v.motion_state(), MotionState::Resting);
        assert_eq!(v.step_motion(), MotionStep::Idle);
    }

    #[test]
    fn test_collision_deactivates_only_self() {
        let mut a = vehicle("A", (0.0, 0.0));
        let b = vehicle("B", (0.5, 0.0));
        a.assign_path([(3.0, 3.0)]).unwrap();

        let hit = a.collide_with(b.as_occupant()).unwrap();
        assert_eq!(hit.other, OccupantId::vehicle("B"));
        assert_eq!(hit.to_string(), "Vehicle ID#A collides with Vehicle ID#B");
        assert!(!a.is_active());
        assert!(a.path().is_empty());
        assert!(b.is_active());

        // inactive vehicles report nothing further and refuse paths
        assert!(a.collide_with(b.as_occupant()).is_none());
        assert!(matches!(
            a.assign_path([(1.0, 1.0)]),
            Err(VehicleError::PathInactive { .. })
        ));
        assert!(a.path().is_empty());
        assert_eq!(a.step_motion(), MotionStep::Idle);
    }

    #[test]
    fn test_collide_with_self_is_ignored() {
        let mut a = vehicle("A", (0.0, 0.0));
        let twin = a.clone();
        assert!(a.collide_with(twin.as_occupant()).is_none());
        assert!(a.is_active());
    }

    #[test]
    fn test_force_return_home_and_dock_conflict() {
        let mut v = vehicle("V1", (2.0, 2.0)).placed_at(Position::new(7.0, 7.0));
        assert_eq!(v.home_shape().reference(), Position::new(2.0, 2.0));
        // the copy leaves the vehicle where it is
        assert_eq!(v.position(), Position::new(7.0, 7.0));

        let candidate =
            Shape::rectangle(1.0, 1.0, Position::new(2.5, 2.0), RefPointType::Center).unwrap();
        assert!(would_conflict_at_dock(&v, &candidate));
        assert!(!v.shape().interferes(&candidate));

        v.force_return_home();
        assert_eq!(v.position(), Position::new(2.0, 2.0));
        assert_eq!(v.shape().reference(), Position::new(2.0, 2.0));
    }

    #[test]
    fn test_record_round_trip() {
        let v = vehicle("V7", (1.0, 2.0))
            .placed_at(Position::new(4.0, 4.0))
            .with_battery(64);
        let record = v.record();
        assert_eq!(record.geometry.ref_pt, [4.0, 4.0]);
        assert_eq!(record.dock_location, [1.0, 2.0]);
        let back = VehicleUnit::from_record(&record).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_trail_polyline_needs_two_points() {
        let mut v = vehicle("V1", (0.0, 0.0));
        v.assign_path([(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]).unwrap();
        assert!(v.trail_polyline().is_none());
        v.step_motion();
        assert!(v.trail_polyline().is_none());
        v.step_motion();
        assert_eq!(v.trail_polyline().map(|t| t.len()), Some(2));
    }
}
