//! FloorSim Core - Warehouse Floor Simulation Engine
//!
//! A tick-driven simulation of a rectangular warehouse floor: fixed shelves
//! with tracked inventory, and vehicles that follow waypoint paths and stop
//! when they run into something.
//!
//! # Architecture
//!
//! - **Components**: plain data with local behaviour (shapes, paths, shelves, vehicles)
//! - **Registries**: ordered id → unit maps that validate every placement
//! - **Systems**: logic across registries (movement, collision sweep, load batches)
//! - **Warehouse**: owns the layout and both registries and runs ticks
//!
//! The core never sleeps, spawns or touches the filesystem on its own. A
//! driver calls into it once per tick and decides what to do with the results.
//!
//! # Example
//!
//! ```rust,no_run
//! use floorsim_core::prelude::*;
//!
//! let mut warehouse = Warehouse::with_layout(10.0, 10.0, Position::ORIGIN).unwrap();
//! let shelf = StorageUnit::new("S1", Position::new(2.0, 2.0), Position::new(2.0, 3.0), 1.0, 100.0).unwrap();
//! warehouse.add_storage_unit(shelf).unwrap();
//!
//! let vehicle = warehouse.new_vehicle("V1", Position::new(9.0, 9.0), (1.0, 1.0)).unwrap();
//! warehouse.add_vehicle_unit(vehicle).unwrap();
//! warehouse.assign_path("V1", [(5.0, 5.0), (1.0, 1.0)]).unwrap();
//!
//! loop {
//!     let report = warehouse.tick();
//!     for hit in &report.collisions {
//!         println!("{}", hit);
//!     }
//! }
//! ```

pub mod components;
pub mod config;
pub mod error;
pub mod persistence;
pub mod registry;
pub mod systems;
pub mod warehouse;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::error::*;
    pub use crate::persistence::{LoadReport, SaveError, WarehouseSnapshot};
    pub use crate::registry::{Occupant, Storage, Vehicles};
    pub use crate::systems::{CollisionStrategy, LoadAction, LoadEntry, LoadOutcome};
    pub use crate::warehouse::{LayoutChange, TickReport, Warehouse};
}
