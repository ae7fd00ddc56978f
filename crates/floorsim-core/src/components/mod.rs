//! Plain data for everything on the floor.
//!
//! Components carry local behaviour only (a shelf checks its own capacity,
//! a vehicle steps its own path). Anything that looks across units lives
//! in the registries and systems.

mod common;
mod occupant;
mod path;
mod shape;
mod storage;
mod vehicle;

pub use common::*;
pub use occupant::*;
pub use path::*;
pub use shape::*;
pub use storage::*;
pub use vehicle::*;
