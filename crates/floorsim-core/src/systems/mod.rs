//! Systems - logic that runs across registries

mod collision;
mod inventory;
mod movement;

pub use collision::*;
pub use inventory::*;
pub use movement::*;
