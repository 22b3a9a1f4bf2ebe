//! Territory graph and move types.
//!
//! Contains regions, super regions, the per-match map arena, and the move
//! data the bot emits and ingests.

pub mod model;
pub mod moves;
pub mod region;
pub mod super_region;

pub use model::{MapModel, RegionUpdate};
pub use moves::{AttackTransferMove, Move, PlaceArmiesMove};
pub use region::{Region, RegionId, UNKNOWN_OWNER};
pub use super_region::{SuperRegion, SuperRegionId};
