//! Regions: the nodes of the territory graph.
//!
//! A region stores its neighbors by id rather than by reference, so the
//! symmetric adjacency lives entirely inside the owning `MapModel` arena.

use serde::{Deserialize, Serialize};

use super::super_region::SuperRegionId;

/// Engine-assigned region identifier, stable for the whole match.
pub type RegionId = u32;

/// Owner name for a region that has never been observed this match.
pub const UNKNOWN_OWNER: &str = "unknown";

/// A single territory on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    id: RegionId,
    super_region: SuperRegionId,
    /// Neighbor ids in registration order. Never contains `id` or duplicates.
    neighbors: Vec<RegionId>,
    owner: String,
    armies: u32,
    wasteland: bool,
}

impl Region {
    /// Creates an unobserved region belonging to `super_region`.
    pub fn new(id: RegionId, super_region: SuperRegionId) -> Self {
        Region {
            id,
            super_region,
            neighbors: Vec::new(),
            owner: UNKNOWN_OWNER.to_string(),
            armies: 0,
            wasteland: false,
        }
    }

    /// Engine-assigned id.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// The super region this region belongs to.
    pub fn super_region(&self) -> SuperRegionId {
        self.super_region
    }

    /// Adjacent region ids in registration order.
    pub fn neighbors(&self) -> &[RegionId] {
        &self.neighbors
    }

    /// Last reported owner, or [`UNKNOWN_OWNER`].
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Last reported army count.
    pub fn armies(&self) -> u32 {
        self.armies
    }

    /// Whether the region started as a heavily garrisoned wasteland.
    pub fn is_wasteland(&self) -> bool {
        self.wasteland
    }

    /// Returns true if `player` is the current owner.
    pub fn owned_by_player(&self, player: &str) -> bool {
        self.owner == player
    }

    /// Returns true if no owner has been reported for this region yet.
    pub fn is_unknown(&self) -> bool {
        self.owner == UNKNOWN_OWNER
    }

    /// Returns true if `other` shares a border with this region.
    pub fn is_neighbor(&self, other: RegionId) -> bool {
        self.neighbors.contains(&other)
    }

    /// Records a one-directional edge. Returns false if it was already present
    /// or would be a self-loop. `MapModel` calls this for both endpoints.
    pub(crate) fn link(&mut self, other: RegionId) -> bool {
        if other == self.id || self.neighbors.contains(&other) {
            return false;
        }
        self.neighbors.push(other);
        true
    }

    pub(crate) fn set_owner(&mut self, owner: &str, armies: u32) {
        if self.owner != owner {
            self.owner = owner.to_string();
        }
        self.armies = armies;
    }

    pub(crate) fn set_wasteland(&mut self, wasteland: bool) {
        self.wasteland = wasteland;
    }
}
