//! Super regions: fixed groups of regions worth a per-turn army bonus.

use serde::{Deserialize, Serialize};

use super::model::MapModel;
use super::region::{RegionId, UNKNOWN_OWNER};

/// Engine-assigned super region identifier.
pub type SuperRegionId = u32;

/// A group of regions granting `armies_reward` extra armies per turn to the
/// player holding every member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperRegion {
    id: SuperRegionId,
    armies_reward: u32,
    /// Marks the super region as a poor place to start. Only the starting
    /// pick reads it.
    hazard: bool,
    members: Vec<RegionId>,
}

impl SuperRegion {
    /// Creates an empty super region.
    pub fn new(id: SuperRegionId, armies_reward: u32, hazard: bool) -> Self {
        SuperRegion {
            id,
            armies_reward,
            hazard,
            members: Vec::new(),
        }
    }

    /// Engine-assigned id.
    pub fn id(&self) -> SuperRegionId {
        self.id
    }

    /// Extra armies per turn for holding every member.
    pub fn armies_reward(&self) -> u32 {
        self.armies_reward
    }

    /// Whether the starting pick should avoid this super region.
    pub fn is_hazard(&self) -> bool {
        self.hazard
    }

    /// Member region ids in the order they were declared.
    pub fn members(&self) -> &[RegionId] {
        &self.members
    }

    /// Number of member regions.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn add_member(&mut self, region: RegionId) {
        if !self.members.contains(&region) {
            self.members.push(region);
        }
    }

    /// Returns the player owning every member region.
    ///
    /// `None` when membership is empty, when members disagree, or when the
    /// shared owner is the unobserved sentinel.
    pub fn owned_by_player<'m>(&self, map: &'m MapModel) -> Option<&'m str> {
        let mut owners = self
            .members
            .iter()
            .map(|&id| map.region(id).map(|r| r.owner()));
        let first = owners.next()??;
        if first == UNKNOWN_OWNER {
            return None;
        }
        for owner in owners {
            if owner? != first {
                return None;
            }
        }
        Some(first)
    }
}
