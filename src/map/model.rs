//! The mutable territory graph for one match.
//!
//! Regions and super regions live in insertion-ordered arenas with an id
//! index on the side. Adjacency is stored as neighbor-id lists on each region,
//! kept symmetric by `add_neighbor`. Setup calls validate the whole batch
//! before touching the graph, so a rejected command leaves no partial edits.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::region::{Region, RegionId};
use super::super_region::{SuperRegion, SuperRegionId};
use crate::error::{ConfigurationError, ValidationError};

/// One visible region as reported by a state refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionUpdate {
    pub id: RegionId,
    pub owner: String,
    /// Signed so that invalid engine data reaches validation intact.
    pub armies: i64,
    /// `None` leaves the stored wasteland flag untouched.
    pub wasteland: Option<bool>,
}

impl RegionUpdate {
    /// An update that leaves the wasteland flag alone.
    pub fn new(id: RegionId, owner: impl Into<String>, armies: i64) -> Self {
        RegionUpdate {
            id,
            owner: owner.into(),
            armies,
            wasteland: None,
        }
    }

    /// Sets the wasteland flag along with owner and armies.
    pub fn with_wasteland(mut self, wasteland: bool) -> Self {
        self.wasteland = Some(wasteland);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapModel {
    regions: Vec<Region>,
    region_index: HashMap<RegionId, usize>,
    super_regions: Vec<SuperRegion>,
    super_index: HashMap<SuperRegionId, usize>,
    /// Set once the match starts; afterwards only owner/army fields change.
    locked: bool,
    /// Regions reported by the latest refresh. Everything else is stale.
    #[serde(default)]
    visible: BTreeSet<RegionId>,
}

impl MapModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Looks up a region by id.
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.region_index.get(&id).map(|&i| &self.regions[i])
    }

    /// Looks up a super region by id.
    pub fn super_region(&self, id: SuperRegionId) -> Option<&SuperRegion> {
        self.super_index.get(&id).map(|&i| &self.super_regions[i])
    }

    /// All regions in declaration order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// All super regions in declaration order.
    pub fn super_regions(&self) -> &[SuperRegion] {
        &self.super_regions
    }

    /// Number of declared regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// The super region a region belongs to.
    pub fn super_region_of(&self, region: RegionId) -> Option<&SuperRegion> {
        self.region(region)
            .and_then(|r| self.super_region(r.super_region()))
    }

    /// Regions currently owned by `player`, in declaration order.
    pub fn owned_regions<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a Region> + 'a {
        self.regions.iter().filter(move |r| r.owned_by_player(player))
    }

    /// Whether the latest refresh reported `region`.
    pub fn is_visible(&self, region: RegionId) -> bool {
        self.visible.contains(&region)
    }

    /// Regions reported by the latest refresh, in declaration order.
    pub fn visible_regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter().filter(move |r| self.visible.contains(&r.id()))
    }

    /// Regions owned by `player` among those the latest refresh reported.
    pub fn visible_owned_regions<'a>(
        &'a self,
        player: &'a str,
    ) -> impl Iterator<Item = &'a Region> + 'a {
        self.visible_regions().filter(move |r| r.owned_by_player(player))
    }

    /// Neighbors of `region` that share its super region.
    pub fn neighbors_within_super_region(&self, region: RegionId) -> Vec<RegionId> {
        let Some(r) = self.region(region) else {
            return Vec::new();
        };
        r.neighbors()
            .iter()
            .copied()
            .filter(|&n| {
                self.region(n)
                    .is_some_and(|nr| nr.super_region() == r.super_region())
            })
            .collect()
    }

    /// Whether setup can still add regions, super regions or edges.
    pub fn is_topology_locked(&self) -> bool {
        self.locked
    }

    /// Freezes the structure. Re-declaring existing elements stays allowed,
    /// anything that would add to the graph is rejected.
    pub fn lock_topology(&mut self) {
        if !self.locked {
            debug!(
                regions = self.regions.len(),
                super_regions = self.super_regions.len(),
                "map topology locked"
            );
            self.locked = true;
        }
    }

    // ------------------------------------------------------------------
    // Structural setup
    // ------------------------------------------------------------------

    /// Creates a super region. An existing id is kept as-is, including its
    /// reward and hazard flag. Returns true if a new super region was created.
    pub fn add_super_region(
        &mut self,
        id: SuperRegionId,
        armies_reward: u32,
        hazard: bool,
    ) -> Result<bool, ConfigurationError> {
        if self.super_index.contains_key(&id) {
            return Ok(false);
        }
        if self.locked {
            return Err(ConfigurationError::TopologyLocked);
        }
        self.super_index.insert(id, self.super_regions.len());
        self.super_regions
            .push(SuperRegion::new(id, armies_reward, hazard));
        trace!(id, armies_reward, hazard, "super region created");
        Ok(true)
    }

    /// Declares `(region, super_region)` memberships, creating regions that
    /// do not exist yet.
    pub fn declare_regions(
        &mut self,
        pairs: &[(RegionId, SuperRegionId)],
    ) -> Result<(), ConfigurationError> {
        let mut pending: HashMap<RegionId, SuperRegionId> = HashMap::new();
        for &(region, super_region) in pairs {
            if !self.super_index.contains_key(&super_region) {
                return Err(ConfigurationError::UnknownSuperRegion(super_region));
            }
            let existing = self
                .region(region)
                .map(Region::super_region)
                .or_else(|| pending.get(&region).copied());
            match existing {
                Some(existing) if existing != super_region => {
                    return Err(ConfigurationError::ConflictingMembership {
                        region,
                        existing,
                        requested: super_region,
                    });
                }
                Some(_) => {}
                None => {
                    if self.locked {
                        return Err(ConfigurationError::TopologyLocked);
                    }
                    pending.insert(region, super_region);
                }
            }
        }

        for &(region, super_region) in pairs {
            if self.region_index.contains_key(&region) {
                continue;
            }
            self.region_index.insert(region, self.regions.len());
            self.regions.push(Region::new(region, super_region));
            let sr = self.super_index[&super_region];
            self.super_regions[sr].add_member(region);
        }
        Ok(())
    }

    /// Registers one undirected edge. Returns true if the edge is new.
    pub fn add_neighbor(&mut self, a: RegionId, b: RegionId) -> Result<bool, ConfigurationError> {
        self.check_edge(a, b)?;
        Ok(self.link(a, b))
    }

    /// Registers a batch of undirected edges.
    pub fn declare_neighbors(
        &mut self,
        pairs: &[(RegionId, RegionId)],
    ) -> Result<(), ConfigurationError> {
        for &(a, b) in pairs {
            self.check_edge(a, b)?;
        }
        let mut added = 0;
        for &(a, b) in pairs {
            if self.link(a, b) {
                added += 1;
            }
        }
        trace!(added, declared = pairs.len(), "neighbors registered");
        Ok(())
    }

    fn check_edge(&self, a: RegionId, b: RegionId) -> Result<(), ConfigurationError> {
        let ra = self
            .region(a)
            .ok_or(ConfigurationError::UnknownRegion(a))?;
        if self.region(b).is_none() {
            return Err(ConfigurationError::UnknownRegion(b));
        }
        if a == b {
            return Err(ConfigurationError::SelfNeighbor(a));
        }
        if self.locked && !ra.is_neighbor(b) {
            return Err(ConfigurationError::TopologyLocked);
        }
        Ok(())
    }

    fn link(&mut self, a: RegionId, b: RegionId) -> bool {
        let ia = self.region_index[&a];
        let ib = self.region_index[&b];
        let forward = self.regions[ia].link(b);
        let backward = self.regions[ib].link(a);
        forward || backward
    }

    // ------------------------------------------------------------------
    // Starting-state seeding
    // ------------------------------------------------------------------

    /// Flags regions as wasteland.
    pub fn mark_wastelands(&mut self, ids: &[RegionId]) -> Result<(), ConfigurationError> {
        self.check_known(ids)?;
        for id in ids {
            let i = self.region_index[id];
            self.regions[i].set_wasteland(true);
        }
        Ok(())
    }

    /// Assigns an owner to regions revealed during setup, keeping their
    /// army counts.
    pub fn seed_owner(&mut self, ids: &[RegionId], owner: &str) -> Result<(), ConfigurationError> {
        self.check_known(ids)?;
        for id in ids {
            let i = self.region_index[id];
            let armies = self.regions[i].armies();
            self.regions[i].set_owner(owner, armies);
        }
        Ok(())
    }

    fn check_known(&self, ids: &[RegionId]) -> Result<(), ConfigurationError> {
        match ids.iter().find(|id| !self.region_index.contains_key(id)) {
            Some(&id) => Err(ConfigurationError::UnknownRegion(id)),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // State refresh
    // ------------------------------------------------------------------

    /// Overwrites owner and armies of exactly the listed regions. Regions not
    /// listed keep their last-known values, which may be stale, and drop out
    /// of the visible set.
    pub fn refresh(&mut self, updates: &[RegionUpdate]) -> Result<(), ValidationError> {
        let mut validated = Vec::with_capacity(updates.len());
        for update in updates {
            let idx = *self
                .region_index
                .get(&update.id)
                .ok_or(ValidationError::UnknownRegion(update.id))?;
            if update.armies < 0 {
                return Err(ValidationError::NegativeArmies {
                    region: update.id,
                    armies: update.armies,
                });
            }
            let armies = u32::try_from(update.armies).map_err(|_| {
                ValidationError::ArmiesOutOfRange {
                    region: update.id,
                    armies: update.armies,
                }
            })?;
            validated.push((idx, armies));
        }

        self.visible.clear();
        for (update, (idx, armies)) in updates.iter().zip(validated) {
            self.visible.insert(update.id);
            let region = &mut self.regions[idx];
            region.set_owner(&update.owner, armies);
            if let Some(wasteland) = update.wasteland {
                region.set_wasteland(wasteland);
            }
        }
        trace!(count = updates.len(), "map refreshed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Serializes the whole map, structure and last-known state, as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Restores a map written by [`MapModel::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
