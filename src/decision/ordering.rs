//! Sort keys for ranking candidate regions.
//!
//! Plain functions of the map, meant for `sort_by_key`. Regions missing from
//! the map rank as if their super region were empty.

use crate::map::{MapModel, RegionId};

/// Member count of the region's super region.
pub fn super_region_size(map: &MapModel, region: RegionId) -> usize {
    map.super_region_of(region).map_or(0, |sr| sr.size())
}

/// True if the region's super region is flagged hazardous. Sorts
/// non-hazardous regions first.
pub fn is_hazard(map: &MapModel, region: RegionId) -> bool {
    map.super_region_of(region).is_some_and(|sr| sr.is_hazard())
}

/// Number of neighbors inside the region's own super region.
pub fn internal_neighbor_count(map: &MapModel, region: RegionId) -> usize {
    map.neighbors_within_super_region(region).len()
}

/// Bonus armies granted by the region's super region.
pub fn armies_reward(map: &MapModel, region: RegionId) -> u32 {
    map.super_region_of(region).map_or(0, |sr| sr.armies_reward())
}
