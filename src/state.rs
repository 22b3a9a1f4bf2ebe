//! Per-match state.
//!
//! Holds the engine-supplied settings, the map, the regions currently on
//! offer for the starting pick, and the opponent's move history. One
//! `MatchState` exists per match; nothing in it is shared across matches.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ConfigurationError, ValidationError};
use crate::map::{MapModel, Move, Region, RegionId, RegionUpdate, SuperRegionId};

/// Settings pushed by the engine with `settings <key> <value>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Our player name; owner strings equal to it mean "ours".
    pub my_name: String,
    pub opponent_name: Option<String>,
    /// Armies to place this turn.
    pub starting_armies: u32,
    pub timebank: Option<Duration>,
    pub time_per_move: Option<Duration>,
    pub max_rounds: Option<u32>,
    pub starting_pick_amount: Option<u32>,
    pub starting_regions: Vec<RegionId>,
    /// Keys this bot does not interpret, kept verbatim.
    pub other: HashMap<String, String>,
}

impl Settings {
    /// Applies one setting. Unknown keys are stored, not rejected.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), ConfigurationError> {
        match key {
            "your_bot" => self.my_name = value.to_string(),
            "opponent_bot" => self.opponent_name = Some(value.to_string()),
            "starting_armies" => self.starting_armies = parse_setting(key, value)?,
            "timebank" => {
                self.timebank = Some(Duration::from_millis(parse_setting(key, value)?));
            }
            "time_per_move" => {
                self.time_per_move = Some(Duration::from_millis(parse_setting(key, value)?));
            }
            "max_rounds" => self.max_rounds = Some(parse_setting(key, value)?),
            "starting_pick_amount" => self.starting_pick_amount = Some(parse_setting(key, value)?),
            "starting_regions" => self.starting_regions = parse_id_list(key, value)?,
            _ => {
                debug!(key, value, "storing uninterpreted setting");
                self.other.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigurationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Parses ids separated by commas and/or spaces.
pub(crate) fn parse_id_list(key: &str, value: &str) -> Result<Vec<u32>, ConfigurationError> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| parse_setting(key, t))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MatchState {
    settings: Settings,
    map: MapModel,
    /// Super regions flagged hazardous when they are created.
    hazard_super_regions: BTreeSet<SuperRegionId>,
    pickable_starting_regions: Vec<RegionId>,
    opponent_starting_regions: Vec<RegionId>,
    /// Opponent moves keyed by the round in which they were reported.
    /// Holds at most `max_rounds` entries once that setting is known.
    opponent_moves: Vec<(u32, Vec<Move>)>,
    round: u32,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state that flags the given super regions as hazardous.
    pub fn with_hazards(hazards: impl IntoIterator<Item = SuperRegionId>) -> Self {
        MatchState {
            hazard_super_regions: hazards.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Settings received so far.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The map as last reported.
    pub fn map(&self) -> &MapModel {
        &self.map
    }

    /// Our player name, empty until `your_bot` arrives.
    pub fn my_name(&self) -> &str {
        &self.settings.my_name
    }

    /// Armies to place this turn.
    pub fn starting_armies(&self) -> u32 {
        self.settings.starting_armies
    }

    /// Number of placement requests seen so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Super region ids configured as hazardous.
    pub fn hazard_super_regions(&self) -> &BTreeSet<SuperRegionId> {
        &self.hazard_super_regions
    }

    /// The current starting offer, empty outside a pick.
    pub fn pickable_starting_regions(&self) -> &[RegionId] {
        &self.pickable_starting_regions
    }

    /// Regions the opponent was revealed to start in.
    pub fn opponent_starting_regions(&self) -> &[RegionId] {
        &self.opponent_starting_regions
    }

    /// Opponent moves as `(round, moves)`, oldest first.
    pub fn opponent_moves(&self) -> &[(u32, Vec<Move>)] {
        &self.opponent_moves
    }

    /// Regions we own according to the latest `update_map`, in map order.
    /// Regions that dropped out of view are left out even if their stale
    /// owner is still us.
    pub fn visible_owned_regions(&self) -> impl Iterator<Item = &Region> {
        self.map.visible_owned_regions(&self.settings.my_name)
    }

    /// Applies `settings <key> <value>`. `hazard_super_regions` extends the
    /// hazard set; it only affects super regions created afterwards.
    pub fn update_setting(&mut self, key: &str, value: &str) -> Result<(), ConfigurationError> {
        if key == "hazard_super_regions" {
            let ids = parse_id_list(key, value)?;
            let too_late: Vec<SuperRegionId> = ids
                .iter()
                .copied()
                .filter(|&id| self.map.super_region(id).is_some_and(|sr| !sr.is_hazard()))
                .collect();
            if !too_late.is_empty() {
                warn!(
                    super_regions = ?too_late,
                    "hazard setting ignored for super regions that already exist"
                );
            }
            self.hazard_super_regions.extend(ids);
            return Ok(());
        }
        self.settings.update(key, value)?;
        if key == "your_bot" {
            info!(name = %self.settings.my_name, "player name set");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Map setup
    // ------------------------------------------------------------------

    /// Creates super regions, flagging the configured hazards.
    pub fn setup_super_regions(
        &mut self,
        pairs: &[(SuperRegionId, u32)],
    ) -> Result<(), ConfigurationError> {
        for &(id, reward) in pairs {
            let hazard = self.hazard_super_regions.contains(&id);
            self.map.add_super_region(id, reward, hazard)?;
        }
        Ok(())
    }

    /// Declares region memberships.
    pub fn setup_regions(
        &mut self,
        pairs: &[(RegionId, SuperRegionId)],
    ) -> Result<(), ConfigurationError> {
        self.map.declare_regions(pairs)
    }

    /// Registers undirected borders.
    pub fn setup_neighbors(&mut self, pairs: &[(RegionId, RegionId)]) -> Result<(), ConfigurationError> {
        self.map.declare_neighbors(pairs)
    }

    /// Flags regions as wasteland.
    pub fn setup_wastelands(&mut self, ids: &[RegionId]) -> Result<(), ConfigurationError> {
        self.map.mark_wastelands(ids)
    }

    /// Records where the opponent starts and marks those regions as theirs
    /// when the opponent's name is known.
    pub fn setup_opponent_starting_regions(
        &mut self,
        ids: &[RegionId],
    ) -> Result<(), ConfigurationError> {
        if let Some(opponent) = self.settings.opponent_name.clone() {
            self.map.seed_owner(ids, &opponent)?;
        } else if let Some(&missing) = ids.iter().find(|&&id| self.map.region(id).is_none()) {
            return Err(ConfigurationError::UnknownRegion(missing));
        }
        self.opponent_starting_regions = ids.to_vec();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Per-turn mutation
    // ------------------------------------------------------------------

    /// Offers a new set of starting regions. Fixes the map topology.
    pub fn set_pickable_starting_regions(&mut self, ids: Vec<RegionId>) {
        self.map.lock_topology();
        self.pickable_starting_regions = ids;
    }

    /// Drops the starting offer once it has been answered.
    pub fn clear_pickable_starting_regions(&mut self) {
        self.pickable_starting_regions.clear();
    }

    /// Applies an `update_map` snapshot. Fixes the map topology.
    pub fn refresh_map(&mut self, updates: &[RegionUpdate]) -> Result<(), ValidationError> {
        self.map.lock_topology();
        self.map.refresh(updates)
    }

    /// Appends the opponent's latest moves, dropping the oldest rounds once
    /// the history is longer than `max_rounds`.
    pub fn record_opponent_moves(&mut self, moves: Vec<Move>) {
        debug!(round = self.round, count = moves.len(), "opponent moves recorded");
        self.opponent_moves.push((self.round, moves));
        if let Some(max) = self.settings.max_rounds {
            let excess = self.opponent_moves.len().saturating_sub(max as usize);
            self.opponent_moves.drain(..excess);
        }
    }

    /// Marks the start of a new round.
    pub fn begin_round(&mut self) {
        self.round += 1;
    }
}
