//! Army placement.
//!
//! Splits the turn's allotment into fixed increments and drops each one on
//! a visible owned region chosen uniformly at random. Increments may stack.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use super::note_budget;
use crate::error::DecisionInconsistency;
use crate::map::{PlaceArmiesMove, Region, RegionId};
use crate::state::MatchState;

/// Armies assigned by a single placement move.
pub const PLACEMENT_INCREMENT: u32 = 2;

/// Places the whole starting-army allotment on owned regions.
///
/// The last move carries the remainder when the allotment is not a multiple
/// of [`PLACEMENT_INCREMENT`], so the moves always sum to the allotment.
pub fn place_armies_moves(
    state: &MatchState,
    rng: &mut impl Rng,
    budget: Duration,
) -> Result<Vec<PlaceArmiesMove>, DecisionInconsistency> {
    let started = Instant::now();
    let mut armies_left = state.starting_armies();
    if armies_left == 0 {
        return Ok(Vec::new());
    }

    let owned: Vec<RegionId> = state.visible_owned_regions().map(Region::id).collect();
    if owned.is_empty() {
        return Err(DecisionInconsistency::NoOwnedRegions {
            player: state.my_name().to_string(),
            armies: armies_left,
        });
    }

    let mut moves = Vec::new();
    while armies_left > 0 {
        let armies = armies_left.min(PLACEMENT_INCREMENT);
        let region = owned[rng.gen_range(0..owned.len())];
        moves.push(PlaceArmiesMove {
            player: state.my_name().to_string(),
            region,
            armies,
        });
        armies_left -= armies;
    }

    debug!(
        moves = moves.len(),
        armies = state.starting_armies(),
        candidates = owned.len(),
        "placement decided"
    );
    note_budget("place_armies", started, budget);
    Ok(moves)
}
