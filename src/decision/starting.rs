//! Starting-region preference.
//!
//! Ranks the offered regions by the size of their super region, then breaks
//! a tie at the top by hazard flag and finally by how many neighbors the
//! region has inside its own super region. Fully deterministic: equal keys
//! keep the engine's offer order.

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use tracing::debug;

use super::note_budget;
use super::ordering::{internal_neighbor_count, is_hazard, super_region_size};
use crate::error::DecisionInconsistency;
use crate::map::RegionId;
use crate::state::MatchState;

/// Picks the most preferred region among the state's pickable starting
/// regions.
pub fn preferred_starting_region(
    state: &MatchState,
    budget: Duration,
) -> Result<RegionId, DecisionInconsistency> {
    let started = Instant::now();
    let candidates = state.pickable_starting_regions();
    match candidates {
        [] => return Err(DecisionInconsistency::NoStartingCandidates),
        [only] => return Ok(*only),
        _ => {}
    }

    let map = state.map();
    if let Some(&missing) = candidates.iter().find(|&&id| map.region(id).is_none()) {
        return Err(DecisionInconsistency::UnknownCandidate(missing));
    }

    let mut ranked = candidates.to_vec();
    ranked.sort_by_key(|&id| Reverse(super_region_size(map, id)));

    let leader_size = super_region_size(map, ranked[0]);
    if super_region_size(map, ranked[1]) != leader_size {
        debug!(region = ranked[0], size = leader_size, "unique largest super region");
        note_budget("pick_starting_region", started, budget);
        return Ok(ranked[0]);
    }

    // At most three candidates enter the tie-break.
    let pool_len = if ranked.len() > 2 && super_region_size(map, ranked[2]) == leader_size {
        3
    } else {
        2
    };
    let mut pool = ranked[..pool_len].to_vec();
    pool.sort_by_key(|&id| is_hazard(map, id));

    let lead_hazard = is_hazard(map, pool[0]);
    if lead_hazard != is_hazard(map, pool[1]) {
        debug!(region = pool[0], "size tie broken by hazard flag");
        note_budget("pick_starting_region", started, budget);
        return Ok(pool[0]);
    }

    pool.retain(|&id| is_hazard(map, id) == lead_hazard);
    pool.sort_by_key(|&id| Reverse(internal_neighbor_count(map, id)));
    debug!(region = pool[0], "size tie broken by internal neighbors");
    note_budget("pick_starting_region", started, budget);
    Ok(pool[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: Duration = Duration::from_millis(500);

    /// Builds super regions from `(id, size, hazard)`. Region ids are
    /// `id * 10 + i` for `i` in `0..size`.
    fn build(specs: &[(u32, u32, bool)]) -> MatchState {
        let hazards = specs.iter().filter(|s| s.2).map(|s| s.0);
        let mut state = MatchState::with_hazards(hazards);
        let supers: Vec<_> = specs.iter().map(|&(id, _, _)| (id, 1)).collect();
        state.setup_super_regions(&supers).unwrap();
        let regions: Vec<_> = specs
            .iter()
            .flat_map(|&(id, size, _)| (0..size).map(move |i| (id * 10 + i, id)))
            .collect();
        state.setup_regions(&regions).unwrap();
        state
    }

    /// Connects `region` to `count` other members of its super region.
    fn link_internal(state: &mut MatchState, region: u32, count: u32) {
        let base = (region / 10) * 10;
        let pairs: Vec<_> = (1..=count).map(|i| (region, base + i)).collect();
        state.setup_neighbors(&pairs).unwrap();
    }

    fn pick(state: &mut MatchState, offer: &[u32]) -> Result<u32, DecisionInconsistency> {
        state.set_pickable_starting_regions(offer.to_vec());
        preferred_starting_region(state, BUDGET)
    }

    #[test]
    fn single_candidate_is_returned_directly() {
        let mut state = build(&[(1, 2, true)]);
        assert_eq!(pick(&mut state, &[11]), Ok(11));
    }

    #[test]
    fn empty_offer_is_inconsistent() {
        let mut state = build(&[(1, 2, false)]);
        assert_eq!(
            pick(&mut state, &[]),
            Err(DecisionInconsistency::NoStartingCandidates)
        );
    }

    #[test]
    fn unknown_candidate_is_inconsistent() {
        let mut state = build(&[(1, 2, false)]);
        assert_eq!(
            pick(&mut state, &[10, 77]),
            Err(DecisionInconsistency::UnknownCandidate(77))
        );
    }

    #[test]
    fn unique_largest_super_region_wins() {
        let mut state = build(&[(1, 3, false), (2, 5, true), (3, 4, false)]);
        assert_eq!(pick(&mut state, &[10, 20, 30]), Ok(20));
    }

    #[test]
    fn size_tie_prefers_non_hazard() {
        let mut state = build(&[(1, 4, true), (2, 4, false), (3, 2, false)]);
        link_internal(&mut state, 10, 3);
        assert_eq!(pick(&mut state, &[10, 20, 30]), Ok(20));
    }

    #[test]
    fn three_way_tie_never_picks_the_hazardous_region() {
        let mut state = build(&[(1, 5, false), (2, 5, false), (3, 5, true), (4, 3, false)]);
        link_internal(&mut state, 10, 1);
        link_internal(&mut state, 20, 3);
        link_internal(&mut state, 30, 4);
        assert_eq!(pick(&mut state, &[10, 20, 30, 40]), Ok(20));
    }

    #[test]
    fn hazard_tie_prefers_more_internal_neighbors() {
        let mut state = build(&[(1, 4, false), (2, 4, false)]);
        link_internal(&mut state, 10, 1);
        link_internal(&mut state, 20, 2);
        assert_eq!(pick(&mut state, &[10, 20]), Ok(20));
    }

    #[test]
    fn all_hazardous_falls_through_to_neighbors() {
        let mut state = build(&[(1, 3, true), (2, 3, true)]);
        link_internal(&mut state, 10, 2);
        link_internal(&mut state, 20, 1);
        assert_eq!(pick(&mut state, &[20, 10]), Ok(10));
    }

    #[test]
    fn full_tie_keeps_offer_order() {
        let mut state = build(&[(1, 3, false), (2, 3, false)]);
        assert_eq!(pick(&mut state, &[21, 11]), Ok(21));
    }

    #[test]
    fn fourth_tied_candidate_is_outside_the_pool() {
        let mut state = build(&[(1, 4, true), (2, 4, true), (3, 4, true), (4, 4, false)]);
        link_internal(&mut state, 10, 1);
        link_internal(&mut state, 20, 2);
        link_internal(&mut state, 30, 3);
        assert_eq!(pick(&mut state, &[10, 20, 30, 40]), Ok(30));
    }

    #[test]
    fn repeated_picks_are_identical() {
        let mut state = build(&[(1, 5, false), (2, 5, false), (3, 5, false)]);
        link_internal(&mut state, 10, 2);
        link_internal(&mut state, 20, 2);
        link_internal(&mut state, 30, 2);
        let first = pick(&mut state, &[30, 10, 20]).unwrap();
        for _ in 0..10 {
            assert_eq!(pick(&mut state, &[30, 10, 20]).unwrap(), first);
        }
        assert_eq!(first, 30);
    }
}
