//! Attack/transfer decisions.
//!
//! Each visible owned region looks at its neighbors in random order and acts on the
//! first one that qualifies: attack a foreign neighbor when it has more than
//! [`ATTACK_THRESHOLD`] armies, reinforce a friendly one when it has more
//! than [`TRANSFER_THRESHOLD`]. A neighbor counts as friendly only if the
//! latest update reported it as ours. Regions do not coordinate.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use super::note_budget;
use crate::map::AttackTransferMove;
use crate::state::MatchState;

/// A source attacks only with strictly more armies than this.
pub const ATTACK_THRESHOLD: u32 = 6;

/// A source transfers only with strictly more armies than this.
pub const TRANSFER_THRESHOLD: u32 = 1;

/// Armies sent by every attack or transfer.
pub const MOVE_FORCE: u32 = 5;

/// Produces at most one attack or transfer per owned region.
pub fn attack_transfer_moves(
    state: &MatchState,
    rng: &mut impl Rng,
    budget: Duration,
) -> Vec<AttackTransferMove> {
    let started = Instant::now();
    let map = state.map();
    let me = state.my_name();
    let mut moves = Vec::new();

    for source in state.visible_owned_regions() {
        let mut pool = source.neighbors().to_vec();
        while !pool.is_empty() {
            let idx = rng.gen_range(0..pool.len());
            let target = pool[idx];
            let friendly = map.is_visible(target)
                && map.region(target).is_some_and(|r| r.owned_by_player(me));

            let qualifies = if friendly {
                source.armies() > TRANSFER_THRESHOLD
            } else {
                source.armies() > ATTACK_THRESHOLD
            };
            if qualifies {
                moves.push(AttackTransferMove {
                    player: me.to_string(),
                    from: source.id(),
                    to: target,
                    armies: MOVE_FORCE,
                });
                break;
            }
            pool.swap_remove(idx);
        }
    }

    debug!(moves = moves.len(), "attack/transfer decided");
    note_budget("attack/transfer", started, budget);
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::RegionUpdate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BUDGET: Duration = Duration::from_millis(500);

    /// Star map: region 1 in the middle, neighbors 2, 3, 4.
    fn star(updates: &[RegionUpdate]) -> MatchState {
        let mut state = MatchState::new();
        state.update_setting("your_bot", "player1").unwrap();
        state.setup_super_regions(&[(1, 2)]).unwrap();
        state
            .setup_regions(&[(1, 1), (2, 1), (3, 1), (4, 1)])
            .unwrap();
        state.setup_neighbors(&[(1, 2), (1, 3), (1, 4)]).unwrap();
        state.refresh_map(updates).unwrap();
        state
    }

    fn run(state: &MatchState, seed: u64) -> Vec<AttackTransferMove> {
        attack_transfer_moves(state, &mut StdRng::seed_from_u64(seed), BUDGET)
    }

    #[test]
    fn strong_source_attacks_enemy_neighbor() {
        let state = star(&[
            RegionUpdate::new(1, "player1", 7),
            RegionUpdate::new(2, "player2", 3),
            RegionUpdate::new(3, "neutral", 2),
            RegionUpdate::new(4, "player2", 1),
        ]);
        for seed in 0..20 {
            let moves = run(&state, seed);
            assert_eq!(moves.len(), 1);
            assert_eq!(moves[0].from, 1);
            assert!([2, 3, 4].contains(&moves[0].to));
            assert_eq!(moves[0].armies, MOVE_FORCE);
        }
    }

    #[test]
    fn weak_source_transfers_to_friendly_neighbor() {
        let state = star(&[
            RegionUpdate::new(1, "player1", 2),
            RegionUpdate::new(2, "player1", 1),
            RegionUpdate::new(3, "player1", 1),
            RegionUpdate::new(4, "player1", 1),
        ]);
        let moves = run(&state, 3);
        let from_center: Vec<_> = moves.iter().filter(|m| m.from == 1).collect();
        assert_eq!(from_center.len(), 1);
        assert_eq!(from_center[0].armies, MOVE_FORCE);
        // Leaves with a single army stay put.
        assert!(moves.iter().all(|m| m.from == 1));
    }

    #[test]
    fn single_army_among_friends_does_nothing() {
        let state = star(&[
            RegionUpdate::new(1, "player1", 1),
            RegionUpdate::new(2, "player1", 1),
            RegionUpdate::new(3, "player1", 1),
            RegionUpdate::new(4, "player1", 1),
        ]);
        assert!(run(&state, 11).is_empty());
    }

    #[test]
    fn weak_source_skips_enemies_and_finds_the_friend() {
        let state = star(&[
            RegionUpdate::new(1, "player1", 4),
            RegionUpdate::new(2, "player2", 3),
            RegionUpdate::new(3, "player1", 1),
            RegionUpdate::new(4, "neutral", 2),
        ]);
        for seed in 0..20 {
            let moves = run(&state, seed);
            assert_eq!(moves.len(), 1);
            assert_eq!((moves[0].from, moves[0].to), (1, 3));
        }
    }

    #[test]
    fn weak_source_surrounded_by_enemies_does_nothing() {
        let state = star(&[
            RegionUpdate::new(1, "player1", 6),
            RegionUpdate::new(2, "player2", 3),
            RegionUpdate::new(3, "neutral", 2),
            RegionUpdate::new(4, "player2", 2),
        ]);
        assert!(run(&state, 5).is_empty());
    }

    #[test]
    fn unknown_neighbors_count_as_foreign() {
        let state = star(&[RegionUpdate::new(1, "player1", 9)]);
        let moves = run(&state, 1);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].from, 1);
    }

    #[test]
    fn stale_regions_neither_attack_nor_receive_transfers() {
        let mut state = star(&[
            RegionUpdate::new(1, "player1", 9),
            RegionUpdate::new(2, "player1", 9),
            RegionUpdate::new(3, "player2", 2),
            RegionUpdate::new(4, "player2", 2),
        ]);
        // Region 2 drops out of view while its stale owner is still us.
        state
            .refresh_map(&[
                RegionUpdate::new(1, "player1", 4),
                RegionUpdate::new(3, "player2", 2),
                RegionUpdate::new(4, "player2", 2),
            ])
            .unwrap();
        for seed in 0..20 {
            // Four armies cannot attack, and the only friend is out of view.
            assert!(run(&state, seed).is_empty());
        }
    }

    #[test]
    fn at_most_one_move_per_source() {
        let state = star(&[
            RegionUpdate::new(1, "player1", 10),
            RegionUpdate::new(2, "player1", 8),
            RegionUpdate::new(3, "player2", 3),
            RegionUpdate::new(4, "player1", 2),
        ]);
        let moves = run(&state, 9);
        let mut sources: Vec<_> = moves.iter().map(|m| m.from).collect();
        sources.sort_unstable();
        sources.dedup();
        assert_eq!(sources.len(), moves.len());
        assert_eq!(moves.len(), 3);
    }
}
