//! Engine state management.
//!
//! Holds the match state and the random source, applies each parsed command,
//! and writes the responses the engine expects. Mutating commands produce no
//! output; decision commands write exactly one line.

use std::io::Write;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::decision::{attack_transfer_moves, place_armies_moves, preferred_starting_region};
use crate::error::BotError;
use crate::map::SuperRegionId;
use crate::protocol::moves::{format_attack_transfer, format_move_list, format_place_armies};
use crate::protocol::parser::{Command, GoKind, MapSetup};
use crate::state::MatchState;

/// Holds the mutable state of the bot between commands.
pub struct Engine<R = SmallRng> {
    state: MatchState,
    rng: R,
}

impl Engine<SmallRng> {
    /// Creates an engine seeded from entropy, or from `seed` when given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Engine::with_rng(rng)
    }
}

impl<R: Rng> Engine<R> {
    /// Creates an engine drawing from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Engine {
            state: MatchState::new(),
            rng,
        }
    }

    /// Flags the given super regions as hazardous for the starting pick.
    pub fn with_hazards(mut self, hazards: impl IntoIterator<Item = SuperRegionId>) -> Self {
        self.state = MatchState::with_hazards(hazards);
        self
    }

    /// The match state built from the commands seen so far.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Applies one command, writing any response to `out`.
    ///
    /// On error the state is left as it was before the command.
    pub fn handle<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<(), BotError> {
        match cmd {
            Command::Settings { key, value } => {
                self.state.update_setting(&key, &value)?;
            }
            Command::SetupMap(setup) => self.setup_map(setup)?,
            Command::PickStartingRegion { timeout, regions } => {
                self.state.set_pickable_starting_regions(regions);
                let picked = preferred_starting_region(&self.state, timeout);
                self.state.clear_pickable_starting_regions();
                let region = picked?;
                info!(region, "starting region picked");
                writeln!(out, "{}", region)?;
                out.flush()?;
            }
            Command::Go { kind, timeout } => {
                let line = match kind {
                    GoKind::PlaceArmies => {
                        self.state.begin_round();
                        let moves = place_armies_moves(&self.state, &mut self.rng, timeout)?;
                        format_move_list(&moves, format_place_armies)
                    }
                    GoKind::AttackTransfer => {
                        let moves = attack_transfer_moves(&self.state, &mut self.rng, timeout);
                        format_move_list(&moves, format_attack_transfer)
                    }
                };
                writeln!(out, "{}", line)?;
                out.flush()?;
            }
            Command::UpdateMap { updates } => {
                self.state.refresh_map(&updates)?;
            }
            Command::OpponentMoves { moves } => {
                self.state.record_opponent_moves(moves);
            }
        }
        Ok(())
    }

    fn setup_map(&mut self, setup: MapSetup) -> Result<(), BotError> {
        match setup {
            MapSetup::SuperRegions(pairs) => {
                debug!(count = pairs.len(), "setting up super regions");
                self.state.setup_super_regions(&pairs)?;
            }
            MapSetup::Regions(pairs) => {
                debug!(count = pairs.len(), "setting up regions");
                self.state.setup_regions(&pairs)?;
            }
            MapSetup::Neighbors(edges) => {
                debug!(count = edges.len(), "setting up neighbors");
                self.state.setup_neighbors(&edges)?;
            }
            MapSetup::Wastelands(ids) => self.state.setup_wastelands(&ids)?,
            MapSetup::OpponentStartingRegions(ids) => {
                self.state.setup_opponent_starting_regions(&ids)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, DecisionInconsistency, ValidationError};
    use crate::protocol::parser::parse_command;

    /// Feeds lines through the parser and engine, returning the output.
    fn feed(engine: &mut Engine, lines: &[&str]) -> String {
        let mut output = Vec::new();
        for line in lines {
            if let Some(cmd) = parse_command(line).unwrap() {
                engine.handle(cmd, &mut output).unwrap();
            }
        }
        String::from_utf8(output).unwrap()
    }

    const SETUP: &[&str] = &[
        "settings your_bot player1",
        "settings opponent_bot player2",
        "setup_map super_regions 1 2 2 5",
        "setup_map regions 1 1 2 1 3 2 4 2 5 2",
        "setup_map neighbors 1 2,3 2 3 3 4,5 4 5",
    ];

    fn engine() -> Engine {
        let mut engine = Engine::new(Some(42));
        feed(&mut engine, SETUP);
        engine
    }

    #[test]
    fn setup_builds_the_map() {
        let engine = engine();
        let map = engine.state().map();
        assert_eq!(map.region_count(), 5);
        assert_eq!(map.region(3).unwrap().neighbors(), &[1, 2, 4, 5]);
        assert_eq!(map.super_region(2).unwrap().members(), &[3, 4, 5]);
        assert_eq!(engine.state().my_name(), "player1");
    }

    #[test]
    fn mutating_commands_write_nothing() {
        let mut engine = engine();
        let out = feed(
            &mut engine,
            &[
                "update_map 1 player1 2",
                "opponent_moves player2 place_armies 4 2",
                "settings starting_armies 5",
            ],
        );
        assert!(out.is_empty());
        assert_eq!(engine.state().opponent_moves().len(), 1);
    }

    #[test]
    fn pick_starting_region_writes_one_id() {
        let mut engine = engine();
        let out = feed(&mut engine, &["pick_starting_region 10000 1 3"]);
        // Super region 2 has three members, super region 1 only two.
        assert_eq!(out, "3\n");
        assert!(engine.state().pickable_starting_regions().is_empty());
    }

    #[test]
    fn hazards_steer_the_starting_pick() {
        let mut engine = Engine::new(Some(1)).with_hazards([2]);
        feed(&mut engine, SETUP);
        feed(&mut engine, &["setup_map regions 6 1"]);
        let out = feed(&mut engine, &["pick_starting_region 10000 3 1"]);
        assert_eq!(out, "1\n");
    }

    #[test]
    fn place_armies_writes_moves() {
        let mut engine = engine();
        feed(
            &mut engine,
            &["settings starting_armies 6", "update_map 1 player1 2 3 player1 4"],
        );
        let out = feed(&mut engine, &["go place_armies 2000"]);
        let moves: Vec<&str> = out.trim_end().split(',').collect();
        assert_eq!(moves.len(), 3);
        for m in moves {
            assert!(
                m == "player1 place_armies 1 2" || m == "player1 place_armies 3 2",
                "unexpected move: {}",
                m
            );
        }
        assert_eq!(engine.state().round(), 1);
    }

    #[test]
    fn attack_transfer_without_moves_writes_no_moves() {
        let mut engine = engine();
        feed(&mut engine, &["update_map 1 player1 1 2 player2 5 3 player2 5"]);
        let out = feed(&mut engine, &["go attack/transfer 500"]);
        assert_eq!(out, "No moves\n");
    }

    #[test]
    fn attack_transfer_writes_attack() {
        let mut engine = engine();
        feed(&mut engine, &["update_map 1 player1 9 2 player2 5 3 player2 5"]);
        let out = feed(&mut engine, &["go attack/transfer 500"]);
        let line = out.trim_end();
        assert!(
            line == "player1 attack/transfer 1 2 5" || line == "player1 attack/transfer 1 3 5",
            "unexpected output: {}",
            line
        );
    }

    #[test]
    fn placement_without_territory_is_an_error_and_writes_nothing() {
        let mut engine = engine();
        feed(&mut engine, &["settings starting_armies 4"]);
        let cmd = parse_command("go place_armies 100").unwrap().unwrap();
        let mut out = Vec::new();
        let err = engine.handle(cmd, &mut out).unwrap_err();
        assert!(matches!(
            err,
            BotError::Decision(DecisionInconsistency::NoOwnedRegions { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn bad_update_keeps_previous_state() {
        let mut engine = engine();
        feed(&mut engine, &["update_map 1 player1 4"]);
        let cmd = parse_command("update_map 1 player2 3 2 player2 -1").unwrap().unwrap();
        let err = engine.handle(cmd, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            BotError::Validation(ValidationError::NegativeArmies { region: 2, .. })
        ));
        let r1 = engine.state().map().region(1).unwrap();
        assert_eq!((r1.owner(), r1.armies()), ("player1", 4));
    }

    #[test]
    fn bad_setup_is_a_configuration_error() {
        let mut engine = engine();
        let cmd = parse_command("setup_map neighbors 1 9").unwrap().unwrap();
        let err = engine.handle(cmd, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            BotError::Configuration(ConfigurationError::UnknownRegion(9))
        ));
        assert!(!engine.state().map().region(1).unwrap().is_neighbor(9));
    }

    #[test]
    fn unparsable_arguments_keep_their_error_class() {
        let setup = parse_command("setup_map super_regions 1 x").unwrap_err();
        assert!(matches!(
            BotError::from(setup),
            BotError::Configuration(ConfigurationError::MalformedSetup { .. })
        ));
        let update = parse_command("update_map 1 player1").unwrap_err();
        assert!(matches!(
            BotError::from(update),
            BotError::Validation(ValidationError::MalformedUpdate { .. })
        ));
        let unknown = parse_command("surrender now").unwrap_err();
        assert!(matches!(BotError::from(unknown), BotError::Protocol(_)));
    }

    #[test]
    fn out_of_view_regions_are_ignored_by_decisions() {
        let mut engine = engine();
        feed(
            &mut engine,
            &[
                "settings starting_armies 8",
                "update_map 1 player1 9 2 neutral 2 4 player1 9 5 neutral 2",
                "update_map 1 player1 9 2 neutral 2",
            ],
        );
        let out = feed(&mut engine, &["go place_armies 500", "go attack/transfer 500"]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].split(',').all(|m| m == "player1 place_armies 1 2"));
        assert!(lines[1].starts_with("player1 attack/transfer 1 "), "got: {}", lines[1]);
    }

    #[test]
    fn opponent_starting_regions_are_marked() {
        let mut engine = engine();
        feed(&mut engine, &["setup_map opponent_starting_regions 4 5"]);
        let map = engine.state().map();
        assert!(map.region(4).unwrap().owned_by_player("player2"));
        assert_eq!(
            map.super_region(2).unwrap().owned_by_player(map),
            None
        );
    }

    #[test]
    fn same_seed_same_session_output() {
        let session = [
            "settings starting_armies 8",
            "update_map 1 player1 8 2 player1 3 3 player2 2",
            "go place_armies 100",
            "go attack/transfer 100",
        ];
        let mut a = engine();
        let mut b = engine();
        assert_eq!(feed(&mut a, &session), feed(&mut b, &session));
    }
}
