//! Engine command parser.
//!
//! Parses incoming protocol lines into structured `Command` variants that the
//! engine loop can dispatch on. Parsing never touches match state, so
//! reference errors (unknown region ids, negative armies) are left for the
//! map to reject. Unparsable `setup_map` arguments are configuration errors
//! and unparsable `update_map` entries are validation errors.

use std::time::Duration;

use tracing::warn;

use super::moves::parse_moves;
use crate::error::{ConfigurationError, ParseError, ProtocolError, ValidationError};
use crate::map::{Move, RegionId, RegionUpdate, SuperRegionId};

/// Which half of the turn a `go` command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoKind {
    PlaceArmies,
    AttackTransfer,
}

/// Payload of a `setup_map` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSetup {
    /// `setup_map super_regions <id reward>...`
    SuperRegions(Vec<(SuperRegionId, u32)>),
    /// `setup_map regions <region super_region>...`
    Regions(Vec<(RegionId, SuperRegionId)>),
    /// `setup_map neighbors <region a,b,c>...`, flattened to edges.
    Neighbors(Vec<(RegionId, RegionId)>),
    /// `setup_map wastelands <region>...`
    Wastelands(Vec<RegionId>),
    /// `setup_map opponent_starting_regions <region>...`
    OpponentStartingRegions(Vec<RegionId>),
}

/// A parsed engine-to-bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `settings <key> <value>`
    Settings { key: String, value: String },

    /// Structural map setup or starting-state seeding.
    SetupMap(MapSetup),

    /// `pick_starting_region <timeout_ms> <region>...`
    PickStartingRegion {
        timeout: Duration,
        regions: Vec<RegionId>,
    },

    /// `go place_armies <timeout_ms>` or `go attack/transfer <timeout_ms>`
    Go { kind: GoKind, timeout: Duration },

    /// `update_map <region owner armies [wasteland]>...`
    UpdateMap { updates: Vec<RegionUpdate> },

    /// `opponent_moves <descriptor>...`
    OpponentMoves { moves: Vec<Move> },
}

/// Parses a single line of input into a `Command`.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&first) = tokens.first() else {
        return Ok(None);
    };

    let cmd = match first {
        "settings" => parse_settings(&tokens)?,
        "setup_map" => parse_setup_map(&tokens)?,
        "pick_starting_region" => parse_pick_starting_region(&tokens)?,
        "go" => parse_go(&tokens)?,
        "update_map" => parse_update_map(&tokens)?,
        "opponent_moves" => parse_opponent_moves(&tokens),
        other => return Err(ProtocolError::UnknownCommand(other.to_string()).into()),
    };
    Ok(Some(cmd))
}

fn number<T: std::str::FromStr>(command: &'static str, token: &str) -> Result<T, ProtocolError> {
    token.parse().map_err(|_| ProtocolError::InvalidNumber {
        command,
        token: token.to_string(),
    })
}

fn millis(command: &'static str, token: &str) -> Result<Duration, ProtocolError> {
    number(command, token).map(Duration::from_millis)
}

/// Parses `settings <key> <value...>`. Multi-token values are re-joined
/// with single spaces.
fn parse_settings(tokens: &[&str]) -> Result<Command, ParseError> {
    if tokens.len() < 3 {
        return Err(ProtocolError::malformed(
            "settings",
            "expected 'settings <key> <value>'",
        )
        .into());
    }
    Ok(Command::Settings {
        key: tokens[1].to_string(),
        value: tokens[2..].join(" "),
    })
}

fn parse_setup_map(tokens: &[&str]) -> Result<Command, ParseError> {
    const CMD: &str = "setup_map";
    let Some(&kind) = tokens.get(1) else {
        return Err(ProtocolError::malformed(CMD, "missing setup kind").into());
    };
    let args = &tokens[2..];

    let setup = match kind {
        "super_regions" => MapSetup::SuperRegions(pairs(args)?),
        "regions" => MapSetup::Regions(pairs(args)?),
        "neighbors" => MapSetup::Neighbors(neighbor_edges(args)?),
        "wastelands" => MapSetup::Wastelands(setup_ids(args)?),
        "opponent_starting_regions" => MapSetup::OpponentStartingRegions(setup_ids(args)?),
        other => {
            return Err(ProtocolError::malformed(
                CMD,
                format!("unknown setup kind '{}'", other),
            )
            .into())
        }
    };
    Ok(Command::SetupMap(setup))
}

fn setup_number(token: &str) -> Result<u32, ConfigurationError> {
    token
        .parse()
        .map_err(|_| ConfigurationError::malformed_setup(format!("invalid number '{}'", token)))
}

fn pairs(args: &[&str]) -> Result<Vec<(u32, u32)>, ConfigurationError> {
    if args.len() % 2 != 0 {
        return Err(ConfigurationError::malformed_setup(format!(
            "expected id pairs, got {} tokens",
            args.len()
        )));
    }
    args.chunks_exact(2)
        .map(|pair| -> Result<(u32, u32), ConfigurationError> {
            Ok((setup_number(pair[0])?, setup_number(pair[1])?))
        })
        .collect()
}

fn setup_ids(args: &[&str]) -> Result<Vec<u32>, ConfigurationError> {
    args.iter().map(|t| setup_number(t)).collect()
}

/// Expands `<region> <a,b,c>` groups into `(region, a)`, `(region, b)`, ...
fn neighbor_edges(args: &[&str]) -> Result<Vec<(RegionId, RegionId)>, ConfigurationError> {
    if args.len() % 2 != 0 {
        return Err(ConfigurationError::malformed_setup(
            "expected '<region> <neighbor,neighbor,...>' groups",
        ));
    }
    let mut edges = Vec::new();
    for group in args.chunks_exact(2) {
        let region = setup_number(group[0])?;
        for neighbor in group[1].split(',').filter(|t| !t.is_empty()) {
            edges.push((region, setup_number(neighbor)?));
        }
    }
    Ok(edges)
}

/// Parses `pick_starting_region <timeout_ms> <region>...`.
fn parse_pick_starting_region(tokens: &[&str]) -> Result<Command, ProtocolError> {
    const CMD: &str = "pick_starting_region";
    if tokens.len() < 3 {
        return Err(ProtocolError::malformed(
            CMD,
            "expected a timeout and at least one region",
        ));
    }
    Ok(Command::PickStartingRegion {
        timeout: millis(CMD, tokens[1])?,
        regions: tokens[2..]
            .iter()
            .map(|t| number(CMD, t))
            .collect::<Result<_, _>>()?,
    })
}

/// Parses `go <place_armies|attack/transfer> <timeout_ms>`.
fn parse_go(tokens: &[&str]) -> Result<Command, ProtocolError> {
    if tokens.len() != 3 {
        return Err(ProtocolError::malformed("go", "expected 'go <phase> <timeout>'"));
    }
    let kind = match tokens[1] {
        "place_armies" => GoKind::PlaceArmies,
        "attack/transfer" => GoKind::AttackTransfer,
        other => {
            return Err(ProtocolError::malformed(
                "go",
                format!("unknown phase '{}'", other),
            ))
        }
    };
    Ok(Command::Go {
        kind,
        timeout: millis("go", tokens[2])?,
    })
}

/// Parses `update_map` triples. A literal `wasteland` token directly after
/// an army count flags that region; it cannot be confused with the next
/// region id, which is always numeric.
fn parse_update_map(tokens: &[&str]) -> Result<Command, ValidationError> {
    let mut updates = Vec::new();
    let mut pos = 1;
    while pos < tokens.len() {
        if pos + 3 > tokens.len() {
            return Err(ValidationError::malformed_update(format!(
                "incomplete entry at token {}",
                pos
            )));
        }
        let id: RegionId = update_number(tokens[pos])?;
        let armies: i64 = update_number(tokens[pos + 2])?;
        let mut update = RegionUpdate::new(id, tokens[pos + 1], armies);
        pos += 3;
        if tokens.get(pos) == Some(&"wasteland") {
            update = update.with_wasteland(true);
            pos += 1;
        }
        updates.push(update);
    }
    Ok(Command::UpdateMap { updates })
}

fn update_number<T: std::str::FromStr>(token: &str) -> Result<T, ValidationError> {
    token
        .parse()
        .map_err(|_| ValidationError::malformed_update(format!("invalid number '{}'", token)))
}

/// Parses `opponent_moves`. Opponent history is informational, so a
/// malformed descriptor list is logged and dropped rather than rejected.
fn parse_opponent_moves(tokens: &[&str]) -> Command {
    let moves = match parse_moves(&tokens[1..]) {
        Ok(moves) => moves,
        Err(e) => {
            warn!(error = %e, "ignoring malformed opponent moves");
            Vec::new()
        }
    };
    Command::OpponentMoves { moves }
}
