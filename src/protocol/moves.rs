//! Move descriptor text.
//!
//! Placement: `<player> place_armies <region> <armies>`
//! Attack/transfer: `<player> attack/transfer <from> <to> <armies>`
//!
//! Outgoing lists are joined with commas; an empty list is sent as
//! `No moves`. Incoming opponent moves arrive as one flat token stream.

use thiserror::Error;

use crate::map::{AttackTransferMove, Move, PlaceArmiesMove};

/// Reply sent when a move list is empty.
pub const NO_MOVES: &str = "No moves";

/// Errors that can occur when parsing move descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("unknown move action '{0}'")]
    UnknownAction(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

pub fn format_place_armies(m: &PlaceArmiesMove) -> String {
    format!("{} place_armies {} {}", m.player, m.region, m.armies)
}

pub fn format_attack_transfer(m: &AttackTransferMove) -> String {
    format!("{} attack/transfer {} {} {}", m.player, m.from, m.to, m.armies)
}

pub fn format_move(m: &Move) -> String {
    match m {
        Move::PlaceArmies(p) => format_place_armies(p),
        Move::AttackTransfer(a) => format_attack_transfer(a),
    }
}

/// Joins formatted moves with commas, or returns [`NO_MOVES`].
pub fn format_move_list<T>(moves: &[T], format: impl Fn(&T) -> String) -> String {
    if moves.is_empty() {
        return NO_MOVES.to_string();
    }
    moves.iter().map(format).collect::<Vec<_>>().join(",")
}

/// Parses a flat stream of move descriptors, e.g. the tokens following
/// `opponent_moves`.
pub fn parse_moves(tokens: &[&str]) -> Result<Vec<Move>, MoveParseError> {
    let mut moves = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        let player = tokens[pos].to_string();
        let action = tokens
            .get(pos + 1)
            .ok_or(MoveParseError::UnexpectedEnd("move action"))?;
        match *action {
            "place_armies" => {
                let region = number(tokens, pos + 2, "region id")?;
                let armies = number(tokens, pos + 3, "army count")?;
                moves.push(Move::PlaceArmies(PlaceArmiesMove {
                    player,
                    region,
                    armies,
                }));
                pos += 4;
            }
            "attack/transfer" => {
                let from = number(tokens, pos + 2, "source region id")?;
                let to = number(tokens, pos + 3, "target region id")?;
                let armies = number(tokens, pos + 4, "army count")?;
                moves.push(Move::AttackTransfer(AttackTransferMove {
                    player,
                    from,
                    to,
                    armies,
                }));
                pos += 5;
            }
            other => return Err(MoveParseError::UnknownAction(other.to_string())),
        }
    }
    Ok(moves)
}

fn number(tokens: &[&str], idx: usize, expected: &'static str) -> Result<u32, MoveParseError> {
    let token = tokens
        .get(idx)
        .ok_or(MoveParseError::UnexpectedEnd(expected))?;
    token
        .parse()
        .map_err(|_| MoveParseError::InvalidNumber(token.to_string()))
}
