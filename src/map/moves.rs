//! Move types emitted by the bot and reported for the opponent.
//!
//! The data model mirrors the engine's move descriptors one field per token;
//! text conversion lives in `protocol::moves`.

use serde::{Deserialize, Serialize};

use super::region::RegionId;

/// Assigns newly granted armies to an owned region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceArmiesMove {
    pub player: String,
    pub region: RegionId,
    pub armies: u32,
}

/// Moves armies from an owned region to a neighbor: an attack when the
/// neighbor belongs to someone else, a transfer when it is friendly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackTransferMove {
    pub player: String,
    pub from: RegionId,
    pub to: RegionId,
    pub armies: u32,
}

/// Either kind of move, as found in the opponent's move history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    PlaceArmies(PlaceArmiesMove),
    AttackTransfer(AttackTransferMove),
}

impl Move {
    /// Name of the player who issued the move.
    pub fn player(&self) -> &str {
        match self {
            Move::PlaceArmies(m) => &m.player,
            Move::AttackTransfer(m) => &m.player,
        }
    }
}

impl From<PlaceArmiesMove> for Move {
    fn from(m: PlaceArmiesMove) -> Self {
        Move::PlaceArmies(m)
    }
}

impl From<AttackTransferMove> for Move {
    fn from(m: AttackTransferMove) -> Self {
        Move::AttackTransfer(m)
    }
}
