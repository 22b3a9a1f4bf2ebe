//! Error taxonomy for the bot.
//!
//! Each failure class maps to one enum so callers can decide how loudly to
//! report it. None of them terminate the match: the protocol loop logs the
//! error and keeps the state that was valid before the offending command.

use crate::map::region::RegionId;
use crate::map::super_region::SuperRegionId;

/// Malformed or inconsistent map setup data, or an unusable setting value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown super region {0}")]
    UnknownSuperRegion(SuperRegionId),

    #[error("unknown region {0}")]
    UnknownRegion(RegionId),

    #[error("region {region} already belongs to super region {existing}, not {requested}")]
    ConflictingMembership {
        region: RegionId,
        existing: SuperRegionId,
        requested: SuperRegionId,
    },

    #[error("region {0} cannot neighbor itself")]
    SelfNeighbor(RegionId),

    #[error("map topology is fixed once the match has started")]
    TopologyLocked,

    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },

    #[error("malformed map setup: {reason}")]
    MalformedSetup { reason: String },
}

/// Semantically invalid state-refresh data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("region {region} reported with negative army count {armies}")]
    NegativeArmies { region: RegionId, armies: i64 },

    #[error("region {region} reported with army count {armies} out of range")]
    ArmiesOutOfRange { region: RegionId, armies: i64 },

    #[error("update for unknown region {0}")]
    UnknownRegion(RegionId),

    #[error("malformed map update: {reason}")]
    MalformedUpdate { reason: String },
}

/// A line that cannot be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("malformed {command}: {reason}")]
    Malformed {
        command: &'static str,
        reason: String,
    },

    #[error("invalid number '{token}' in {command}")]
    InvalidNumber {
        command: &'static str,
        token: String,
    },
}

/// Why an input line did not become a command.
///
/// Lines that are not commands at all are protocol errors. Bad arguments to
/// `setup_map` and `update_map` keep the class their content belongs to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A decision algorithm invoked against an impossible state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionInconsistency {
    #[error("cannot place {armies} armies: player '{player}' owns no regions")]
    NoOwnedRegions { player: String, armies: u32 },

    #[error("no pickable starting regions were offered")]
    NoStartingCandidates,

    #[error("starting candidate {0} is not on the map")]
    UnknownCandidate(RegionId),
}

/// Any error the engine can report while handling a command.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Decision(#[from] DecisionInconsistency),

    #[error("output failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParseError> for BotError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Protocol(e) => BotError::Protocol(e),
            ParseError::Configuration(e) => BotError::Configuration(e),
            ParseError::Validation(e) => BotError::Validation(e),
        }
    }
}

impl ConfigurationError {
    pub(crate) fn malformed_setup(reason: impl Into<String>) -> Self {
        ConfigurationError::MalformedSetup {
            reason: reason.into(),
        }
    }
}

impl ValidationError {
    pub(crate) fn malformed_update(reason: impl Into<String>) -> Self {
        ValidationError::MalformedUpdate {
            reason: reason.into(),
        }
    }
}

impl ProtocolError {
    pub(crate) fn malformed(command: &'static str, reason: impl Into<String>) -> Self {
        ProtocolError::Malformed {
            command,
            reason: reason.into(),
        }
    }
}
