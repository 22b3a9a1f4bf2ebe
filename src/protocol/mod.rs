//! Engine protocol handling.
//!
//! Turns raw input lines into typed commands and move lists into response
//! text. Nothing here touches match state.

pub mod moves;
pub mod parser;

pub use moves::{format_move, format_move_list, parse_moves, MoveParseError, NO_MOVES};
pub use parser::{parse_command, Command, GoKind, MapSetup};
