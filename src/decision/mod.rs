//! Move decisions.
//!
//! Each entry point reads a `MatchState` and returns moves; none of them
//! mutate the state. Randomized decisions take the generator as an argument
//! so callers can seed it.

pub mod attack;
pub mod ordering;
pub mod placement;
pub mod starting;

use std::time::{Duration, Instant};

use tracing::warn;

pub use attack::attack_transfer_moves;
pub use placement::place_armies_moves;
pub use starting::preferred_starting_region;

/// Logs when a decision ran past the engine's advisory deadline.
fn note_budget(decision: &'static str, started: Instant, budget: Duration) {
    let elapsed = started.elapsed();
    if elapsed > budget {
        warn!(decision, ?elapsed, ?budget, "decision exceeded its time budget");
    }
}
