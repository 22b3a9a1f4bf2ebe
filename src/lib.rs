//! Warlight bot library.
//!
//! Exposes the map model, match state, move decisions, and protocol
//! modules for use by integration tests and the binary entry point.

pub mod decision;
pub mod engine;
pub mod error;
pub mod map;
pub mod protocol;
pub mod state;
