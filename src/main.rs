//! Warlight bot binary.
//!
//! Reads engine commands from stdin and writes responses to stdout. Logs go
//! to stderr so they never mix with protocol output.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use warlight_bot::engine::Engine;
use warlight_bot::error::BotError;
use warlight_bot::protocol::parser::parse_command;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// RNG seed; drawn from entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, e.g. "info" or "warlight_bot=debug"; RUST_LOG takes precedence
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Super region ids to avoid when picking a starting region
    #[arg(long, value_delimiter = ',')]
    hazard: Vec<u32>,

    /// Write a JSON snapshot of the map here when the input ends
    #[arg(long)]
    dump_state: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    let mut engine = Engine::new(args.seed).with_hazards(args.hazard.iter().copied());
    info!(seed = ?args.seed, hazards = ?args.hazard, "bot started");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;

        let result = match parse_command(&line) {
            Ok(Some(cmd)) => engine.handle(cmd, &mut out),
            Ok(None) => continue,
            Err(e) => Err(BotError::from(e)),
        };

        match result {
            Ok(()) => {}
            Err(BotError::Io(e)) => return Err(e).context("failed to write response"),
            Err(e @ BotError::Decision(_)) => error!(error = %e, "decision inconsistency"),
            Err(e @ BotError::Protocol(_)) => {
                warn!(error = %e, line = %line, "skipping unparsable line")
            }
            Err(e) => warn!(error = %e, line = %line, "command rejected"),
        }
    }
    out.flush()?;

    if let Some(path) = args.dump_state {
        let json = engine.state().map().to_json()?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "map snapshot written");
    }
    Ok(())
}

fn initialize_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .init();
}
