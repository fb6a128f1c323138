//! `cuescore` -- print the stored match of a Cuescore data directory.
//!
//! Usage: `cuescore [CONFIG.yaml]`
//!
//! Loads the configuration (defaults when no path is given), opens the
//! stored session, and writes its standings and achievements as JSON to
//! stdout.

use std::io::Write;
use std::path::Path;

use cuescore_session::{MatchSession, SessionConfig, telemetry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::from_file(Path::new(&path))?,
        None => SessionConfig::default(),
    };
    telemetry::init(&config.logging)?;
    tracing::info!(dir = %config.storage.dir.display(), "cuescore starting");

    let session = MatchSession::from_config(&config);
    let report = serde_json::json!({
        "round": session.ledger().round(),
        "turns": session.ledger().history().len(),
        "summary": session.summary(),
        "achievements": session.achievements(),
    });

    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}
