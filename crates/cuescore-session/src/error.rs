//! Error types for match sessions.

use cuescore_ledger::LedgerError;

use crate::config::ConfigError;

/// Errors surfaced by a [`MatchSession`](crate::MatchSession) or its
/// bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The ledger rejected a command.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The tracing subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Telemetry(String),
}
