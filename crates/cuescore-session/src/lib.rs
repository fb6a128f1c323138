//! Host-facing wiring for Cuescore.
//!
//! - [`config`] -- YAML configuration ([`SessionConfig`]).
//! - [`telemetry`] -- `tracing` subscriber bootstrap.
//! - [`session`] -- [`MatchSession`], a ledger persisted after every
//!   successful command.
//!
//! ```
//! use cuescore_ledger::RuleTable;
//! use cuescore_session::MatchSession;
//! use cuescore_store::MemoryStorage;
//! use cuescore_types::{PenaltyEvent, PlayerId, Tier};
//!
//! let mut session = MatchSession::open(MemoryStorage::new(), RuleTable::default());
//! assert!(session.start_match(&["Anh", "Binh", "Chau"]).is_ok());
//! assert!(session
//!     .apply_penalty(&[PlayerId(2)], &[PenaltyEvent::new(Tier::Nine, 1)])
//!     .is_ok());
//!
//! let reopened = MatchSession::open(session.codec().medium().clone(), RuleTable::default());
//! assert_eq!(reopened.ledger(), session.ledger());
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod telemetry;

pub use config::{ConfigError, LoggingConfig, RulesConfig, SessionConfig, StorageConfig};
pub use error::SessionError;
pub use session::MatchSession;
