//! Shared type definitions for the Cuescore score ledger.
//!
//! This crate is the single source of truth for the data model used by the
//! ledger engine, the persistence codec, and host sessions. Types flow to
//! `TypeScript` via `ts-rs` for the scoreboard UI.
//!
//! # Modules
//!
//! - [`ids`] -- Player seat ids and turn ids
//! - [`enums`] -- The penalty ball [`Tier`]
//! - [`structs`] -- Players, rules, turns, snapshots, and derived views

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{InvalidTier, Tier};
pub use ids::{PlayerId, TurnId};
pub use structs::{
    Achievements, LedgerSnapshot, MatchSummary, PenaltyEvent, PenaltyRule, Player, Turn,
};
