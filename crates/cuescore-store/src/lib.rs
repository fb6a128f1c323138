//! Persistence for the Cuescore score ledger.
//!
//! # Modules
//!
//! - [`medium`] -- The [`StorageMedium`] trait plus in-memory and file
//!   implementations.
//! - [`codec`] -- The [`PersistenceCodec`]: tagged, versioned documents with
//!   fail-safe loading.
//! - [`error`] -- [`StoreError`] for write failures.
//!
//! The in-memory ledger is the source of truth; the stored copy is
//! best-effort. Callers persist after each mutation and tolerate a failed
//! write, accepting the loss of at most the latest change on a crash.

pub mod codec;
pub mod error;
pub mod medium;

pub use codec::{
    CorruptionError, LEDGER_KEY, LoadOutcome, PersistenceCodec, RULES_KEY, SCHEMA_VERSION,
};
pub use error::StoreError;
pub use medium::{FileStorage, MemoryStorage, StorageMedium};
