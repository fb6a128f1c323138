//! The versioned persistence codec for the score ledger.
//!
//! # Document
//!
//! One JSON object stored under [`LEDGER_KEY`]:
//!
//! ```text
//! { schemaVersion, players, activeTurnHolderId, round, history, rules }
//! ```
//!
//! # Fail-safe loading
//!
//! A stored document that is malformed, carries a different
//! `schemaVersion`, or restores into a ledger that breaks an invariant is
//! deleted and replaced by a fresh ledger. There is no field-by-field
//! migration from older shapes: a version bump moves to a new key and the
//! loader refuses anything else, so old and new data never mix.
//!
//! The rule preset chosen on the setup screen lives under its own key,
//! [`RULES_KEY`], and outlives any single match.

use serde::Serialize;
use serde_json::Value;

use cuescore_ledger::{LedgerError, RuleTable, ScoreLedger};
use cuescore_types::{LedgerSnapshot, PenaltyRule};

use crate::error::StoreError;
use crate::medium::StorageMedium;

/// Schema version written by, and the only version accepted by, this codec.
pub const SCHEMA_VERSION: u32 = 3;

/// Storage key of the ledger document for [`SCHEMA_VERSION`].
pub const LEDGER_KEY: &str = "cuescore.ledger.v3";

/// Storage key of the rule preset.
pub const RULES_KEY: &str = "cuescore.rules.v1";

/// Why a stored document was discarded.
#[derive(Debug, thiserror::Error)]
pub enum CorruptionError {
    /// Not JSON, or missing / mistyped fields.
    #[error("malformed document: {source}")]
    Malformed {
        /// The underlying decode error.
        #[from]
        source: serde_json::Error,
    },

    /// Valid JSON, but not an object.
    #[error("document is not a JSON object")]
    NotAnObject,

    /// Tagged with a schema version other than [`SCHEMA_VERSION`].
    #[error("schema version {found:?} is not the current version")]
    VersionMismatch {
        /// The version found, if the tag was present and numeric.
        found: Option<u64>,
    },

    /// Well-formed but violates a ledger invariant.
    #[error("inconsistent ledger: {0}")]
    Inconsistent(#[source] LedgerError),
}

/// What `load` found in storage.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing was stored; a fresh ledger was returned.
    Fresh,
    /// The stored document was restored.
    Restored,
    /// The stored document was deleted; a fresh ledger was returned.
    Discarded(CorruptionError),
    /// The medium could not be read; a fresh ledger was returned and the
    /// stored document, if any, was left in place.
    Unreadable,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LedgerDocument<'a> {
    schema_version: u32,
    #[serde(flatten)]
    ledger: &'a LedgerSnapshot,
}

/// Encodes ledgers to, and decodes them from, a [`StorageMedium`].
#[derive(Debug)]
pub struct PersistenceCodec<M> {
    medium: M,
}

impl<M: StorageMedium> PersistenceCodec<M> {
    /// Wrap a storage medium.
    pub const fn new(medium: M) -> Self {
        Self { medium }
    }

    /// The underlying medium.
    pub const fn medium(&self) -> &M {
        &self.medium
    }

    /// Unwrap the underlying medium.
    pub fn into_inner(self) -> M {
        self.medium
    }

    /// Store the full ledger state under [`LEDGER_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or the write fails.
    pub fn save(&mut self, ledger: &ScoreLedger) -> Result<(), StoreError> {
        let bytes = encode(&ledger.snapshot())?;
        self.medium.save(LEDGER_KEY, &bytes)?;
        tracing::trace!(
            turns = ledger.history().len(),
            bytes = bytes.len(),
            "Ledger saved"
        );
        Ok(())
    }

    /// Load the stored ledger, or a fresh one if nothing usable is stored.
    pub fn load(&mut self) -> ScoreLedger {
        self.load_with_outcome().0
    }

    /// Like [`load`](Self::load), also reporting what was found.
    pub fn load_with_outcome(&mut self) -> (ScoreLedger, LoadOutcome) {
        let bytes = match self.medium.load(LEDGER_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return (ScoreLedger::new(), LoadOutcome::Fresh),
            Err(e) => {
                tracing::warn!(error = %e, "Ledger storage unreadable, starting fresh");
                return (ScoreLedger::new(), LoadOutcome::Unreadable);
            }
        };

        match decode(&bytes) {
            Ok(ledger) => {
                tracing::debug!(
                    players = ledger.players().len(),
                    turns = ledger.history().len(),
                    round = ledger.round(),
                    "Ledger restored"
                );
                (ledger, LoadOutcome::Restored)
            }
            Err(reason) => {
                tracing::warn!(%reason, key = LEDGER_KEY, "Discarding stored ledger");
                if let Err(e) = self.medium.remove(LEDGER_KEY) {
                    tracing::warn!(error = %e, "Failed to delete discarded ledger");
                }
                (ScoreLedger::new(), LoadOutcome::Discarded(reason))
            }
        }
    }

    /// Delete the stored ledger document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the medium cannot be written.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.medium.remove(LEDGER_KEY)
    }

    /// Store the rule preset under [`RULES_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or the write fails.
    pub fn save_rule_preset(&mut self, rules: &RuleTable) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&rules.to_rules())?;
        self.medium.save(RULES_KEY, &bytes)
    }

    /// Load the rule preset, or `None` if nothing usable is stored.
    ///
    /// An unreadable preset is deleted.
    pub fn load_rule_preset(&mut self) -> Option<RuleTable> {
        let bytes = self.medium.load(RULES_KEY).ok().flatten()?;
        let parsed = serde_json::from_slice::<Vec<PenaltyRule>>(&bytes)
            .map_err(CorruptionError::from)
            .and_then(|rules| {
                RuleTable::from_rules(&rules).map_err(CorruptionError::Inconsistent)
            });

        match parsed {
            Ok(table) => Some(table),
            Err(reason) => {
                tracing::warn!(%reason, key = RULES_KEY, "Discarding stored rule preset");
                if let Err(e) = self.medium.remove(RULES_KEY) {
                    tracing::warn!(error = %e, "Failed to delete discarded rule preset");
                }
                None
            }
        }
    }
}

/// Encode a snapshot as a tagged document.
fn encode(snapshot: &LedgerSnapshot) -> Result<Vec<u8>, StoreError> {
    let document = LedgerDocument {
        schema_version: SCHEMA_VERSION,
        ledger: snapshot,
    };
    Ok(serde_json::to_vec(&document)?)
}

/// Decode and validate a tagged document.
fn decode(bytes: &[u8]) -> Result<ScoreLedger, CorruptionError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Object(fields) = &value else {
        return Err(CorruptionError::NotAnObject);
    };

    let found = fields.get("schemaVersion").and_then(Value::as_u64);
    if found != Some(u64::from(SCHEMA_VERSION)) {
        return Err(CorruptionError::VersionMismatch { found });
    }

    let snapshot: LedgerSnapshot = serde_json::from_value(value)?;
    ScoreLedger::restore(snapshot).map_err(CorruptionError::Inconsistent)
}

#[cfg(test)]
mod tests {
    use cuescore_types::{PenaltyEvent, PlayerId, Tier};

    use super::*;
    use crate::medium::MemoryStorage;

    fn played() -> ScoreLedger {
        let mut ledger = ScoreLedger::new();
        let _ = ledger.start_match(&["Ann", "Ben", "Cat"]);
        let _ = ledger.apply_penalty(&[PlayerId(2), PlayerId(3)], &[PenaltyEvent::new(Tier::Nine, 1)]);
        ledger
    }

    #[test]
    fn encoded_document_is_tagged() {
        let bytes = encode(&played().snapshot()).unwrap_or_default();
        let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        assert_eq!(value["schemaVersion"], serde_json::json!(SCHEMA_VERSION));
        assert_eq!(value["activeTurnHolderId"], serde_json::json!(1));
        assert_eq!(value["history"][0]["pointsPerLoser"], serde_json::json!(3));
        assert_eq!(value["history"][0]["events"][0]["tier"], serde_json::json!(9));
    }

    #[test]
    fn save_then_load_restores() {
        let ledger = played();
        let mut codec = PersistenceCodec::new(MemoryStorage::new());
        assert!(codec.save(&ledger).is_ok());

        let (loaded, outcome) = codec.load_with_outcome();
        assert!(matches!(outcome, LoadOutcome::Restored));
        assert_eq!(loaded, ledger);
    }

    #[test]
    fn missing_document_is_fresh() {
        let mut codec = PersistenceCodec::new(MemoryStorage::new());
        let (loaded, outcome) = codec.load_with_outcome();
        assert!(matches!(outcome, LoadOutcome::Fresh));
        assert_eq!(loaded, ScoreLedger::new());
    }

    #[test]
    fn non_json_is_discarded() {
        let mut storage = MemoryStorage::new();
        let _ = storage.save(LEDGER_KEY, b"not json");
        let mut codec = PersistenceCodec::new(storage);

        let (loaded, outcome) = codec.load_with_outcome();
        assert!(matches!(
            outcome,
            LoadOutcome::Discarded(CorruptionError::Malformed { .. })
        ));
        assert_eq!(loaded, ScoreLedger::new());
        assert!(!codec.medium().contains(LEDGER_KEY));
    }

    #[test]
    fn untagged_document_is_a_version_mismatch() {
        let mut storage = MemoryStorage::new();
        let _ = storage.save(LEDGER_KEY, br#"{"players":[]}"#);
        let mut codec = PersistenceCodec::new(storage);
        let (_, outcome) = codec.load_with_outcome();
        assert!(matches!(
            outcome,
            LoadOutcome::Discarded(CorruptionError::VersionMismatch { found: None })
        ));
    }

    #[test]
    fn malformed_document_keeps_the_decode_error() {
        let err = decode(b"{ truncated").err();
        assert!(matches!(err, Some(CorruptionError::Malformed { .. })));
        let source = err.as_ref().and_then(std::error::Error::source);
        assert!(source.is_some_and(|e| e.is::<serde_json::Error>()));
    }

    #[test]
    fn json_array_is_not_an_object() {
        assert!(matches!(decode(b"[1, 2]"), Err(CorruptionError::NotAnObject)));
    }

    #[test]
    fn non_json_preset_is_discarded() {
        let mut storage = MemoryStorage::new();
        let _ = storage.save(RULES_KEY, b"three=1");
        let mut codec = PersistenceCodec::new(storage);
        assert_eq!(codec.load_rule_preset(), None);
        assert!(!codec.medium().contains(RULES_KEY));
    }

    #[test]
    fn rule_preset_round_trips() {
        let mut codec = PersistenceCodec::new(MemoryStorage::new());
        assert_eq!(codec.load_rule_preset(), None);

        let table = RuleTable::from_values(2, 4, 8);
        assert!(codec.save_rule_preset(&table).is_ok());
        assert_eq!(codec.load_rule_preset(), Some(table));
    }

    #[test]
    fn duplicate_tier_preset_is_discarded() {
        let mut storage = MemoryStorage::new();
        let _ = storage.save(
            RULES_KEY,
            br#"[{"tier":3,"pointValue":1},{"tier":3,"pointValue":2}]"#,
        );
        let mut codec = PersistenceCodec::new(storage);
        assert_eq!(codec.load_rule_preset(), None);
        assert!(!codec.medium().contains(RULES_KEY));
    }
}
