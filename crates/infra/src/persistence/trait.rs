use serde_json::Value;
use thiserror::Error;

use labinv_inventory::StoreState;

use crate::seed::seed_state;

/// Failure to read or write the inventory document.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The document exists but is not a valid inventory snapshot.
    #[error("corrupt inventory document at {origin}: {reason}")]
    CorruptData { origin: String, reason: String },

    /// The medium could not be read or written.
    #[error("i/o failure on {origin}: {source}")]
    Io {
        origin: String,
        source: std::io::Error,
    },

    #[error("failed to encode inventory document: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PersistenceError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, PersistenceError::CorruptData { .. })
    }
}

/// Where a loaded [`StoreState`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Decoded from the stored document as is.
    Stored,
    /// Decoded from an older document; item ids were generated and are not on
    /// disk yet.
    Upgraded,
    /// No document existed; the seed state was built.
    Seeded,
    /// The stored document was unreadable; the seed state was built and the
    /// document left untouched.
    Recovered,
}

impl SnapshotSource {
    /// Whether the snapshot holds generated ids that must be saved before
    /// anyone can address items by id.
    pub fn needs_save(self) -> bool {
        matches!(self, SnapshotSource::Upgraded | SnapshotSource::Seeded)
    }
}

/// A loaded state plus its [`SnapshotSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub state: StoreState,
    pub source: SnapshotSource,
}

impl Snapshot {
    pub fn seeded() -> Self {
        Self {
            state: seed_state(),
            source: SnapshotSource::Seeded,
        }
    }
}

/// Durable home of the whole [`StoreState`], read and written as one document.
///
/// Implementations must make `try_save` all-or-nothing from the caller's point
/// of view: after a failed save the previous document is still readable.
pub trait PersistenceGateway {
    /// Human-readable location of the document, for logs and messages.
    fn origin(&self) -> String;

    /// Read the stored snapshot and report where it came from.
    ///
    /// Returns the seed state when no document exists yet and
    /// [`PersistenceError::CorruptData`] when one exists but cannot be decoded.
    fn load_snapshot(&self) -> Result<Snapshot, PersistenceError>;

    /// [`load_snapshot`](Self::load_snapshot) without the source.
    fn load(&self) -> Result<StoreState, PersistenceError> {
        self.load_snapshot().map(|snapshot| snapshot.state)
    }

    /// Replace the stored snapshot with `state`.
    fn try_save(&self, state: &StoreState) -> Result<(), PersistenceError>;

    /// [`try_save`](Self::try_save) that reports failure as `false` after
    /// logging it. The caller keeps its in-memory state either way.
    fn save(&self, state: &StoreState) -> bool {
        match self.try_save(state) {
            Ok(()) => {
                tracing::info!(
                    origin = %self.origin(),
                    storages = state.storage_count(),
                    items = state.item_count(),
                    "inventory saved"
                );
                true
            }
            Err(err) => {
                tracing::error!(origin = %self.origin(), error = %err, "failed to save inventory");
                false
            }
        }
    }
}

/// Load the stored snapshot, falling back to the seed state when the document
/// is corrupt or unreadable. The fallback is logged, never silent.
pub fn load_or_seed<G: PersistenceGateway + ?Sized>(gateway: &G) -> Snapshot {
    match gateway.load_snapshot() {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(
                origin = %gateway.origin(),
                error = %err,
                "could not load inventory; starting from seed state (the stored document was not modified)"
            );
            Snapshot {
                state: seed_state(),
                source: SnapshotSource::Recovered,
            }
        }
    }
}

/// Decode a document, checking that it is a complete, consistent snapshot.
///
/// Items written without an `id` get one generated here; the snapshot is then
/// [`SnapshotSource::Upgraded`].
pub(crate) fn decode_document(bytes: &[u8], origin: &str) -> Result<Snapshot, PersistenceError> {
    let corrupt = |reason: String| PersistenceError::CorruptData {
        origin: origin.to_string(),
        reason,
    };

    let document: Value = serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
    let generated = items_without_id(&document);
    let state: StoreState =
        serde_json::from_value(document).map_err(|e| corrupt(e.to_string()))?;
    state
        .check_consistency()
        .map_err(|e| corrupt(e.to_string()))?;

    let source = if generated > 0 {
        tracing::info!(origin, generated, "generated ids for items stored without one");
        SnapshotSource::Upgraded
    } else {
        SnapshotSource::Stored
    };
    Ok(Snapshot { state, source })
}

fn items_without_id(document: &Value) -> usize {
    document
        .get("storages")
        .and_then(Value::as_object)
        .map(|storages| {
            storages
                .values()
                .filter_map(|storage| storage.get("items").and_then(Value::as_array))
                .flatten()
                .filter(|item| item.get("id").is_none())
                .count()
        })
        .unwrap_or(0)
}

/// Encode a snapshot as pretty-printed JSON (two-space indent).
pub(crate) fn encode_document(state: &StoreState) -> Result<Vec<u8>, PersistenceError> {
    Ok(serde_json::to_vec_pretty(state)?)
}
