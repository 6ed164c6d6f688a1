use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use labinv_inventory::StoreState;

use super::r#trait::{
    PersistenceError, PersistenceGateway, Snapshot, decode_document, encode_document,
};

/// In-memory gateway holding the encoded document.
///
/// Intended for tests/dev. Goes through the same encode/decode path as the
/// file gateway, and can be told to fail writes.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    document: RwLock<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway whose stored document is `state`.
    pub fn with_state(state: &StoreState) -> Result<Self, PersistenceError> {
        let gateway = Self::new();
        gateway.try_save(state)?;
        gateway.saves.store(0, Ordering::SeqCst);
        Ok(gateway)
    }

    /// Gateway holding raw (possibly invalid) document bytes.
    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            document: RwLock::new(Some(bytes.into())),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn document(&self) -> Option<Vec<u8>> {
        self.document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn origin(&self) -> String {
        "memory".to_string()
    }

    fn load_snapshot(&self) -> Result<Snapshot, PersistenceError> {
        match self.document() {
            Some(bytes) => decode_document(&bytes, &self.origin()),
            None => Ok(Snapshot::seeded()),
        }
    }

    fn try_save(&self, state: &StoreState) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io {
                origin: self.origin(),
                source: io::Error::other("simulated write failure"),
            });
        }
        let bytes = encode_document(state)?;
        *self
            .document
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
