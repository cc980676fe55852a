//! Storage-backed signing with at most one in-flight run per document.

use crate::error::SignError;
use crate::options::SignOptions;
use crate::orchestrator::{BoxInput, Orchestrator, SignRequest, SignedArtifact};
use crate::store::{DocumentStore, StoreError, StoredDocument};
use shared_pdf::DocumentBackend;
use shared_types::PageSelector;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Sign(#[from] SignError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-document mutual exclusion. Entries are dropped once no caller holds
/// or waits on them.
#[derive(Debug, Default)]
pub struct DocumentLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    /// Run `f` while holding the lock for `id`.
    ///
    /// The mutexes guard no data, so poisoning left by a panicking holder is
    /// ignored.
    pub fn with_lock<T>(&self, id: &str, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(id.to_string()).or_default())
        };

        let result = {
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        drop(slot);
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        result
    }

    /// Number of documents with a live lock entry.
    pub fn active(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub struct SigningService<S, B> {
    store: S,
    orchestrator: Orchestrator<B>,
    locks: DocumentLocks,
}

impl<S: DocumentStore, B: DocumentBackend> SigningService<S, B> {
    pub fn new(store: S, backend: B) -> Self {
        Self {
            store,
            orchestrator: Orchestrator::new(backend),
            locks: DocumentLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store an uploaded document after checking the backend can parse it.
    pub fn ingest(&self, filename: &str, bytes: Vec<u8>) -> Result<StoredDocument, ServiceError> {
        if let Err(e) = self.orchestrator.backend().load(&bytes) {
            warn!(filename, error = %e, "rejected upload");
            return Err(SignError::DocumentLoadFailed(e.to_string()).into());
        }
        let record = self.store.insert(filename, bytes)?;
        info!(id = %record.id, filename, original = %record.lineage.original(), "ingested document");
        Ok(record)
    }

    pub fn fetch(&self, id: &str) -> Result<StoredDocument, ServiceError> {
        Ok(self.store.fetch(id)?)
    }

    /// Sign the stored original of `id` and replace its signed artifact.
    ///
    /// Always starts from the original bytes, so signing twice yields one
    /// signature, not two stacked ones. Runs for the same id are serialized;
    /// the store is only written after the whole pipeline succeeded.
    pub fn sign(
        &self,
        id: &str,
        image_payload: &str,
        target: &BoxInput,
        pages: &PageSelector,
        options: &SignOptions,
    ) -> Result<SignedArtifact, ServiceError> {
        self.locks.with_lock(id, || -> Result<SignedArtifact, ServiceError> {
            let stored = self.store.fetch(id)?;
            let request = SignRequest::new(&stored.original, image_payload, *target)
                .pages(pages.clone())
                .options(*options);
            let artifact = self.orchestrator.sign(&request, Some(&stored.lineage))?;
            self.store.replace_signed(id, &artifact.bytes, &artifact.lineage())?;
            info!(id, signed = %artifact.signed_digest(), "stored signed artifact");
            Ok(artifact)
        })
    }

    pub fn active_locks(&self) -> usize {
        self.locks.active()
    }
}
