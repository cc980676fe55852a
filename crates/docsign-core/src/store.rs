//! Document storage.
//!
//! A stored document keeps the ingested bytes forever and at most one signed
//! artifact, which each successful signing replaces as a whole.

use chrono::{DateTime, Utc};
use shared_crypto::DocumentLineage;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub filename: String,
    pub original: Vec<u8>,
    pub signed: Option<Vec<u8>>,
    pub lineage: DocumentLineage,
    pub created_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Build a fresh record for ingested bytes under a new id.
    pub fn ingest(filename: &str, original: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            lineage: DocumentLineage::ingest(&original),
            original,
            signed: None,
            created_at: Utc::now(),
        }
    }

    /// The signed artifact if there is one, else the original.
    pub fn latest(&self) -> &[u8] {
        self.signed.as_deref().unwrap_or(&self.original)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Lineage of {0} does not match the stored original")]
    LineageMismatch(String),

    #[error("Corrupt record for {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Persistence for ingested documents and their signed artifacts.
pub trait DocumentStore: Send + Sync {
    /// Store newly ingested bytes. The original digest is computed here and
    /// never again.
    fn insert(&self, filename: &str, original: Vec<u8>) -> Result<StoredDocument, StoreError>;

    fn fetch(&self, id: &str) -> Result<StoredDocument, StoreError>;

    /// Atomically replace the signed slot. `lineage` must carry the
    /// document's stored original digest.
    fn replace_signed(&self, id: &str, signed: &[u8], lineage: &DocumentLineage) -> Result<(), StoreError>;
}

/// Process-local store, used by tests and embedded callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, filename: &str, original: Vec<u8>) -> Result<StoredDocument, StoreError> {
        let record = StoredDocument::ingest(filename, original);
        let mut documents = self.documents.write().map_err(|_| StoreError::Poisoned)?;
        documents.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &str) -> Result<StoredDocument, StoreError> {
        let documents = self.documents.read().map_err(|_| StoreError::Poisoned)?;
        documents
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn replace_signed(&self, id: &str, signed: &[u8], lineage: &DocumentLineage) -> Result<(), StoreError> {
        let mut documents = self.documents.write().map_err(|_| StoreError::Poisoned)?;
        let record = documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if record.lineage.original() != lineage.original() {
            return Err(StoreError::LineageMismatch(id.to_string()));
        }
        record.signed = Some(signed.to_vec());
        record.lineage = *lineage;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_crypto::digest;

    #[test]
    fn test_insert_computes_original_digest() {
        let store = MemoryStore::new();
        let record = store.insert("lease.pdf", b"%PDF original".to_vec()).unwrap();

        assert_eq!(*record.lineage.original(), digest(b"%PDF original"));
        assert!(record.signed.is_none());
        assert_eq!(record.latest(), b"%PDF original");
        assert_eq!(store.fetch(&record.id).unwrap(), record);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = MemoryStore::new();
        let a = store.insert("a.pdf", vec![1]).unwrap();
        let b = store.insert("a.pdf", vec![1]).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_replace_signed_keeps_original() {
        let store = MemoryStore::new();
        let record = store.insert("a.pdf", b"original".to_vec()).unwrap();

        let lineage = record.lineage.update(b"signed v1");
        store.replace_signed(&record.id, b"signed v1", &lineage).unwrap();
        let lineage = lineage.update(b"signed v2");
        store.replace_signed(&record.id, b"signed v2", &lineage).unwrap();

        let fetched = store.fetch(&record.id).unwrap();
        assert_eq!(fetched.original, b"original".to_vec());
        assert_eq!(fetched.latest(), b"signed v2");
        assert_eq!(fetched.lineage.original(), record.lineage.original());
        assert_eq!(fetched.lineage.signed(), Some(&digest(b"signed v2")));
    }

    #[test]
    fn test_replace_signed_rejects_foreign_lineage() {
        let store = MemoryStore::new();
        let record = store.insert("a.pdf", b"original".to_vec()).unwrap();
        let foreign = DocumentLineage::ingest(b"something else").update(b"signed");

        let result = store.replace_signed(&record.id, b"signed", &foreign);
        assert!(matches!(result, Err(StoreError::LineageMismatch(_))));
        assert!(store.fetch(&record.id).unwrap().signed.is_none());
    }

    #[test]
    fn test_unknown_id() {
        let store = MemoryStore::new();
        assert!(matches!(store.fetch("nope"), Err(StoreError::NotFound(_))));
        let lineage = DocumentLineage::ingest(b"x");
        assert!(matches!(
            store.replace_signed("nope", b"y", &lineage),
            Err(StoreError::NotFound(_))
        ));
    }
}
