//! Filesystem document store
//!
//! Layout, one directory per document id:
//!
//! ```text
//! <root>/<id>/original.pdf
//! <root>/<id>/signed-<digest>.pdf   (after the first successful signing)
//! <root>/<id>/meta.json
//! ```
//!
//! Every file is written to a temporary sibling and renamed into place, so a
//! reader sees either the previous or the new version, never a partial one.
//! Signed artifacts are named by their digest and `meta.json` names the
//! current one, so renaming `meta.json` commits the bytes and the lineage
//! together. Artifacts no longer named by `meta.json` are removed afterwards.

use chrono::{DateTime, Utc};
use docsign_core::{DocumentLineage, DocumentStore, StoreError, StoredDocument};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const ORIGINAL_FILE: &str = "original.pdf";
const SIGNED_PREFIX: &str = "signed-";
const SIGNED_SUFFIX: &str = ".pdf";
const META_FILE: &str = "meta.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    id: String,
    filename: String,
    lineage: DocumentLineage,
    /// Current signed artifact, relative to the document directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signed_file: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn signed_file_name(lineage: &DocumentLineage) -> Option<String> {
    lineage
        .signed()
        .map(|digest| format!("{}{}{}", SIGNED_PREFIX, digest.to_hex(), SIGNED_SUFFIX))
}

fn is_signed_file(name: &str) -> bool {
    name.strip_prefix(SIGNED_PREFIX)
        .and_then(|rest| rest.strip_suffix(SIGNED_SUFFIX))
        .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `id`. Only canonical UUIDs map to a path, so ids can
    /// never escape the root.
    fn document_dir(&self, id: &str) -> Result<PathBuf, StoreError> {
        let parsed = Uuid::parse_str(id).map_err(|_| StoreError::NotFound(id.to_string()))?;
        if parsed.hyphenated().to_string() != id {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(self.root.join(id))
    }

    fn read_meta(&self, dir: &Path, id: &str) -> Result<Meta, StoreError> {
        let raw = match fs::read(dir.join(META_FILE)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(id.to_string())),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    fn write_meta(&self, dir: &Path, meta: &Meta) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(meta).map_err(|e| StoreError::Corrupt {
            id: meta.id.clone(),
            reason: e.to_string(),
        })?;
        write_atomic(&dir.join(META_FILE), &json)?;
        Ok(())
    }

    /// Delete signed artifacts other than `keep`. Failures only leave garbage
    /// behind, so they are logged and not returned.
    fn remove_stale_signed(&self, dir: &Path, keep: &str) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "cannot list document directory");
                return;
            }
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name != keep && is_signed_file(name) {
                if let Err(e) = fs::remove_file(entry.path()) {
                    tracing::warn!(file = name, error = %e, "cannot remove stale signed artifact");
                }
            }
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

impl DocumentStore for FsStore {
    fn insert(&self, filename: &str, original: Vec<u8>) -> Result<StoredDocument, StoreError> {
        let record = StoredDocument::ingest(filename, original);
        let dir = self.document_dir(&record.id)?;
        fs::create_dir_all(&dir)?;

        write_atomic(&dir.join(ORIGINAL_FILE), &record.original)?;
        self.write_meta(
            &dir,
            &Meta {
                id: record.id.clone(),
                filename: record.filename.clone(),
                lineage: record.lineage,
                signed_file: None,
                created_at: record.created_at,
                updated_at: record.created_at,
            },
        )?;

        tracing::debug!(id = %record.id, path = %dir.display(), "stored original");
        Ok(record)
    }

    fn fetch(&self, id: &str) -> Result<StoredDocument, StoreError> {
        let dir = self.document_dir(id)?;
        let meta = self.read_meta(&dir, id)?;
        let original = read_optional(&dir.join(ORIGINAL_FILE))?.ok_or_else(|| StoreError::Corrupt {
            id: id.to_string(),
            reason: "original.pdf is missing".into(),
        })?;
        let signed = match &meta.signed_file {
            Some(name) if is_signed_file(name) => {
                Some(read_optional(&dir.join(name))?.ok_or_else(|| StoreError::Corrupt {
                    id: id.to_string(),
                    reason: format!("{} is missing", name),
                })?)
            }
            Some(name) => {
                return Err(StoreError::Corrupt {
                    id: id.to_string(),
                    reason: format!("invalid signed artifact name {:?}", name),
                })
            }
            None => None,
        };

        Ok(StoredDocument {
            id: meta.id,
            filename: meta.filename,
            original,
            signed,
            lineage: meta.lineage,
            created_at: meta.created_at,
        })
    }

    fn replace_signed(&self, id: &str, signed: &[u8], lineage: &DocumentLineage) -> Result<(), StoreError> {
        let dir = self.document_dir(id)?;
        let mut meta = self.read_meta(&dir, id)?;
        if meta.lineage.original() != lineage.original() {
            return Err(StoreError::LineageMismatch(id.to_string()));
        }

        let name = signed_file_name(lineage).ok_or_else(|| StoreError::Corrupt {
            id: id.to_string(),
            reason: "lineage carries no signed digest".into(),
        })?;

        write_atomic(&dir.join(&name), signed)?;
        meta.lineage = *lineage;
        meta.signed_file = Some(name.clone());
        meta.updated_at = Utc::now();
        self.write_meta(&dir, &meta)?;

        self.remove_stale_signed(&dir, &name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsign_core::digest;
    use pretty_assertions::assert_eq;

    fn signed_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| is_signed_file(name))
            .collect();
        names.sort();
        names
    }

    fn store() -> (tempfile::TempDir, FsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path().join("documents")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_insert_writes_layout() {
        let (_dir, store) = store();
        let record = store.insert("lease.pdf", b"%PDF-1.7 original".to_vec()).unwrap();

        let doc_dir = store.root().join(&record.id);
        assert_eq!(fs::read(doc_dir.join(ORIGINAL_FILE)).unwrap(), b"%PDF-1.7 original");
        assert!(doc_dir.join(META_FILE).exists());
        assert_eq!(signed_files(&doc_dir), Vec::<String>::new());

        let fetched = store.fetch(&record.id).unwrap();
        assert_eq!(fetched, record);
    }

    #[test]
    fn test_replace_signed_survives_reopen() {
        let (dir, store) = store();
        let record = store.insert("a.pdf", b"original".to_vec()).unwrap();
        let lineage = record.lineage.update(b"signed");
        store.replace_signed(&record.id, b"signed", &lineage).unwrap();

        let reopened = FsStore::open(dir.path().join("documents")).unwrap();
        let fetched = reopened.fetch(&record.id).unwrap();
        assert_eq!(fetched.original, b"original".to_vec());
        assert_eq!(fetched.signed, Some(b"signed".to_vec()));
        assert_eq!(*fetched.lineage.original(), digest(b"original"));
        assert_eq!(fetched.lineage.signed(), Some(&digest(b"signed")));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (_dir, store) = store();
        let record = store.insert("a.pdf", b"original".to_vec()).unwrap();
        let lineage = record.lineage.update(b"signed");
        store.replace_signed(&record.id, b"signed", &lineage).unwrap();

        let mut names: Vec<String> = fs::read_dir(store.root().join(&record.id))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        let signed_name = signed_file_name(&lineage).unwrap();
        assert_eq!(names, vec![META_FILE.to_string(), ORIGINAL_FILE.to_string(), signed_name]);
    }

    #[test]
    fn test_resigning_keeps_one_matching_artifact() {
        let (_dir, store) = store();
        let record = store.insert("a.pdf", b"original".to_vec()).unwrap();
        let first = record.lineage.update(b"signed v1");
        store.replace_signed(&record.id, b"signed v1", &first).unwrap();
        let second = first.update(b"signed v2");
        store.replace_signed(&record.id, b"signed v2", &second).unwrap();

        let fetched = store.fetch(&record.id).unwrap();
        let bytes = fetched.signed.as_deref().unwrap();
        assert_eq!(bytes, b"signed v2");
        assert_eq!(Some(&digest(bytes)), fetched.lineage.signed());
        assert_eq!(
            signed_files(&store.root().join(&record.id)),
            vec![signed_file_name(&second).unwrap()]
        );
    }

    #[test]
    fn test_uncommitted_artifact_is_ignored() {
        let (_dir, store) = store();
        let record = store.insert("a.pdf", b"original".to_vec()).unwrap();
        let committed = record.lineage.update(b"signed v1");
        store.replace_signed(&record.id, b"signed v1", &committed).unwrap();

        // A run that wrote its artifact but never renamed meta.json
        let doc_dir = store.root().join(&record.id);
        let orphan = signed_file_name(&committed.update(b"signed v2")).unwrap();
        fs::write(doc_dir.join(&orphan), b"signed v2").unwrap();

        let fetched = store.fetch(&record.id).unwrap();
        assert_eq!(fetched.signed.as_deref(), Some(&b"signed v1"[..]));
        assert_eq!(fetched.lineage.signed(), Some(&digest(b"signed v1")));

        let next = committed.update(b"signed v3");
        store.replace_signed(&record.id, b"signed v3", &next).unwrap();
        assert_eq!(signed_files(&doc_dir), vec![signed_file_name(&next).unwrap()]);
    }

    #[test]
    fn test_missing_committed_artifact_is_corrupt() {
        let (_dir, store) = store();
        let record = store.insert("a.pdf", b"original".to_vec()).unwrap();
        let lineage = record.lineage.update(b"signed");
        store.replace_signed(&record.id, b"signed", &lineage).unwrap();

        let doc_dir = store.root().join(&record.id);
        fs::remove_file(doc_dir.join(signed_file_name(&lineage).unwrap())).unwrap();
        assert!(matches!(store.fetch(&record.id), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_signed_file_names() {
        assert!(is_signed_file("signed-0af3.pdf"));
        assert!(!is_signed_file("signed-.pdf"));
        assert!(!is_signed_file("signed-../x.pdf"));
        assert!(!is_signed_file("original.pdf"));
    }

    #[test]
    fn test_rejects_foreign_lineage() {
        let (_dir, store) = store();
        let record = store.insert("a.pdf", b"original".to_vec()).unwrap();
        let foreign = DocumentLineage::ingest(b"other").update(b"signed");
        assert!(matches!(
            store.replace_signed(&record.id, b"signed", &foreign),
            Err(StoreError::LineageMismatch(_))
        ));
    }

    #[test]
    fn test_path_like_ids_are_not_found() {
        let (_dir, store) = store();
        for id in ["../etc", "", "not-a-uuid", "6F9619FF-8B86-D011-B42D-00C04FC964FF"] {
            assert!(matches!(store.fetch(id), Err(StoreError::NotFound(_))), "{}", id);
        }
        let unknown = Uuid::new_v4().to_string();
        assert!(matches!(store.fetch(&unknown), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_meta_is_reported() {
        let (_dir, store) = store();
        let record = store.insert("a.pdf", b"original".to_vec()).unwrap();
        fs::write(store.root().join(&record.id).join(META_FILE), b"{not json").unwrap();
        assert!(matches!(store.fetch(&record.id), Err(StoreError::Corrupt { .. })));
    }
}
