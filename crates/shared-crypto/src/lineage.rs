//! Document lineage: the digest of the bytes as ingested, and the digest of
//! the most recent signed artifact derived from them.

use crate::digest::{digest, ContentDigest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLineage {
    original_digest: ContentDigest,
    signed_digest: Option<ContentDigest>,
}

impl DocumentLineage {
    /// Record the digest of freshly ingested bytes. This is the only place
    /// an original digest is ever computed.
    pub fn ingest(original_bytes: &[u8]) -> Self {
        Self {
            original_digest: digest(original_bytes),
            signed_digest: None,
        }
    }

    /// Rebuild a lineage read back from storage.
    pub fn from_parts(original_digest: ContentDigest, signed_digest: Option<ContentDigest>) -> Self {
        Self {
            original_digest,
            signed_digest,
        }
    }

    pub fn original(&self) -> &ContentDigest {
        &self.original_digest
    }

    pub fn signed(&self) -> Option<&ContentDigest> {
        self.signed_digest.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signed_digest.is_some()
    }

    /// Lineage after a new signed artifact replaced the previous one.
    /// The original digest is carried over untouched.
    #[must_use]
    pub fn update(&self, signed_bytes: &[u8]) -> Self {
        Self {
            original_digest: self.original_digest,
            signed_digest: Some(digest(signed_bytes)),
        }
    }
}
