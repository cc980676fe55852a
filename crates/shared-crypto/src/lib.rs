//! Shared cryptography utilities
//!
//! Content digests for stored documents and the lineage record that ties a
//! signed artifact back to the bytes it was produced from.

pub mod digest;
pub mod lineage;

pub use digest::{digest, ContentDigest, DigestError};
pub use lineage::DocumentLineage;
