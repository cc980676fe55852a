//! Document signing core logic
//!
//! Places a signature image onto the pages of a stored PDF and tracks the
//! content digests of the original and of the latest signed artifact.
//!
//! The pipeline is [`image::decode`] → [`geometry::resolve`] per page inside
//! [`applier::apply_to_pages`], driven by [`orchestrator::Orchestrator`].
//! [`service::SigningService`] adds storage and per-document serialization.

pub mod applier;
pub mod error;
pub mod geometry;
pub mod image;
pub mod options;
pub mod orchestrator;
pub mod service;
pub mod store;

#[cfg(test)]
mod proptests;

pub use applier::{apply_to_pages, ApplyReport};
pub use error::{ErrorKind, SignError};
pub use image::decode_base64;
pub use options::SignOptions;
pub use orchestrator::{sign_document, validate_box, BoxInput, Orchestrator, SignRequest, SignedArtifact};
pub use service::{ServiceError, SigningService};
pub use store::{DocumentStore, MemoryStore, StoreError, StoredDocument};

// Re-export types from shared crates
pub use shared_crypto::{digest, ContentDigest, DocumentLineage};
pub use shared_pdf::{DocumentBackend, LopdfBackend, PageDocument, PageSize};
pub use shared_types::{ImageAsset, ImageKind, NormalizedBox, PageSelector, PlacementRect};
