//! Signing pipeline.
//!
//! A run moves through Loaded → Validated → Overlaid → Serialized → Hashed
//! and stops at the first failure. Nothing is written anywhere by this
//! module; callers persist the returned artifact only on success.

use crate::applier::apply_to_pages;
use crate::error::SignError;
use crate::image;
use crate::options::SignOptions;
use serde::Deserialize;
use shared_crypto::{ContentDigest, DocumentLineage};
use shared_pdf::{DocumentBackend, LopdfBackend, PageDocument};
use shared_types::{NormalizedBox, PageSelector};
use tracing::info;

/// Placement box as received from a caller, before validation.
///
/// Fields are optional so that a missing or non-numeric field can be
/// reported as [`SignError::InvalidCoordinates`] rather than failing earlier
/// in deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct BoxInput {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl BoxInput {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
        }
    }
}

impl From<NormalizedBox> for BoxInput {
    fn from(b: NormalizedBox) -> Self {
        Self::new(b.x, b.y, b.width, b.height)
    }
}

/// Check that every field is present and finite, then clamp. Width and
/// height must remain positive after clamping.
pub fn validate_box(input: &BoxInput) -> Result<NormalizedBox, SignError> {
    fn field(name: &str, value: Option<f64>) -> Result<f64, SignError> {
        match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(SignError::InvalidCoordinates(format!(
                "{} must be a finite number, got {}",
                name, v
            ))),
            None => Err(SignError::InvalidCoordinates(format!(
                "{} is missing or not a number",
                name
            ))),
        }
    }

    let raw = NormalizedBox::new(
        field("x", input.x)?,
        field("y", input.y)?,
        field("width", input.width)?,
        field("height", input.height)?,
    );
    let clamped = raw.clamped();
    if !clamped.has_area() {
        return Err(SignError::InvalidCoordinates(format!(
            "width and height must be greater than zero, got {}x{}",
            raw.width, raw.height
        )));
    }
    Ok(clamped)
}

/// Inputs of one signing run.
#[derive(Debug, Clone)]
pub struct SignRequest<'a> {
    pub document: &'a [u8],
    pub image_payload: &'a str,
    pub target: BoxInput,
    pub pages: PageSelector,
    pub options: SignOptions,
}

impl<'a> SignRequest<'a> {
    pub fn new(document: &'a [u8], image_payload: &'a str, target: BoxInput) -> Self {
        Self {
            document,
            image_payload,
            target,
            pages: PageSelector::default(),
            options: SignOptions::default(),
        }
    }

    pub fn pages(mut self, pages: impl Into<PageSelector>) -> Self {
        self.pages = pages.into();
        self
    }

    pub fn options(mut self, options: SignOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedArtifact {
    pub bytes: Vec<u8>,
    original_digest: ContentDigest,
    signed_digest: ContentDigest,
    /// 1-based page numbers drawn on
    pub pages_drawn: Vec<i64>,
}

impl SignedArtifact {
    pub fn original_digest(&self) -> &ContentDigest {
        &self.original_digest
    }

    pub fn signed_digest(&self) -> &ContentDigest {
        &self.signed_digest
    }

    /// Lineage to store alongside `bytes`.
    pub fn lineage(&self) -> DocumentLineage {
        DocumentLineage::from_parts(self.original_digest, Some(self.signed_digest))
    }
}

/// Runs signing against a particular [`DocumentBackend`].
#[derive(Debug, Clone, Default)]
pub struct Orchestrator<B> {
    backend: B,
}

impl<B: DocumentBackend> Orchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Sign `request.document`.
    ///
    /// `lineage` is the record made when the document was ingested. When it
    /// is absent the original digest is computed from `request.document`.
    pub fn sign(
        &self,
        request: &SignRequest<'_>,
        lineage: Option<&DocumentLineage>,
    ) -> Result<SignedArtifact, SignError> {
        // Loaded
        let mut doc = self
            .backend
            .load(request.document)
            .map_err(|e| SignError::DocumentLoadFailed(e.to_string()))?;

        // Validated
        let target = validate_box(&request.target)?;

        // Overlaid
        let asset = image::decode(request.image_payload)?;
        let embedded = doc
            .embed_image(&asset)
            .map_err(|e| SignError::InvalidImage(e.to_string()))?;
        let report = apply_to_pages(
            &mut doc,
            &embedded,
            asset.aspect_ratio(),
            &target,
            &request.pages,
            &request.options,
        )?;

        // Serialized
        let bytes = doc
            .save(request.options.compress)
            .map_err(|e| SignError::SerializationFailed(e.to_string()))?;

        // Hashed
        let original_digest = match lineage {
            Some(lineage) => *lineage.original(),
            None => shared_crypto::digest(request.document),
        };
        let signed_digest = shared_crypto::digest(&bytes);

        info!(
            original = %original_digest,
            signed = %signed_digest,
            pages_drawn = report.drawn.len(),
            pages_skipped = report.skipped.len(),
            "signed document"
        );

        Ok(SignedArtifact {
            bytes,
            original_digest,
            signed_digest,
            pages_drawn: report.drawn,
        })
    }
}

/// Sign with the lopdf backend and default options.
pub fn sign_document(
    document_bytes: &[u8],
    image_payload: &str,
    target: &BoxInput,
    pages: &PageSelector,
) -> Result<SignedArtifact, SignError> {
    let request = SignRequest::new(document_bytes, image_payload, *target).pages(pages.clone());
    Orchestrator::new(LopdfBackend).sign(&request, None)
}
