//! HTTP handlers for DocSign API

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use docsign_core::{decode_base64, BoxInput, PageSelector, ServiceError, SignError, SignOptions};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

const DEFAULT_FILENAME: &str = "document.pdf";

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Run storage and PDF work off the async executor
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("worker task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Read the four box fields; anything absent or non-numeric stays `None`
/// and is rejected by validation.
fn box_input(coordinates: Option<&Value>) -> Result<BoxInput, ApiError> {
    let Some(Value::Object(map)) = coordinates else {
        return Err(SignError::InvalidCoordinates(
            "coordinates must be an object with x, y, width and height".into(),
        )
        .into());
    };
    let field = |name: &str| map.get(name).and_then(Value::as_f64);
    Ok(BoxInput {
        x: field("x"),
        y: field("y"),
        width: field("width"),
        height: field("height"),
    })
}

/// Upload a PDF
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    let pdf_data = decode_base64(&req.pdf_base64)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid PDF base64: {}", e)))?;
    if pdf_data.is_empty() {
        return Err(ApiError::InvalidRequest("No file uploaded".into()));
    }

    let filename = req
        .filename
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    let record = blocking(move || state.service.ingest(&filename, pdf_data)).await?;

    tracing::info!("Uploaded document: {}", record.id);

    Ok(Json(UploadResponse {
        hash: record.lineage.original().to_hex(),
        pdf_id: record.id,
        filename: record.filename,
    }))
}

/// Place the signature image and store the new signed artifact
pub async fn sign(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SignQuery>,
    Json(req): Json<SignRequest>,
) -> Result<Json<SignResponse>, ApiError> {
    let target = box_input(req.coordinates.as_ref())?;
    let pages = PageSelector::from(req.pages);
    let options = SignOptions::default().with_debug_outline(query.debug_enabled());
    let id = req.pdf_id;
    let image = req.signature_image;

    let artifact = {
        let id = id.clone();
        blocking(move || state.service.sign(&id, &image, &target, &pages, &options)).await?
    };

    tracing::info!("Signed document {} on pages {:?}", id, artifact.pages_drawn);

    Ok(Json(SignResponse {
        success: true,
        signed_pdf_url: format!("/api/pdf/download/{}", id),
        hashes: HashPair {
            original: artifact.original_digest().to_hex(),
            signed: artifact.signed_digest().to_hex(),
        },
        pages_signed: artifact.pages_drawn,
    }))
}

/// Stream the signed PDF, or the original when it was never signed
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let record = blocking(move || state.service.fetch(&id)).await?;
    let disposition = format!("inline; filename=\"{}\"", header_safe(&record.filename));
    let bytes = record.signed.unwrap_or(record.original);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Document metadata and digests
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let record = blocking(move || state.service.fetch(&id)).await?;

    Ok(Json(DocumentResponse {
        original_hash: record.lineage.original().to_hex(),
        signed_hash: record.lineage.signed().map(|d| d.to_hex()),
        pdf_id: record.id,
        filename: record.filename,
        created_at: record.created_at,
    }))
}

/// Restrict a filename to characters safe inside a quoted header value
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
