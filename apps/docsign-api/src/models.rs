//! Request and response bodies for DocSign API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upload a PDF as base64
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: Option<String>,
    #[serde(alias = "pdfBase64")]
    pub pdf_base64: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub pdf_id: String,
    pub hash: String,
    pub filename: String,
}

/// Place a signature image on a stored document.
///
/// `coordinates` stays untyped so that missing or non-numeric fields are
/// reported as invalid coordinates instead of a generic body error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub pdf_id: String,
    pub signature_image: String,
    pub coordinates: Option<Value>,
    pub pages: Option<Vec<i64>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignQuery {
    pub debug: Option<String>,
}

impl SignQuery {
    /// `?debug=1` or `?debug=true`
    pub fn debug_enabled(&self) -> bool {
        matches!(self.debug.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Serialize)]
pub struct HashPair {
    pub original: String,
    pub signed: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub success: bool,
    pub signed_pdf_url: String,
    pub hashes: HashPair,
    pub pages_signed: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub pdf_id: String,
    pub filename: String,
    pub original_hash: String,
    pub signed_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}
