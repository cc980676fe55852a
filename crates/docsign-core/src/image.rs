//! Signature image payload decoding.
//!
//! Payloads arrive as data URIs (`data:image/png;base64,<data>`). Only the
//! MIME descriptor before the first comma decides the format: anything that
//! does not name `image/png` is treated as JPEG.

use crate::error::SignError;
use ::image::{ImageFormat, ImageReader};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{DecodeError, Engine};
use shared_types::{ImageAsset, ImageKind};
use std::io::Cursor;

const PNG_MIME: &str = "image/png";

/// Standard alphabet, padding optional
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode base64 that may be line-wrapped or unpadded.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT.decode(compact)
}

/// Decode a data-URI payload into an [`ImageAsset`]. Pure.
pub fn decode(payload: &str) -> Result<ImageAsset, SignError> {
    let (descriptor, data) = split_payload(payload);
    let kind = classify(descriptor);

    let bytes = decode_base64(data)
        .map_err(|e| SignError::InvalidImage(format!("payload is not valid base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(SignError::InvalidImage("payload is empty".into()));
    }

    let (width, height) = probe_dimensions(&bytes, kind)?;
    ImageAsset::new(kind, width, height, bytes).ok_or_else(|| {
        SignError::InvalidImage(format!("image has a zero dimension ({}x{})", width, height))
    })
}

/// Split on the first comma. Without one, the descriptor is empty and the
/// whole string is the data.
pub fn split_payload(payload: &str) -> (&str, &str) {
    payload.split_once(',').unwrap_or(("", payload))
}

pub fn classify(descriptor: &str) -> ImageKind {
    if descriptor.contains(PNG_MIME) {
        ImageKind::Png
    } else {
        ImageKind::Jpeg
    }
}

fn probe_dimensions(bytes: &[u8], kind: ImageKind) -> Result<(u32, u32), SignError> {
    let format = match kind {
        ImageKind::Png => ImageFormat::Png,
        ImageKind::Jpeg => ImageFormat::Jpeg,
    };
    ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| SignError::InvalidImage(format!("cannot read {} header: {}", kind, e)))
}
