use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Stable machine-readable category of a [`SignError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidCoordinates,
    DegenerateBox,
    InvalidImage,
    DocumentLoadFailed,
    SerializationFailed,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCoordinates => "INVALID_COORDINATES",
            ErrorKind::DegenerateBox => "DEGENERATE_BOX",
            ErrorKind::InvalidImage => "INVALID_IMAGE",
            ErrorKind::DocumentLoadFailed => "DOCUMENT_LOAD_FAILED",
            ErrorKind::SerializationFailed => "SERIALIZATION_FAILED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Placement box has no area: {0}")]
    DegenerateBox(String),

    #[error("Invalid signature image: {0}")]
    InvalidImage(String),

    #[error("Failed to load document: {0}")]
    DocumentLoadFailed(String),

    #[error("Failed to serialize signed document: {0}")]
    SerializationFailed(String),
}

impl SignError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SignError::InvalidCoordinates(_) => ErrorKind::InvalidCoordinates,
            SignError::DegenerateBox(_) => ErrorKind::DegenerateBox,
            SignError::InvalidImage(_) => ErrorKind::InvalidImage,
            SignError::DocumentLoadFailed(_) => ErrorKind::DocumentLoadFailed,
            SignError::SerializationFailed(_) => ErrorKind::SerializationFailed,
        }
    }
}
