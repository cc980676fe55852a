use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Page {0} not found")]
    PageNotFound(usize),

    #[error("Malformed page structure: {0}")]
    StructureError(String),

    #[error("Unsupported image: {0}")]
    ImageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::StructureError(err.to_string())
    }
}
