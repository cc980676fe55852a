//! Shared PDF handling utilities
//!
//! Page-addressable access to PDF documents on top of lopdf: page geometry,
//! image XObject embedding, and content stream drawing.

pub mod backend;
pub mod content;
pub mod error;
pub mod parser;
pub mod xobject;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use backend::{DocumentBackend, EmbeddedImage, LopdfBackend, PageDocument, PageSize};
pub use error::PdfError;
pub use parser::{PageBox, PdfDocument};
