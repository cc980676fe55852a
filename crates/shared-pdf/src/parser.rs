//! PDF parsing and page geometry using lopdf

use crate::error::PdfError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;

/// Depth limit when walking `/Parent` chains, guards against cyclic trees.
const MAX_TREE_DEPTH: usize = 32;

/// US Letter, used when neither the page nor any ancestor has a MediaBox.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Visible page area in user space units: lower-left origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Wrapper around lopdf::Document with pages addressed by 0-based index
pub struct PdfDocument {
    pub(crate) doc: Document,
    pub(crate) pages: Vec<ObjectId>,
    /// Pages whose original content has already been wrapped in `q`/`Q`
    pub(crate) isolated: HashSet<ObjectId>,
    /// ExtGState shared by every outline drawn on this document
    pub(crate) outline_state: Option<ObjectId>,
}

impl PdfDocument {
    /// Load a PDF from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = Document::load_mem(bytes).map_err(|e| PdfError::ParseError(e.to_string()))?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document
    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self {
            doc,
            pages,
            isolated: HashSet::new(),
            outline_state: None,
        }
    }

    /// Get the number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get page object ID for a given 0-based page index
    pub fn page_id(&self, index: usize) -> Option<ObjectId> {
        self.pages.get(index).copied()
    }

    /// Get the page's MediaBox, inherited from ancestors when the page has none
    pub fn page_box(&self, index: usize) -> Result<PageBox, PdfError> {
        let page_id = self.page_id(index).ok_or(PdfError::PageNotFound(index))?;
        let [x1, y1, x2, y2] = self.get_media_box(page_id)?;
        Ok(PageBox {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        })
    }

    /// Look up an inheritable page attribute, walking the `/Parent` chain
    pub(crate) fn inherited_attribute(
        &self,
        page_id: ObjectId,
        key: &[u8],
    ) -> Result<Option<Object>, PdfError> {
        let mut current = page_id;
        for _ in 0..MAX_TREE_DEPTH {
            let dict = self.doc.get_dictionary(current)?;
            if let Ok(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent_id) => current = parent_id,
                Err(_) => return Ok(None),
            }
        }
        Err(PdfError::StructureError(format!(
            "page tree deeper than {} levels",
            MAX_TREE_DEPTH
        )))
    }

    /// Extract MediaBox as [x1, y1, x2, y2]
    fn get_media_box(&self, page_id: ObjectId) -> Result<[f64; 4], PdfError> {
        match self.inherited_attribute(page_id, b"MediaBox")? {
            Some(media_box) => self.parse_rect(&media_box),
            None => Ok(DEFAULT_MEDIA_BOX),
        }
    }

    /// Parse a PDF rectangle array
    fn parse_rect(&self, obj: &Object) -> Result<[f64; 4], PdfError> {
        let arr = match obj {
            Object::Array(a) => a,
            Object::Reference(id) => self
                .doc
                .get_object(*id)?
                .as_array()
                .map_err(|_| PdfError::StructureError("MediaBox reference is not an array".into()))?,
            _ => return Err(PdfError::StructureError("MediaBox is not an array".into())),
        };

        if arr.len() != 4 {
            return Err(PdfError::StructureError(format!(
                "MediaBox has {} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            values[i] = self.extract_number(obj)?;
        }
        Ok(values)
    }

    /// Extract a number from a PDF object
    fn extract_number(&self, obj: &Object) -> Result<f64, PdfError> {
        match obj {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(f64::from(*r)),
            Object::Reference(id) => self.extract_number(self.doc.get_object(*id)?),
            _ => Err(PdfError::StructureError(
                "Expected number in rectangle".into(),
            )),
        }
    }

    /// Resolve a dictionary that may be stored inline or behind a reference
    pub(crate) fn resolve_dict(&self, obj: &Object) -> Result<Dictionary, PdfError> {
        match obj {
            Object::Dictionary(d) => Ok(d.clone()),
            Object::Reference(id) => Ok(self.doc.get_dictionary(*id)?.clone()),
            _ => Err(PdfError::StructureError(
                "Expected dictionary or reference".into(),
            )),
        }
    }

    /// Get read access to the internal document
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Get mutable access to the internal document
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Save the document to bytes, optionally compressing plain streams first
    pub fn save_to_bytes(&mut self, compress: bool) -> Result<Vec<u8>, PdfError> {
        if compress {
            self.doc.compress();
        }
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SerializationError(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{blank_pdf, blank_pdf_with_inherited_box};

    #[test]
    fn test_from_bytes_html_fails() {
        let html_bytes = b"<!DOCTYPE html><html><head></head><body>Not a PDF</body></html>";
        let result = PdfDocument::from_bytes(html_bytes);
        assert!(matches!(result, Err(PdfError::ParseError(_))));
    }

    #[test]
    fn test_from_bytes_empty_fails() {
        assert!(PdfDocument::from_bytes(&[]).is_err(), "Empty bytes should fail");
    }

    #[test]
    fn test_from_bytes_garbage_fails() {
        let garbage = vec![0u8; 100];
        assert!(PdfDocument::from_bytes(&garbage).is_err());
    }

    #[test]
    fn test_page_count_and_sizes() {
        let bytes = blank_pdf(&[(612.0, 792.0), (600.0, 800.0), (842.0, 595.0)]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        assert_eq!(pdf.page_count(), 3);
        let second = pdf.page_box(1).unwrap();
        assert_eq!((second.width, second.height), (600.0, 800.0));
        let third = pdf.page_box(2).unwrap();
        assert_eq!((third.width, third.height), (842.0, 595.0));
        assert!(matches!(pdf.page_box(3), Err(PdfError::PageNotFound(3))));
    }

    #[test]
    fn test_media_box_inherited_from_parent() {
        let bytes = blank_pdf_with_inherited_box([10.0, 20.0, 310.0, 420.0]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let page = pdf.page_box(0).unwrap();
        assert_eq!(
            page,
            PageBox {
                x: 10.0,
                y: 20.0,
                width: 300.0,
                height: 400.0
            }
        );
    }

    #[test]
    fn test_parse_rect_array() {
        let pdf = PdfDocument::from_document(Document::new());
        let arr = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Real(792.5),
        ]);

        let values = pdf.parse_rect(&arr).unwrap();
        assert_eq!(values, [0.0, 0.0, 612.0, 792.5]);
        assert!(pdf.parse_rect(&Object::Integer(3)).is_err());
        assert!(pdf
            .parse_rect(&Object::Array(vec![Object::Integer(1)]))
            .is_err());
    }

    #[test]
    fn test_extract_number() {
        let pdf = PdfDocument::from_document(Document::new());
        assert_eq!(pdf.extract_number(&Object::Integer(42)).unwrap(), 42.0);
        assert!((pdf.extract_number(&Object::Real(1.234)).unwrap() - 1.234).abs() < 0.001);
        assert!(pdf.extract_number(&Object::Null).is_err());
    }

    #[test]
    fn test_save_roundtrip_preserves_pages() {
        let bytes = blank_pdf(&[(612.0, 792.0), (612.0, 792.0)]);
        let mut pdf = PdfDocument::from_bytes(&bytes).unwrap();
        let saved = pdf.save_to_bytes(true).unwrap();

        let reloaded = PdfDocument::from_bytes(&saved).unwrap();
        assert_eq!(reloaded.page_count(), 2);
    }

    #[test]
    fn test_save_compress_flag() {
        let bytes = blank_pdf(&[(612.0, 792.0)]);
        let filter_of = |compress: bool| {
            let mut pdf = PdfDocument::from_bytes(&bytes).unwrap();
            let body = b"0 0 m 100 100 l S\n".repeat(200);
            let id = pdf.doc_mut().add_object(lopdf::Stream::new(lopdf::Dictionary::new(), body));
            let saved = pdf.save_to_bytes(compress).unwrap();
            let reloaded = Document::load_mem(&saved).unwrap();
            let stream = reloaded.get_object(id).unwrap().as_stream().unwrap().clone();
            stream.dict.get(b"Filter").ok().and_then(|f| f.as_name().ok().map(|n| n.to_vec()))
        };

        assert_eq!(filter_of(true), Some(b"FlateDecode".to_vec()));
        assert_eq!(filter_of(false), None);
    }
}
