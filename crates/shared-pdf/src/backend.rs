//! Page-addressable document capability.
//!
//! Signing code is written against [`PageDocument`] and [`DocumentBackend`]
//! rather than lopdf directly; [`LopdfBackend`] is the production
//! implementation.

use crate::content::{image_operations, outline_operations, stroke_alpha_state, OUTLINE_OPACITY};
use crate::error::PdfError;
use crate::parser::PdfDocument;
use crate::xobject::image_streams;
use lopdf::{Object, ObjectId};
use shared_types::{ImageAsset, PlacementRect};

/// Page extent in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// A loaded document whose pages can be measured and drawn on.
///
/// Page indices are 0-based. Rectangles are in the page's own coordinate
/// space with the origin at the lower-left corner of its visible area.
pub trait PageDocument {
    /// Handle to an image embedded once and drawable on any page.
    type Image;

    fn page_count(&self) -> usize;

    fn page_size(&self, index: usize) -> Option<PageSize>;

    fn embed_image(&mut self, asset: &ImageAsset) -> Result<Self::Image, PdfError>;

    fn draw_image(&mut self, index: usize, image: &Self::Image, rect: &PlacementRect) -> Result<(), PdfError>;

    /// Stroke a thin outline around `rect`.
    fn draw_outline(&mut self, index: usize, rect: &PlacementRect) -> Result<(), PdfError>;

    /// Serialize the document in its current state.
    fn save(&mut self, compress: bool) -> Result<Vec<u8>, PdfError>;
}

/// Parses bytes into a [`PageDocument`].
pub trait DocumentBackend: Send + Sync {
    type Document: PageDocument;

    fn load(&self, bytes: &[u8]) -> Result<Self::Document, PdfError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl DocumentBackend for LopdfBackend {
    type Document = PdfDocument;

    fn load(&self, bytes: &[u8]) -> Result<PdfDocument, PdfError> {
        PdfDocument::from_bytes(bytes)
    }
}

/// Image XObject added to a [`PdfDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub id: ObjectId,
}

impl PdfDocument {
    fn origin(&self, index: usize) -> Result<(ObjectId, (f64, f64)), PdfError> {
        let page_id = self.page_id(index).ok_or(PdfError::PageNotFound(index))?;
        let page = self.page_box(index)?;
        Ok((page_id, (page.x, page.y)))
    }
}

impl PageDocument for PdfDocument {
    type Image = EmbeddedImage;

    fn page_count(&self) -> usize {
        PdfDocument::page_count(self)
    }

    fn page_size(&self, index: usize) -> Option<PageSize> {
        match self.page_box(index) {
            Ok(page) => Some(PageSize {
                width: page.width,
                height: page.height,
            }),
            Err(e) => {
                tracing::debug!(index, error = %e, "page has no usable MediaBox");
                None
            }
        }
    }

    fn embed_image(&mut self, asset: &ImageAsset) -> Result<EmbeddedImage, PdfError> {
        let streams = image_streams(asset)?;
        let mut image = streams.image;
        if let Some(mask) = streams.soft_mask {
            let mask_id = self.doc.add_object(mask);
            image.dict.set("SMask", Object::Reference(mask_id));
        }
        let id = self.doc.add_object(image);
        tracing::debug!(object = id.0, kind = %asset.kind(), "embedded image XObject");
        Ok(EmbeddedImage { id })
    }

    fn draw_image(&mut self, index: usize, image: &EmbeddedImage, rect: &PlacementRect) -> Result<(), PdfError> {
        let (page_id, origin) = self.origin(index)?;
        let name = self.add_xobject(page_id, image.id)?;
        self.append_content(page_id, &image_operations(&name, rect, origin))
    }

    fn draw_outline(&mut self, index: usize, rect: &PlacementRect) -> Result<(), PdfError> {
        let (page_id, origin) = self.origin(index)?;
        let state_id = match self.outline_state {
            Some(id) => id,
            None => {
                let id = self.doc.add_object(stroke_alpha_state(OUTLINE_OPACITY));
                self.outline_state = Some(id);
                id
            }
        };
        let state = self.add_ext_gstate(page_id, state_id)?;
        self.append_content(page_id, &outline_operations(rect, origin, &state))
    }

    fn save(&mut self, compress: bool) -> Result<Vec<u8>, PdfError> {
        self.save_to_bytes(compress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{blank_pdf, blank_pdf_with_inherited_box, jpeg_bytes, png_bytes};
    use lopdf::content::Content;
    use shared_types::ImageKind;

    fn drawn_operations(pdf: &PdfDocument, index: usize) -> Content {
        let page = pdf.doc().get_dictionary(pdf.page_id(index).unwrap()).unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        let last = contents.last().unwrap().as_reference().unwrap();
        let stream = pdf.doc().get_object(last).unwrap().as_stream().unwrap();
        Content::decode(&stream.content).unwrap()
    }

    #[test]
    fn test_backend_load_and_measure() {
        let pdf = LopdfBackend.load(&blank_pdf(&[(600.0, 800.0)])).unwrap();
        assert_eq!(PageDocument::page_count(&pdf), 1);
        assert_eq!(
            pdf.page_size(0),
            Some(PageSize {
                width: 600.0,
                height: 800.0
            })
        );
        assert_eq!(pdf.page_size(1), None);
    }

    #[test]
    fn test_backend_load_rejects_garbage() {
        assert!(LopdfBackend.load(b"definitely not a pdf").is_err());
    }

    #[test]
    fn test_embed_png_with_alpha_links_soft_mask() {
        let mut pdf = LopdfBackend.load(&blank_pdf(&[(612.0, 792.0)])).unwrap();
        let asset = ImageAsset::new(ImageKind::Png, 6, 3, png_bytes(6, 3, true)).unwrap();

        let image = pdf.embed_image(&asset).unwrap();
        let stream = pdf.doc().get_object(image.id).unwrap().as_stream().unwrap();
        let mask_id = stream.dict.get(b"SMask").unwrap().as_reference().unwrap();
        assert!(pdf.doc().get_object(mask_id).unwrap().as_stream().is_ok());
    }

    #[test]
    fn test_draw_image_and_reload() {
        let mut pdf = LopdfBackend.load(&blank_pdf(&[(612.0, 792.0), (612.0, 792.0)])).unwrap();
        let asset = ImageAsset::new(ImageKind::Jpeg, 20, 10, jpeg_bytes(20, 10, false)).unwrap();
        let image = pdf.embed_image(&asset).unwrap();

        pdf.draw_image(1, &image, &PlacementRect::new(100.0, 100.0, 200.0, 100.0))
            .unwrap();
        let ops = drawn_operations(&pdf, 1);
        assert_eq!(ops.operations[2].operator, "Do");

        let saved = pdf.save(true).unwrap();
        let reloaded = PdfDocument::from_bytes(&saved).unwrap();
        assert_eq!(reloaded.page_count(), 2);
    }

    #[test]
    fn test_draw_missing_page_fails() {
        let mut pdf = LopdfBackend.load(&blank_pdf(&[(612.0, 792.0)])).unwrap();
        let rect = PlacementRect::new(0.0, 0.0, 1.0, 1.0);
        assert!(matches!(pdf.draw_outline(4, &rect), Err(PdfError::PageNotFound(4))));
    }

    #[test]
    fn test_draw_translates_by_media_box_origin() {
        let mut pdf = LopdfBackend.load(&blank_pdf_with_inherited_box([10.0, 20.0, 310.0, 420.0])).unwrap();
        pdf.draw_outline(0, &PlacementRect::new(0.0, 0.0, 30.0, 40.0)).unwrap();

        let ops = drawn_operations(&pdf, 0);
        let re = ops.operations.iter().find(|op| op.operator == "re").unwrap();
        let values: Vec<f32> = re.operands.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(values, vec![10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_outlines_share_one_translucent_state() {
        let mut pdf = LopdfBackend.load(&blank_pdf(&[(612.0, 792.0), (612.0, 792.0)])).unwrap();
        let rect = PlacementRect::new(10.0, 10.0, 50.0, 20.0);
        pdf.draw_outline(0, &rect).unwrap();
        pdf.draw_outline(1, &rect).unwrap();

        let state_id = pdf.outline_state.unwrap();
        let state = pdf.doc().get_dictionary(state_id).unwrap();
        assert_eq!(state.get(b"CA").unwrap().as_float().unwrap(), OUTLINE_OPACITY);

        for index in 0..2 {
            let ops = drawn_operations(&pdf, index);
            let gs = ops.operations.iter().find(|op| op.operator == "gs").unwrap();
            let name = gs.operands[0].as_name().unwrap();
            let page = pdf.doc().get_dictionary(pdf.page_id(index).unwrap()).unwrap();
            let states = page
                .get(b"Resources")
                .unwrap()
                .as_dict()
                .unwrap()
                .get(b"ExtGState")
                .unwrap()
                .as_dict()
                .unwrap();
            assert_eq!(states.get(name).unwrap().as_reference().unwrap(), state_id);
        }
    }
}
