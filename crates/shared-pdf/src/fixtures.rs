//! Small documents and images built in memory for tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;

/// A document with one page per entry of `sizes` (width, height in points).
///
/// Every page carries its own MediaBox, a content stream that fills a grey
/// rectangle, and a Resources entry referencing a shared dictionary.
pub fn blank_pdf(sizes: &[(f64, f64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let resources_id = doc.add_object(dictionary! {
        "ProcSet" => vec![Object::Name(b"PDF".to_vec())],
    });

    let mut kids = Vec::new();
    for (width, height) in sizes {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), grey_rect(*width, *height)));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(*width as f32), Object::Real(*height as f32)],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    finish(doc, pages_id, kids, None)
}

/// A single-page document whose MediaBox lives on the page tree root only.
pub fn blank_pdf_with_inherited_box(media_box: [f64; 4]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });

    finish(doc, pages_id, vec![Object::Reference(page_id)], Some(media_box))
}

fn finish(
    mut doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    inherited_box: Option<[f64; 4]>,
) -> Vec<u8> {
    let count = kids.len() as i64;
    let mut pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
    };
    if let Some(media_box) = inherited_box {
        let rect: Vec<Object> = media_box.iter().map(|v| Object::Real(*v as f32)).collect();
        pages.set("MediaBox", rect);
        pages.set("Resources", Dictionary::new());
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture document serializes");
    bytes
}

fn grey_rect(width: f64, height: f64) -> Vec<u8> {
    let content = Content {
        operations: vec![
            Operation::new("g", vec![Object::Real(0.5)]),
            Operation::new(
                "re",
                vec![
                    0.into(),
                    0.into(),
                    Object::Real((width / 2.0) as f32),
                    Object::Real((height / 2.0) as f32),
                ],
            ),
            Operation::new("f", vec![]),
        ],
    };
    content.encode().expect("fixture content encodes")
}

/// Encoded PNG of the given size; semi-transparent when `alpha` is set.
pub fn png_bytes(width: u32, height: u32, alpha: bool) -> Vec<u8> {
    let image = if alpha {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([20, 40, 200, 128])))
    } else {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([20, 40, 200])))
    };
    encode(&image, ImageFormat::Png)
}

/// Encoded PNG with an all-opaque alpha channel.
pub fn opaque_rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])));
    encode(&image, ImageFormat::Png)
}

/// Encoded baseline JPEG of the given size, greyscale or RGB.
pub fn jpeg_bytes(width: u32, height: u32, grayscale: bool) -> Vec<u8> {
    let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 30, 30])));
    let image = if grayscale {
        DynamicImage::ImageLuma8(rgb.to_luma8())
    } else {
        rgb
    };
    encode(&image, ImageFormat::Jpeg)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .expect("fixture image encodes");
    buffer.into_inner()
}
