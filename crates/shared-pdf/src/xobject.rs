//! Image XObject construction
//!
//! JPEG data is embedded untouched behind a `DCTDecode` filter. PNG data is
//! decoded to raw samples and stored with `FlateDecode`; an alpha channel
//! becomes a separate soft mask image.

use crate::error::PdfError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, ImageFormat};
use lopdf::{dictionary, Object, Stream};
use shared_types::{ImageAsset, ImageKind};
use std::io::Write;

/// Streams making up one embeddable image.
pub struct ImageStreams {
    pub image: Stream,
    pub soft_mask: Option<Stream>,
}

/// Frame header fields read from a JPEG SOF segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegFrame {
    pub width: u32,
    pub height: u32,
    pub precision: u8,
    pub components: u8,
}

/// Build the XObject stream(s) for an asset.
pub fn image_streams(asset: &ImageAsset) -> Result<ImageStreams, PdfError> {
    match asset.kind() {
        ImageKind::Jpeg => jpeg_streams(asset),
        ImageKind::Png => png_streams(asset),
    }
}

fn jpeg_streams(asset: &ImageAsset) -> Result<ImageStreams, PdfError> {
    let frame = jpeg_frame(asset.bytes())
        .ok_or_else(|| PdfError::ImageError("JPEG frame header not found".into()))?;

    let color_space = match frame.components {
        1 => "DeviceGray",
        3 => "DeviceRGB",
        4 => "DeviceCMYK",
        n => {
            return Err(PdfError::ImageError(format!(
                "JPEG with {} color components is not supported",
                n
            )))
        }
    };

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(frame.width),
        "Height" => i64::from(frame.height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => i64::from(frame.precision),
        "Filter" => "DCTDecode",
    };
    // Adobe writes CMYK JPEGs inverted
    if frame.components == 4 {
        let decode: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0]
            .iter()
            .map(|v| Object::Integer(*v))
            .collect();
        dict.set("Decode", decode);
    }

    let mut stream = Stream::new(dict, asset.bytes().to_vec());
    // Already DCT-compressed, must not be deflated again on save
    stream.allows_compression = false;
    Ok(ImageStreams {
        image: stream,
        soft_mask: None,
    })
}

fn png_streams(asset: &ImageAsset) -> Result<ImageStreams, PdfError> {
    let decoded = image::load_from_memory_with_format(asset.bytes(), ImageFormat::Png)
        .map_err(|e| PdfError::ImageError(format!("PNG decode failed: {}", e)))?;
    let (width, height) = (decoded.width(), decoded.height());

    let has_color = decoded.color().has_color();
    let (samples, alpha) = split_alpha(&decoded, has_color);
    let color_space = if has_color { "DeviceRGB" } else { "DeviceGray" };

    let image = flate_image(width, height, color_space, &samples)?;
    let soft_mask = match alpha {
        Some(alpha) => Some(flate_image(width, height, "DeviceGray", &alpha)?),
        None => None,
    };
    tracing::debug!(
        width,
        height,
        color_space,
        soft_mask = soft_mask.is_some(),
        "decoded PNG for embedding"
    );

    Ok(ImageStreams { image, soft_mask })
}

/// Split 8-bit color samples from the alpha channel. Alpha is dropped when
/// every pixel is fully opaque.
fn split_alpha(decoded: &DynamicImage, has_color: bool) -> (Vec<u8>, Option<Vec<u8>>) {
    if !decoded.color().has_alpha() {
        let samples = if has_color {
            decoded.to_rgb8().into_raw()
        } else {
            decoded.to_luma8().into_raw()
        };
        return (samples, None);
    }

    let channels = if has_color { 3 } else { 1 };
    let pixels = if has_color {
        decoded.to_rgba8().into_raw()
    } else {
        decoded.to_luma_alpha8().into_raw()
    };

    let mut samples = Vec::with_capacity(pixels.len() / (channels + 1) * channels);
    let mut alpha = Vec::with_capacity(pixels.len() / (channels + 1));
    for pixel in pixels.chunks_exact(channels + 1) {
        samples.extend_from_slice(&pixel[..channels]);
        alpha.push(pixel[channels]);
    }

    if alpha.iter().all(|a| *a == u8::MAX) {
        (samples, None)
    } else {
        (samples, Some(alpha))
    }
}

fn flate_image(width: u32, height: u32, color_space: &str, samples: &[u8]) -> Result<Stream, PdfError> {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    let mut stream = Stream::new(dict, deflate(samples)?);
    stream.allows_compression = false;
    Ok(stream)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| PdfError::ImageError(format!("deflate failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| PdfError::ImageError(format!("deflate failed: {}", e)))
}

/// Find the first SOF segment and read the frame header.
///
/// Skips DHT (C4), JPG (C8) and DAC (CC), which share the SOF marker range.
pub fn jpeg_frame(data: &[u8]) -> Option<JpegFrame> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            return Some(JpegFrame {
                precision: data[i + 4],
                height: u32::from(u16::from_be_bytes([data[i + 5], data[i + 6]])),
                width: u32::from(u16::from_be_bytes([data[i + 7], data[i + 8]])),
                components: data[i + 9],
            });
        }

        // Fill bytes and standalone markers carry no length
        if marker == 0xFF || marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            i += if marker == 0xFF { 1 } else { 2 };
            continue;
        }

        let length = usize::from(u16::from_be_bytes([data[i + 2], data[i + 3]]));
        if length < 2 {
            return None;
        }
        i += 2 + length;
    }
    None
}
