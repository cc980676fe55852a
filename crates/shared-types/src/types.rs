use serde::{Deserialize, Serialize};
use std::fmt;

/// Placement descriptor expressed as fractions of the page.
///
/// Origin is the top-left corner of the page with y growing downward, which
/// is how browsers report a selection over a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamp every field into `[0, 1]`. NaN clamps to 0.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
            width: clamp_unit(self.width),
            height: clamp_unit(self.height),
        }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Absolute rectangle in native page space (points, bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacementRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// True when `inner` lies inside this rectangle, allowing `tolerance`
    /// points of floating point slack on every edge.
    pub fn contains(&self, inner: &PlacementRect, tolerance: f64) -> bool {
        inner.x >= self.x - tolerance
            && inner.y >= self.y - tolerance
            && inner.right() <= self.right() + tolerance
            && inner.top() <= self.top() + tolerance
    }
}

/// Encoded image formats accepted as signature artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageKind::Png => write!(f, "PNG"),
            ImageKind::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Decoded signature image: the original encoded bytes plus their pixel size.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    kind: ImageKind,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl ImageAsset {
    /// Returns `None` when either dimension is zero.
    pub fn new(kind: ImageKind, width: u32, height: u32, bytes: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            kind,
            width,
            height,
            bytes,
        })
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clamp_pulls_fields_into_unit_range() {
        let clamped = NormalizedBox::new(-1.0, 2.0, 0.5, 0.5).clamped();
        assert_eq!(clamped, NormalizedBox::new(0.0, 1.0, 0.5, 0.5));
    }

    #[test]
    fn test_clamp_maps_nan_to_zero() {
        let clamped = NormalizedBox::new(f64::NAN, 0.2, f64::NAN, 0.3).clamped();
        assert_eq!(clamped, NormalizedBox::new(0.0, 0.2, 0.0, 0.3));
        assert!(!clamped.has_area());
    }

    #[test]
    fn test_image_asset_rejects_zero_dimension() {
        assert!(ImageAsset::new(ImageKind::Png, 0, 10, vec![1]).is_none());
        assert!(ImageAsset::new(ImageKind::Jpeg, 10, 0, vec![1]).is_none());

        let asset = ImageAsset::new(ImageKind::Png, 300, 100, vec![1, 2, 3]).unwrap();
        assert_eq!(asset.aspect_ratio(), 3.0);
        assert_eq!(asset.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_rect_containment_uses_tolerance() {
        let outer = PlacementRect::new(0.0, 0.0, 100.0, 50.0);
        let inner = PlacementRect::new(10.0, 0.0, 90.0000001, 50.0);
        assert!(!outer.contains(&inner, 0.0));
        assert!(outer.contains(&inner, 1e-6));
    }

    #[test]
    fn test_image_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ImageKind::Png).unwrap();
        assert_eq!(json, "\"png\"");
        assert_eq!(ImageKind::Jpeg.mime_type(), "image/jpeg");
    }
}
