//! Conversion from a normalized, top-left placement box to an absolute,
//! aspect-preserving rectangle in native page space.

use crate::error::SignError;
use shared_types::{NormalizedBox, PlacementRect};

/// Resolve where an image of aspect `image_aspect` (width / height) is drawn
/// for `target` on a page of the given size.
///
/// The box is clamped to the unit square first, so out-of-range input is
/// never rejected here. The result fits inside the target rectangle, keeps
/// the image's aspect ratio, and is centred along the slack axis.
pub fn resolve(
    target: &NormalizedBox,
    page_width: f64,
    page_height: f64,
    image_aspect: f64,
) -> Result<PlacementRect, SignError> {
    if !(image_aspect.is_finite() && image_aspect > 0.0) {
        return Err(SignError::InvalidImage(format!(
            "image aspect ratio {} is not a positive number",
            image_aspect
        )));
    }
    let area = target_rect(target, page_width, page_height)?;
    Ok(fit(&area, image_aspect))
}

/// The requested target box in page space (bottom-left origin), before
/// aspect fitting.
pub fn target_rect(
    target: &NormalizedBox,
    page_width: f64,
    page_height: f64,
) -> Result<PlacementRect, SignError> {
    if !(page_width.is_finite() && page_width > 0.0 && page_height.is_finite() && page_height > 0.0) {
        return Err(SignError::DegenerateBox(format!(
            "page size {}x{} has no area",
            page_width, page_height
        )));
    }

    let b = target.clamped();
    let abs_width = b.width * page_width;
    let abs_height = b.height * page_height;
    if abs_width <= 0.0 || abs_height <= 0.0 {
        return Err(SignError::DegenerateBox(format!(
            "target resolves to {}x{} points",
            abs_width, abs_height
        )));
    }

    let abs_x = b.x * page_width;
    let abs_y_top = b.y * page_height;
    // Flip: y is measured down from the top, page space measures up from the bottom
    let abs_y = page_height - abs_y_top - abs_height;

    Ok(PlacementRect::new(abs_x, abs_y, abs_width, abs_height))
}

/// Largest rectangle of aspect `image_aspect` inside `area`, centred.
pub fn fit(area: &PlacementRect, image_aspect: f64) -> PlacementRect {
    let box_aspect = area.width / area.height;
    if image_aspect > box_aspect {
        let draw_height = area.width / image_aspect;
        let offset_y = (area.height - draw_height) / 2.0;
        PlacementRect::new(area.x, area.y + offset_y, area.width, draw_height)
    } else {
        let draw_width = area.height * image_aspect;
        let offset_x = (area.width - draw_width) / 2.0;
        PlacementRect::new(area.x + offset_x, area.y, draw_width, area.height)
    }
}
