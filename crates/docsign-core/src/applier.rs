//! Per-page application loop.

use crate::error::SignError;
use crate::geometry;
use crate::options::SignOptions;
use shared_pdf::PageDocument;
use shared_types::{NormalizedBox, PageSelector};
use tracing::debug;

/// Which requested page numbers were drawn on and which did not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// 1-based page numbers, in draw order, duplicates included
    pub drawn: Vec<i64>,
    /// Requested numbers with no matching page
    pub skipped: Vec<i64>,
}

/// Draw `image` on every selected page.
///
/// Page numbers that do not address a page are skipped; that is not an
/// error. Each page is resolved against its own size, so mixed page sizes
/// get correctly proportioned placements. Repeated numbers draw again.
pub fn apply_to_pages<D: PageDocument>(
    doc: &mut D,
    image: &D::Image,
    image_aspect: f64,
    target: &NormalizedBox,
    pages: &PageSelector,
    options: &SignOptions,
) -> Result<ApplyReport, SignError> {
    let page_count = doc.page_count();
    let mut report = ApplyReport::default();

    for number in pages.numbers() {
        let Some(index) = PageSelector::index_of(number, page_count) else {
            debug!(page = number, page_count, "requested page does not exist, skipping");
            report.skipped.push(number);
            continue;
        };
        let Some(size) = doc.page_size(index) else {
            debug!(page = number, "page size unavailable, skipping");
            report.skipped.push(number);
            continue;
        };

        let rect = geometry::resolve(target, size.width, size.height, image_aspect)?;
        doc.draw_image(index, image, &rect)
            .map_err(|e| SignError::DocumentLoadFailed(format!("page {} cannot be modified: {}", number, e)))?;

        if options.debug_outline {
            let area = geometry::target_rect(target, size.width, size.height)?;
            doc.draw_outline(index, &area)
                .map_err(|e| SignError::DocumentLoadFailed(format!("page {} cannot be modified: {}", number, e)))?;
        }

        debug!(page = number, x = rect.x, y = rect.y, width = rect.width, height = rect.height, "drew signature");
        report.drawn.push(number);
    }

    Ok(report)
}
