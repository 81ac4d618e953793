//! Access to the page hosting the overlays.

use std::collections::BTreeMap;

use crate::core::error::RenderError;
use crate::heatmap::{BoundingBox, OverlayMode, PageData, PageDimensions};

use super::surface::Surface;

/// The document the overlays are drawn over.
pub trait OverlayHost {
    type Surface: Surface;

    /// Creates the overlay node for `mode` and returns its surface.
    fn create_surface(&mut self, mode: OverlayMode) -> Result<Self::Surface, RenderError>;

    /// Removes the overlay node for `mode` from the document, if present.
    fn remove_surface(&mut self, mode: OverlayMode);

    /// Takes every overlay node out of the document flow.
    fn detach_overlays(&mut self);

    fn restore_overlays(&mut self);

    /// Scroll height of the document, overlays included if attached.
    fn scroll_height(&self) -> f64;

    fn viewport_width(&self) -> f64;

    /// Document-relative box of the element matching `selector`
    /// (xpath or CSS), if it is rendered.
    fn bounding_box(&self, selector: &str) -> Option<BoundingBox>;
}

/// Height of the page content alone. Overlays are detached while measuring
/// so a tall overlay cannot keep the document tall; the result is capped at
/// `max_height`.
pub fn document_height<H: OverlayHost>(host: &mut H, max_height: f64) -> f64 {
    host.detach_overlays();
    let height = host.scroll_height();
    host.restore_overlays();

    if height.is_finite() && height > 0.0 {
        height.min(max_height)
    } else {
        0.0
    }
}

/// Measures the layout the processor needs: the boxes of every anchor that
/// is still rendered and the document dimensions.
pub fn measure_page<H: OverlayHost>(host: &mut H, anchors: &[String], max_height: f64) -> PageData {
    let height = document_height(host, max_height);
    let bounding_boxes: BTreeMap<String, BoundingBox> = anchors
        .iter()
        .filter_map(|selector| host.bounding_box(selector).map(|bbox| (selector.clone(), bbox)))
        .collect();

    tracing::debug!(
        anchors = anchors.len(),
        resolved = bounding_boxes.len(),
        height,
        "measured page layout"
    );

    PageData {
        bounding_boxes,
        dimensions: PageDimensions {
            width: host.viewport_width(),
            body_height: height,
            iframe_height: height,
        },
    }
}
