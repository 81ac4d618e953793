//! Scrollmap overlay: one horizontal band per row, colored by the share of
//! visitors that scrolled that far.

use crate::heatmap::colors::{scrollmap_color, Rgba};
use crate::heatmap::ScrollSummary;

use super::surface::Surface;

/// Band colors from the top of the document down to `height`.
pub fn row_colors(summary: &ScrollSummary, row_height: f64, height: f64) -> Vec<Rgba> {
    if !(height > 0.0) || !(row_height > 0.0) {
        return Vec::new();
    }
    let rows = (height / row_height).ceil() as usize;
    (0..rows).map(|row| scrollmap_color(summary.ratio(row))).collect()
}

pub fn draw_scrollmap<S: Surface>(surface: &mut S, summary: &ScrollSummary, row_height: f64) {
    let (width, height) = surface.size();
    surface.clear();
    let colors = row_colors(summary, row_height, f64::from(height));
    for (row, color) in colors.into_iter().enumerate() {
        surface.fill_rect(0.0, row as f64 * row_height, f64::from(width), row_height, color);
    }
}
