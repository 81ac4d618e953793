//! Confetti overlay: one dot per click, colored by the active facet.

use std::collections::BTreeSet;

use crate::heatmap::confetti::{facet_color, facet_key};
use crate::heatmap::{ConfettiType, ProcessedClick};

use super::surface::Surface;

pub const DOT_RADIUS: f64 = 5.0;

/// Draws every click whose facet key is not in `disabled`. Returns how many
/// dots were drawn.
pub fn draw_confetti<S: Surface>(
    surface: &mut S,
    clicks: &[ProcessedClick],
    filter: ConfettiType,
    disabled: &BTreeSet<String>,
) -> usize {
    surface.clear();
    let mut drawn = 0;
    for click in clicks {
        let key = facet_key(filter, &click.click);
        if disabled.contains(&key) {
            continue;
        }
        surface.fill_circle(click.x, click.y, DOT_RADIUS, facet_color(filter, &key));
        drawn += 1;
    }
    drawn
}
