//! Heatmap overlay: a smoothed click density field colored with the heat
//! gradient.
//!
//! Every click spreads heat around itself, weighted by how busy its grid
//! square is next to the busiest one. The field is computed on a coarse
//! raster (a few document pixels per cell) and stretched onto the surface.

use crate::core::error::RenderError;
use crate::heatmap::colors::heat_color;
use crate::heatmap::{GridCell, ProcessedResults};

use super::surface::{OverlayImage, Surface};

/// Radius of influence of a single click, in document pixels.
pub const HEAT_RADIUS: f64 = 30.0;
const MIN_CELL: f64 = 4.0;
const MAX_CELLS: f64 = 4_000_000.0;

fn cell_size(width: f64, height: f64) -> f64 {
    MIN_CELL.max((width * height / MAX_CELLS).sqrt().ceil())
}

/// Density raster for the clicks of `results` over a `width` × `height`
/// document. `point_size` is the side of the grid squares.
pub fn heatmap_image(
    results: &ProcessedResults,
    point_size: f64,
    width: f64,
    height: f64,
    intensity: f64,
) -> OverlayImage {
    let grid = &results.clicks_per_square;
    let busiest = f64::from(grid.max().max(1));
    let cell = cell_size(width.max(1.0), height.max(1.0));
    let cols = (width / cell).ceil().max(1.0) as usize;
    let rows = (height / cell).ceil().max(1.0) as usize;
    let mut image = OverlayImage::transparent(cols as u32, rows as u32, cell);

    let mut field = vec![0f32; cols * rows];
    let reach = (HEAT_RADIUS / cell).ceil() as i64;
    for click in &results.clicks {
        if !click.x.is_finite() || !click.y.is_finite() {
            continue;
        }
        let weight = f64::from(grid.count(GridCell::containing(click.x, click.y, point_size))) / busiest;
        let cx = (click.x / cell).floor() as i64;
        let cy = (click.y / cell).floor() as i64;
        for row in (cy - reach).max(0)..=(cy + reach).min(rows as i64 - 1) {
            for col in (cx - reach).max(0)..=(cx + reach).min(cols as i64 - 1) {
                let dx = (col as f64 + 0.5) * cell - click.x;
                let dy = (row as f64 + 0.5) * cell - click.y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance >= HEAT_RADIUS {
                    continue;
                }
                let falloff = 1.0 - distance / HEAT_RADIUS;
                field[row as usize * cols + col as usize] += (weight * falloff * falloff) as f32;
            }
        }
    }

    let max = field.iter().copied().fold(0f32, f32::max);
    if max <= 0.0 {
        return image;
    }

    let gain = if intensity.is_finite() && intensity > 0.0 { intensity } else { 1.0 };
    for (index, value) in field.iter().enumerate() {
        if *value <= 0.0 {
            continue;
        }
        let density = (f64::from(*value / max) * gain).min(1.0);
        image.put((index % cols) as u32, (index / cols) as u32, heat_color(density));
    }
    image
}

pub fn draw_heatmap<S: Surface>(
    surface: &mut S,
    results: &ProcessedResults,
    point_size: f64,
    intensity: f64,
) -> Result<(), RenderError> {
    let (width, height) = surface.size();
    surface.clear();
    if results.clicks.is_empty() || width == 0 || height == 0 {
        return Ok(());
    }
    let image = heatmap_image(results, point_size, f64::from(width), f64::from(height), intensity);
    surface.draw_image(&image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::{Click, ClicksPerSquare, ProcessedClick, VisitContext};

    const SQUARE: f64 = 100.0;

    fn results(clicks: Vec<ProcessedClick>) -> ProcessedResults {
        ProcessedResults {
            clicks_per_square: ClicksPerSquare::from_points(clicks.iter().map(|c| (c.x, c.y)), SQUARE),
            clicks,
            ..ProcessedResults::default()
        }
    }

    fn at(x: f64, y: f64) -> ProcessedClick {
        ProcessedClick {
            x,
            y,
            anchored: false,
            click: Click {
                xpath: None,
                css_path: None,
                offset_x: 0.0,
                offset_y: 0.0,
                x,
                y,
                context: VisitContext::default(),
            },
        }
    }

    #[test]
    fn hottest_cell_is_under_the_clicks() {
        let clicks = results(vec![at(100.0, 100.0), at(102.0, 101.0), at(400.0, 300.0)]);
        let image = heatmap_image(&clicks, SQUARE, 800.0, 600.0, 1.0);
        assert_eq!(image.scale, 4.0);

        let hot = image.get(25, 25).unwrap();
        let cool = image.get(100, 75).unwrap();
        let empty = image.get(150, 10).unwrap();
        assert_eq!(hot, heat_color(1.0));
        assert!(cool.a > 0 && cool.a < hot.a);
        assert_eq!(empty.a, 0);
    }

    #[test]
    fn no_clicks_leave_the_image_transparent() {
        let image = heatmap_image(&results(Vec::new()), SQUARE, 320.0, 200.0, 1.0);
        assert!(image.pixels.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn intensity_saturates_lower_densities() {
        let clicks = results(vec![at(100.0, 100.0), at(100.0, 100.0), at(300.0, 100.0)]);
        let calm = heatmap_image(&clicks, SQUARE, 400.0, 200.0, 1.0);
        let hot = heatmap_image(&clicks, SQUARE, 400.0, 200.0, 3.0);
        assert!(hot.get(75, 25).unwrap().a > calm.get(75, 25).unwrap().a);
    }

    #[test]
    fn quiet_squares_glow_less_than_the_busiest() {
        // three clicks share one square, a fourth sits alone far away
        let clicks = results(vec![
            at(150.0, 150.0),
            at(160.0, 150.0),
            at(140.0, 150.0),
            at(650.0, 150.0),
        ]);
        assert_eq!(clicks.clicks_per_square.max(), 3);
        let image = heatmap_image(&clicks, SQUARE, 800.0, 400.0, 1.0);

        let busy = image.get(37, 37).unwrap();
        let quiet = image.get(162, 37).unwrap();
        assert_eq!(busy, heat_color(1.0));
        assert!(quiet.a > 0);
        assert!(quiet.a < heat_color(0.25).a);
    }

    #[test]
    fn tall_documents_use_coarser_cells() {
        assert!(cell_size(1280.0, 100_000.0) > MIN_CELL);
        assert_eq!(cell_size(1280.0, 2_000.0), MIN_CELL);
    }
}
