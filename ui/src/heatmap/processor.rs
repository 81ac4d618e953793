//! Turns raw clicks and scroll samples into render-ready data for one
//! resolution: clicks re-projected onto the current layout, the click density
//! grid, and the per-row scroll summary.
//!
//! Clicks are recorded relative to a tracked element so they survive small
//! reflows between recording and viewing. When the element is gone from the
//! current layout the recorded absolute position is used instead; the click
//! is never dropped.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::config::PipelineConfig;
use crate::core::format::format_share;

use super::types::{Click, HeatmapResults, PageData, Resolution, Scroll};

/// Square of the density grid, `floor(x / size)` by `floor(y / size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCell {
    pub col: i64,
    pub row: i64,
}

impl GridCell {
    pub fn containing(x: f64, y: f64, size: f64) -> Self {
        Self {
            col: (x / size).floor() as i64,
            row: (y / size).floor() as i64,
        }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClicksPerSquare {
    cells: BTreeMap<GridCell, u32>,
    total: u32,
}

impl ClicksPerSquare {
    pub fn from_points<I>(points: I, size: f64) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut grid = Self::default();
        for (x, y) in points {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            *grid.cells.entry(GridCell::containing(x, y, size)).or_insert(0) += 1;
            grid.total += 1;
        }
        grid
    }

    pub fn get(&self, col: i64, row: i64) -> u32 {
        self.count(GridCell { col, row })
    }

    pub fn count(&self, cell: GridCell) -> u32 {
        self.cells.get(&cell).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Clicks in the busiest square, used to normalise heat intensity.
    pub fn max(&self) -> u32 {
        self.cells.values().copied().max().unwrap_or(0)
    }

    /// The busiest square; ties go to the topmost, then leftmost.
    pub fn busiest(&self) -> Option<GridCell> {
        self.cells
            .iter()
            .max_by(|(a, left), (b, right)| left.cmp(right).then_with(|| (b.row, b.col).cmp(&(a.row, a.col))))
            .map(|(cell, _)| *cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCell, u32)> + '_ {
        self.cells.iter().map(|(cell, count)| (*cell, *count))
    }

    /// Grid as `"col,row" → count`.
    pub fn to_keyed(&self) -> BTreeMap<String, u32> {
        self.iter().map(|(cell, count)| (cell.to_string(), count)).collect()
    }

    /// Share of all clicks that landed in `cell`, e.g. `12%`.
    pub fn popularity_label(&self, cell: GridCell) -> String {
        format_share(self.count(cell) as f64, self.total as f64)
    }
}

/// Visitors reaching each scrollmap row. Row `r` spans
/// `[r * row_height, (r + 1) * row_height)` and a sample reaches it when its
/// depth goes past the row's top edge. Depths are capped at `max_depth`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollSummary {
    rows: Vec<u32>,
    visitors: u32,
}

impl ScrollSummary {
    pub fn from_depths<I>(depths: I, row_height: f64, max_depth: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let max_rows = (max_depth / row_height).ceil();
        let max_rows = if max_rows.is_finite() && max_rows > 0.0 { max_rows as usize } else { 0 };

        // histogram[n]: samples reaching exactly n rows
        let mut histogram: Vec<u32> = Vec::new();
        let mut visitors = 0u32;

        for depth in depths {
            visitors = visitors.saturating_add(1);
            let reached = if depth.is_finite() && depth > 0.0 {
                ((depth.min(max_depth) / row_height).ceil() as usize).min(max_rows)
            } else {
                0
            };
            if histogram.len() <= reached {
                histogram.resize(reached.saturating_add(1), 0);
            }
            histogram[reached] = histogram[reached].saturating_add(1);
        }

        let row_count = histogram.len().saturating_sub(1);
        let mut rows = vec![0u32; row_count];
        let mut deeper = 0u32;
        for row in (0..row_count).rev() {
            deeper += histogram[row + 1];
            rows[row] = deeper;
        }

        Self { rows, visitors }
    }

    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    pub fn visitors(&self) -> u32 {
        self.visitors
    }

    pub fn reached(&self, row: usize) -> u32 {
        self.rows.get(row).copied().unwrap_or(0)
    }

    pub fn ratio(&self, row: usize) -> f64 {
        if self.visitors == 0 {
            0.0
        } else {
            self.reached(row) as f64 / self.visitors as f64
        }
    }

    pub fn label(&self, row: usize) -> String {
        format_share(self.reached(row) as f64, self.visitors as f64)
    }
}

/// A click placed on the current layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedClick {
    pub x: f64,
    pub y: f64,
    /// Whether the position came from the anchor element.
    pub anchored: bool,
    pub click: Click,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedResults {
    pub resolution: Resolution,
    pub clicks: Vec<ProcessedClick>,
    pub clicks_per_square: ClicksPerSquare,
    pub scrolls: Vec<Scroll>,
    pub scroll_summary: ScrollSummary,
}

/// Absolute position of a click on the given layout.
pub fn resolve_position(click: &Click, page: &PageData) -> (f64, f64, bool) {
    let anchor_box = [click.xpath.as_deref(), click.css_path.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|selector| page.bounding_boxes.get(selector));

    match anchor_box {
        Some(bbox) => (bbox.left + click.offset_x, bbox.top + click.offset_y, true),
        None => (click.x, click.y, false),
    }
}

pub fn process(
    raw: &HeatmapResults,
    page: &PageData,
    resolution: Resolution,
    config: &PipelineConfig,
) -> ProcessedResults {
    let clicks: Vec<ProcessedClick> = raw
        .clicks
        .iter()
        .filter(|click| Resolution::from_window_width(click.context.window_width_in_px) == resolution)
        .map(|click| {
            let (x, y, anchored) = resolve_position(click, page);
            ProcessedClick {
                x,
                y,
                anchored,
                click: click.clone(),
            }
        })
        .collect();

    let scrolls: Vec<Scroll> = raw
        .scrolls
        .iter()
        .filter(|scroll| Resolution::from_window_width(scroll.context.window_width_in_px) == resolution)
        .cloned()
        .collect();

    let clicks_per_square =
        ClicksPerSquare::from_points(clicks.iter().map(|c| (c.x, c.y)), config.point_size);
    let scroll_summary =
        ScrollSummary::from_depths(
        scrolls.iter().map(|s| s.max_scroll),
        config.row_height,
        config.max_document_height,
    );

    tracing::debug!(
        resolution = resolution.as_str(),
        clicks = clicks.len(),
        anchored = clicks.iter().filter(|c| c.anchored).count(),
        scrolls = scrolls.len(),
        "processed heatmap results"
    );

    ProcessedResults {
        resolution,
        clicks,
        clicks_per_square,
        scrolls,
        scroll_summary,
    }
}
