use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

pub use api::{Click, Scroll, VisitContext};

pub type ExperimentId = u64;

/// Position of an alternative inside its experiment (0 = control).
pub type AlternativeIndex = usize;

const TABLET_MIN_WIDTH: u32 = 768;
const DESKTOP_MIN_WIDTH: u32 = 1024;

/// Viewport class a click was recorded in. Coordinates only make sense
/// against a layout of the same class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    #[default]
    Desktop,
    Tablet,
    Smartphone,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::Desktop, Resolution::Tablet, Resolution::Smartphone];

    pub fn from_window_width(width: u32) -> Self {
        if width < TABLET_MIN_WIDTH {
            Resolution::Smartphone
        } else if width < DESKTOP_MIN_WIDTH {
            Resolution::Tablet
        } else {
            Resolution::Desktop
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Desktop => "desktop",
            Resolution::Tablet => "tablet",
            Resolution::Smartphone => "smartphone",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|res| res.as_str() == raw)
    }
}

/// One value per resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ByResolution<T> {
    pub desktop: T,
    pub tablet: T,
    pub smartphone: T,
}

impl<T> ByResolution<T> {
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        [&mut self.desktop, &mut self.tablet, &mut self.smartphone].into_iter()
    }
}

impl<T> Index<Resolution> for ByResolution<T> {
    type Output = T;

    fn index(&self, resolution: Resolution) -> &T {
        match resolution {
            Resolution::Desktop => &self.desktop,
            Resolution::Tablet => &self.tablet,
            Resolution::Smartphone => &self.smartphone,
        }
    }
}

impl<T> IndexMut<Resolution> for ByResolution<T> {
    fn index_mut(&mut self, resolution: Resolution) -> &mut T {
        match resolution {
            Resolution::Desktop => &mut self.desktop,
            Resolution::Tablet => &mut self.tablet,
            Resolution::Smartphone => &mut self.smartphone,
        }
    }
}

/// Which overlay is drawn on top of the alternative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayMode {
    #[default]
    Heatmap,
    Scrollmap,
    Confetti,
}

impl OverlayMode {
    pub const ALL: [OverlayMode; 3] = [OverlayMode::Heatmap, OverlayMode::Scrollmap, OverlayMode::Confetti];

    pub fn as_str(self) -> &'static str {
        match self {
            OverlayMode::Heatmap => "heatmap",
            OverlayMode::Scrollmap => "scrollmap",
            OverlayMode::Confetti => "confetti",
        }
    }
}

impl fmt::Display for OverlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw clicks and scrolls of one alternative, as fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatmapResults {
    pub clicks: Vec<Click>,
    pub scrolls: Vec<Scroll>,
}

impl HeatmapResults {
    pub fn len(&self) -> usize {
        self.clicks.len() + self.scrolls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selectors the renderer must measure to anchor the clicks.
    pub fn anchors(&self) -> Vec<String> {
        let mut anchors: Vec<String> = self
            .clicks
            .iter()
            .flat_map(|click| [click.xpath.as_deref(), click.css_path.as_deref()])
            .flatten()
            .filter(|selector| !selector.is_empty())
            .map(str::to_string)
            .collect();
        anchors.sort();
        anchors.dedup();
        anchors
    }
}

/// Position of a tracked element in document coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDimensions {
    pub width: f64,
    pub body_height: f64,
    pub iframe_height: f64,
}

/// Layout snapshot reported by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub bounding_boxes: BTreeMap<String, BoundingBox>,
    pub dimensions: PageDimensions,
}
