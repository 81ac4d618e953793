//! Color ramps shared by the sidebar and the overlay renderer.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// `#rrggbb` (alpha ignored), for swatches in the sidebar.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_css(self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.r,
            self.g,
            self.b,
            self.a as f64 / 255.0
        )
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Scrollmap ramp, coldest (few visitors) to hottest (all visitors).
pub const SCROLLMAP_COLORS: [Rgba; 32] = [
    Rgba::rgb(36, 36, 242), Rgba::rgb(36, 63, 242), Rgba::rgb(36, 89, 242), Rgba::rgb(36, 116, 242),
    Rgba::rgb(36, 143, 242), Rgba::rgb(36, 169, 242), Rgba::rgb(36, 196, 242), Rgba::rgb(36, 222, 242),
    Rgba::rgb(36, 242, 236), Rgba::rgb(36, 242, 209), Rgba::rgb(36, 242, 182), Rgba::rgb(36, 242, 156),
    Rgba::rgb(36, 242, 129), Rgba::rgb(36, 242, 103), Rgba::rgb(36, 242, 76), Rgba::rgb(36, 242, 50),
    Rgba::rgb(50, 242, 36), Rgba::rgb(76, 242, 36), Rgba::rgb(103, 242, 36), Rgba::rgb(129, 242, 36),
    Rgba::rgb(156, 242, 36), Rgba::rgb(182, 242, 36), Rgba::rgb(209, 242, 36), Rgba::rgb(236, 242, 36),
    Rgba::rgb(242, 222, 36), Rgba::rgb(242, 196, 36), Rgba::rgb(242, 169, 36), Rgba::rgb(242, 143, 36),
    Rgba::rgb(242, 116, 36), Rgba::rgb(242, 89, 36), Rgba::rgb(242, 63, 36), Rgba::rgb(242, 36, 36),
];

/// Ramp entry for the share of visitors that reached a row.
pub fn scrollmap_color(ratio: f64) -> Rgba {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let last = SCROLLMAP_COLORS.len() - 1;
    SCROLLMAP_COLORS[(ratio * last as f64).round() as usize]
}

/// Stops of the heatmap gradient: (position, color).
const HEAT_STOPS: [(f64, Rgba); 5] = [
    (0.0, Rgba::new(0, 0, 255, 0)),
    (0.25, Rgba::new(0, 255, 255, 150)),
    (0.5, Rgba::new(0, 255, 0, 190)),
    (0.75, Rgba::new(255, 255, 0, 220)),
    (1.0, Rgba::new(255, 0, 0, 245)),
];

/// Density in `[0, 1]` to a straight-alpha heat color.
pub fn heat_color(density: f64) -> Rgba {
    let t = if density.is_finite() { density.clamp(0.0, 1.0) } else { 0.0 };
    for pair in HEAT_STOPS.windows(2) {
        let (start, from) = pair[0];
        let (end, to) = pair[1];
        if t <= end {
            let local = (t - start) / (end - start);
            return lerp(from, to, local);
        }
    }
    HEAT_STOPS[HEAT_STOPS.len() - 1].1
}

fn lerp(from: Rgba, to: Rgba, t: f64) -> Rgba {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgba::new(
        channel(from.r, to.r),
        channel(from.g, to.g),
        channel(from.b, to.b),
        channel(from.a, to.a),
    )
}

/// Palette for confetti facets.
pub const CONFETTI_PALETTE: [Rgba; 24] = [
    Rgba::rgb(230, 25, 75), Rgba::rgb(60, 180, 75), Rgba::rgb(255, 225, 25), Rgba::rgb(0, 130, 200),
    Rgba::rgb(245, 130, 48), Rgba::rgb(145, 30, 180), Rgba::rgb(70, 240, 240), Rgba::rgb(240, 50, 230),
    Rgba::rgb(210, 245, 60), Rgba::rgb(250, 190, 212), Rgba::rgb(0, 128, 128), Rgba::rgb(220, 190, 255),
    Rgba::rgb(170, 110, 40), Rgba::rgb(255, 250, 200), Rgba::rgb(128, 0, 0), Rgba::rgb(170, 255, 195),
    Rgba::rgb(128, 128, 0), Rgba::rgb(255, 215, 180), Rgba::rgb(0, 0, 128), Rgba::rgb(128, 128, 128),
    Rgba::rgb(31, 119, 180), Rgba::rgb(255, 127, 14), Rgba::rgb(44, 160, 44), Rgba::rgb(214, 39, 40),
];
