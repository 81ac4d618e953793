use crate::core::error::RenderError;
use crate::heatmap::colors::Rgba;

/// Straight-alpha RGBA raster drawn stretched by `scale` onto a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayImage {
    pub width: u32,
    pub height: u32,
    /// Surface pixels per image pixel.
    pub scale: f64,
    pub pixels: Vec<u8>,
}

impl OverlayImage {
    pub fn transparent(width: u32, height: u32, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn put(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[offset..offset + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[offset..offset + 4];
        Some(Rgba::new(px[0], px[1], px[2], px[3]))
    }
}

/// A drawable overlay layer, in document pixels.
pub trait Surface {
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError>;

    fn size(&self) -> (u32, u32);

    fn clear(&mut self);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba);

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba);

    fn draw_image(&mut self, image: &OverlayImage) -> Result<(), RenderError>;

    /// Opacity of the whole layer; does not touch drawn pixels.
    fn set_opacity(&mut self, opacity: f64);
}
