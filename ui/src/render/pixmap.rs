//! Off-screen overlay surface backed by a `tiny-skia` pixmap. Used on
//! native targets and by the rendering tests.

use tiny_skia::{
    FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Rect, Transform,
};

use crate::core::error::RenderError;
use crate::heatmap::colors::Rgba;

use super::surface::{OverlayImage, Surface};

pub struct PixmapSurface {
    pixmap: Pixmap,
    opacity: f64,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        Ok(Self {
            pixmap: Pixmap::new(width.max(1), height.max(1)).ok_or(RenderError::SurfaceUnavailable)?,
            opacity: 1.0,
        })
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Straight-alpha color of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba::new(color.red(), color.green(), color.blue(), color.alpha()))
    }
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn premultiplied(image: &OverlayImage) -> Vec<u8> {
    let mut data = Vec::with_capacity(image.pixels.len());
    for px in image.pixels.chunks_exact(4) {
        let alpha = u16::from(px[3]);
        let scale = |channel: u8| ((u16::from(channel) * alpha + 127) / 255) as u8;
        let color = PremultipliedColorU8::from_rgba(scale(px[0]), scale(px[1]), scale(px[2]), px[3])
            .unwrap_or(PremultipliedColorU8::TRANSPARENT);
        data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    data
}

impl Surface for PixmapSurface {
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if self.size() == (width, height) {
            return Ok(());
        }
        self.pixmap = Pixmap::new(width.max(1), height.max(1)).ok_or(RenderError::SurfaceUnavailable)?;
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        if let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) {
            self.pixmap
                .fill_rect(rect, &paint_for(color), Transform::identity(), None);
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        if let Some(path) = PathBuilder::from_circle(cx as f32, cy as f32, radius as f32) {
            self.pixmap.fill_path(
                &path,
                &paint_for(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_image(&mut self, image: &OverlayImage) -> Result<(), RenderError> {
        let size = IntSize::from_wh(image.width, image.height).ok_or(RenderError::SurfaceUnavailable)?;
        let raster = Pixmap::from_vec(premultiplied(image), size).ok_or(RenderError::SurfaceUnavailable)?;
        let scale = image.scale as f32;
        self.pixmap.draw_pixmap(
            0,
            0,
            raster.as_ref(),
            &PixmapPaint::default(),
            Transform::from_scale(scale, scale),
            None,
        );
        Ok(())
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
    }
}
