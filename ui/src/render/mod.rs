//! Overlay renderer: draws the processed results over the alternative's page.
//!
//! Drawing goes through the [`Surface`] trait so the same code paints a
//! browser canvas (in the `renderer` binary) and a `tiny-skia` pixmap.

pub mod confetti;
pub mod document;
pub mod heatmap;
pub mod module;
#[cfg(not(target_arch = "wasm32"))]
pub mod pixmap;
pub mod scrollmap;
pub mod surface;

pub use document::{document_height, measure_page, OverlayHost};
pub use module::{OverlayModule, OverlayRenderer, OverlaySettings};
pub use surface::{OverlayImage, Surface};
