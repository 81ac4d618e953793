//! Shared crate of the heatmap results viewer: the data pipeline (loader,
//! processor, store), the overlay renderer drawn inside the alternative's
//! iframe, and the Dioxus results page around it.

pub mod core;
pub mod heatmap;
pub mod i18n;
pub mod loader;
pub mod render;
pub mod results;
pub mod store;

pub use results::HeatmapResultsPage;
