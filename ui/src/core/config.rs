//! Runtime settings for the results page and the overlay renderer.
//!
//! The host page embeds the settings as JSON inside
//! `<script id="nab-heatmap-settings" type="application/json">`. Native
//! builds read the file named by `NAB_HEATMAP_SETTINGS`. Every field has a
//! default so partial documents are fine.

use serde::{Deserialize, Serialize};

use super::error::SettingsError;
use crate::heatmap::Resolution;

/// Side of a click-density grid square, in px.
pub const HEATMAP_POINT_SIZE: f64 = 100.0;
/// Height of a scrollmap row, in px.
pub const SCROLLMAP_ROW_HEIGHT: f64 = 50.0;
/// Sanity cap applied to measured document heights.
pub const MAX_DESKTOP_HEIGHT: f64 = 100_000.0;
pub const HEATMAP_MIN_INTENSITY: f64 = 0.1;
pub const HEATMAP_MAX_INTENSITY: f64 = 3.0;
pub const HEATMAP_DEFAULT_INTENSITY: f64 = 1.0;
pub const DEFAULT_OVERLAY_OPACITY: f64 = 0.8;

/// Marker carried by every cross-frame message.
pub const PLUGIN_MARKER: &str = "nelio-ab-testing";

pub const SETTINGS_ELEMENT_ID: &str = "nab-heatmap-settings";
#[cfg(not(target_arch = "wasm32"))]
const SETTINGS_FILE_ENV: &str = "NAB_HEATMAP_SETTINGS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub point_size: f64,
    pub row_height: f64,
    pub max_document_height: f64,
    pub min_intensity: f64,
    pub max_intensity: f64,
    /// Consecutive empty pages tolerated while the server still reports more.
    pub max_stuck_attempts: u32,
    pub retry_delay_ms: u64,
    pub resize_debounce_ms: u32,
    pub handshake_timeout_ms: u64,
    pub desktop_width: u32,
    pub tablet_width: u32,
    pub smartphone_width: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            point_size: HEATMAP_POINT_SIZE,
            row_height: SCROLLMAP_ROW_HEIGHT,
            max_document_height: MAX_DESKTOP_HEIGHT,
            min_intensity: HEATMAP_MIN_INTENSITY,
            max_intensity: HEATMAP_MAX_INTENSITY,
            max_stuck_attempts: 3,
            retry_delay_ms: 1_500,
            resize_debounce_ms: 100,
            handshake_timeout_ms: 15_000,
            desktop_width: 1280,
            tablet_width: 800,
            smartphone_width: 375,
        }
    }
}

impl PipelineConfig {
    pub fn frame_width(&self, resolution: Resolution) -> u32 {
        match resolution {
            Resolution::Desktop => self.desktop_width,
            Resolution::Tablet => self.tablet_width,
            Resolution::Smartphone => self.smartphone_width,
        }
    }

    pub fn clamp_intensity(&self, value: f64) -> f64 {
        if value.is_nan() {
            return HEATMAP_DEFAULT_INTENSITY;
        }
        value.max(self.min_intensity).min(self.max_intensity)
    }

    /// Replaces unusable values with the defaults. Intensity bounds must be
    /// finite, positive and ordered; an inverted pair is dropped as a whole.
    pub(crate) fn sanitize(&mut self) {
        self.point_size = positive_or(self.point_size, HEATMAP_POINT_SIZE);
        self.row_height = positive_or(self.row_height, SCROLLMAP_ROW_HEIGHT);
        self.max_document_height = positive_or(self.max_document_height, MAX_DESKTOP_HEIGHT);

        let min = positive_or(self.min_intensity, HEATMAP_MIN_INTENSITY);
        let max = positive_or(self.max_intensity, HEATMAP_MAX_INTENSITY);
        if min <= max {
            self.min_intensity = min;
            self.max_intensity = max;
        } else {
            tracing::warn!(min, max, "inverted intensity bounds, using defaults");
            self.min_intensity = HEATMAP_MIN_INTENSITY;
            self.max_intensity = HEATMAP_MAX_INTENSITY;
        }
    }
}

/// One alternative of the experiment under review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeInfo {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub experiment: u64,
    pub alternatives: Vec<AlternativeInfo>,
    /// WordPress `start_of_week`: 0 = Sunday.
    pub first_day_of_week: u8,
    /// Public, read-only results view (no cancel / reload controls).
    pub read_only: bool,
    /// WordPress user locale (`es_ES`); overrides the browser languages.
    pub locale: Option<String>,
    pub pipeline: PipelineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            experiment: 0,
            alternatives: Vec::new(),
            first_day_of_week: 1,
            read_only: false,
            locale: None,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(raw)?;
        if settings.first_day_of_week > 6 {
            return Err(SettingsError::Invalid(format!(
                "first day of week out of range: {}",
                settings.first_day_of_week
            )));
        }
        settings.pipeline.sanitize();
        Ok(settings)
    }

    /// Load settings for the current platform, falling back to defaults.
    pub fn load() -> Self {
        match read_raw_settings() {
            Ok(Some(raw)) => Self::from_json(&raw).unwrap_or_else(|err| {
                tracing::warn!("ignoring heatmap settings: {err}");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!("unable to read heatmap settings: {err}");
                Self::default()
            }
        }
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

#[cfg(target_arch = "wasm32")]
fn read_raw_settings() -> Result<Option<String>, SettingsError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| SettingsError::Unavailable("document unavailable".into()))?;
    Ok(document
        .get_element_by_id(SETTINGS_ELEMENT_ID)
        .and_then(|element| element.text_content()))
}

#[cfg(not(target_arch = "wasm32"))]
fn read_raw_settings() -> Result<Option<String>, SettingsError> {
    match std::env::var_os(SETTINGS_FILE_ENV) {
        Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
        None => Ok(None),
    }
}
