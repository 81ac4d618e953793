//! `ui` slice: what the user is looking at.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::config::{
    PipelineConfig, DEFAULT_OVERLAY_OPACITY, HEATMAP_DEFAULT_INTENSITY,
};
use crate::heatmap::{AlternativeIndex, ConfettiType, OverlayMode, Resolution};

use super::actions::Action;

#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub active_alternative: AlternativeIndex,
    pub mode: OverlayMode,
    pub resolution: Resolution,
    pub filter: ConfettiType,
    /// Confetti keys hidden by the user, per facet.
    pub disabled_options: BTreeMap<ConfettiType, BTreeSet<String>>,
    pub intensity: f64,
    pub opacity: f64,
    pub sidebar_visible: bool,
    min_intensity: f64,
    max_intensity: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl UiState {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            active_alternative: 0,
            mode: OverlayMode::Heatmap,
            resolution: Resolution::Desktop,
            filter: ConfettiType::Browser,
            disabled_options: BTreeMap::new(),
            intensity: config.clamp_intensity(HEATMAP_DEFAULT_INTENSITY),
            opacity: DEFAULT_OVERLAY_OPACITY,
            sidebar_visible: true,
            min_intensity: config.min_intensity,
            max_intensity: config.max_intensity,
        }
    }

    /// Hidden keys of the active facet.
    pub fn disabled_for_filter(&self) -> Vec<String> {
        self.disabled_options
            .get(&self.filter)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_option_disabled(&self, key: &str) -> bool {
        self.disabled_options
            .get(&self.filter)
            .is_some_and(|keys| keys.contains(key))
    }
}

pub fn reduce(mut state: UiState, action: &Action) -> UiState {
    match action {
        Action::SetActiveAlternative { alternative } => state.active_alternative = *alternative,
        Action::SetMode { mode } => state.mode = *mode,
        Action::SetResolution { resolution } => state.resolution = *resolution,
        Action::SetFilter { filter } => state.filter = *filter,
        Action::ToggleFilterOption { key } => {
            let keys = state.disabled_options.entry(state.filter).or_default();
            if !keys.remove(key) {
                keys.insert(key.clone());
            }
        }
        Action::SetIntensity { value } => {
            if value.is_finite() {
                state.intensity = value.max(state.min_intensity).min(state.max_intensity);
            }
        }
        Action::SetOpacity { value } => {
            if value.is_finite() {
                state.opacity = value.clamp(0.0, 1.0);
            }
        }
        Action::ToggleSidebar => state.sidebar_visible = !state.sidebar_visible,
        _ => {}
    }
    state
}
