//! The overlay renderer running inside the alternative's iframe.
//!
//! It keeps its own mirror of the results (loaded with the same loader and
//! processed with the same processor as the parent) and reacts to the
//! parent's [`FrameMessage`]s. One [`OverlayModule`] exists per overlay
//! mode; a message for another mode tears the others down.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::core::config::DEFAULT_OVERLAY_OPACITY;
use crate::core::config::HEATMAP_DEFAULT_INTENSITY;
use crate::core::error::RenderError;
use crate::heatmap::{
    AlternativeIndex, ConfettiType, FrameCommand, FrameMessage, OverlayMode, PageData, Resolution,
};
use crate::store::{request_result_processing, selectors, Action, Dispatch, Store};

use super::confetti::draw_confetti;
use super::document::{measure_page, OverlayHost};
use super::heatmap::draw_heatmap;
use super::scrollmap::draw_scrollmap;
use super::surface::Surface;

/// Drawing parameters pushed by the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySettings {
    pub intensity: f64,
    pub opacity: f64,
    pub filter: ConfettiType,
    pub disabled: BTreeSet<String>,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            intensity: HEATMAP_DEFAULT_INTENSITY,
            opacity: DEFAULT_OVERLAY_OPACITY,
            filter: ConfettiType::default(),
            disabled: BTreeSet::new(),
        }
    }
}

/// One overlay kind and its node, if created.
pub struct OverlayModule<S> {
    kind: OverlayMode,
    surface: Option<S>,
}

impl<S: Surface> OverlayModule<S> {
    fn new(kind: OverlayMode) -> Self {
        Self { kind, surface: None }
    }

    pub fn kind(&self) -> OverlayMode {
        self.kind
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    fn teardown<H: OverlayHost<Surface = S>>(&mut self, host: &mut H) {
        if self.surface.take().is_some() {
            host.remove_surface(self.kind);
            tracing::debug!(mode = self.kind.as_str(), "overlay removed");
        }
    }
}

pub struct OverlayRenderer<H: OverlayHost> {
    host: H,
    store: Rc<RefCell<Store>>,
    alternative: AlternativeIndex,
    modules: Vec<OverlayModule<H::Surface>>,
    settings: OverlaySettings,
    active: Option<OverlayMode>,
}

impl<H: OverlayHost> OverlayRenderer<H> {
    pub fn new(host: H, store: Rc<RefCell<Store>>, alternative: AlternativeIndex) -> Self {
        Self {
            host,
            store,
            alternative,
            modules: OverlayMode::ALL.into_iter().map(OverlayModule::new).collect(),
            settings: OverlaySettings::default(),
            active: None,
        }
    }

    pub fn store(&self) -> &Rc<RefCell<Store>> {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn active_mode(&self) -> Option<OverlayMode> {
        self.active
    }

    pub fn surface(&self, mode: OverlayMode) -> Option<&H::Surface> {
        self.module(mode).and_then(|module| module.surface.as_ref())
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::from_window_width(self.host.viewport_width().max(0.0) as u32)
    }

    fn module(&self, mode: OverlayMode) -> Option<&OverlayModule<H::Surface>> {
        self.modules.iter().find(|module| module.kind == mode)
    }

    /// Raw results are usable for drawing.
    fn accepts_results(&self, mode: OverlayMode, command: &FrameCommand) -> bool {
        let status = selectors::raw_status(&self.store.borrow(), self.alternative);
        if status.is_processable() {
            return true;
        }
        tracing::debug!(
            mode = mode.as_str(),
            command = command.as_str(),
            status = status.as_str(),
            "overlay not ready for results"
        );
        false
    }

    /// Applies one parent command. Returns the freshly measured layout when
    /// the command triggered processing.
    pub fn handle(&mut self, message: &FrameMessage) -> Result<Option<PageData>, RenderError> {
        let mode = message.mode;
        for module in self.modules.iter_mut().filter(|module| module.kind != mode) {
            module.teardown(&mut self.host);
        }
        self.active = Some(mode);

        match &message.command {
            FrameCommand::ProcessResults => {
                if !self.accepts_results(mode, &message.command) {
                    return Ok(None);
                }
                let page = self.process();
                self.render(mode)?;
                Ok(Some(page))
            }
            FrameCommand::RenderResults => {
                if !self.accepts_results(mode, &message.command) {
                    return Ok(None);
                }
                // pages merged since the last run leave the slot stale
                let page = if self.needs_processing() {
                    Some(self.process())
                } else {
                    None
                };
                self.render(mode)?;
                Ok(page)
            }
            FrameCommand::UpdateIntensity { value } => {
                if mode != OverlayMode::Heatmap {
                    tracing::debug!(mode = mode.as_str(), "intensity only applies to the heatmap");
                    return Ok(None);
                }
                self.settings.intensity = self.store.borrow().config.clamp_intensity(*value);
                self.rerender(mode)?;
                Ok(None)
            }
            FrameCommand::UpdateOpacity { value } => {
                if value.is_finite() {
                    self.settings.opacity = value.clamp(0.0, 1.0);
                }
                let opacity = self.settings.opacity;
                if let Some(surface) = self.surface_mut(mode) {
                    surface.set_opacity(opacity);
                }
                Ok(None)
            }
            FrameCommand::UpdateFilter { filter, disabled } => {
                if mode != OverlayMode::Confetti {
                    tracing::debug!(mode = mode.as_str(), "filters only apply to confetti");
                    return Ok(None);
                }
                self.settings.filter = *filter;
                self.settings.disabled = disabled.iter().cloned().collect();
                self.rerender(mode)?;
                Ok(None)
            }
        }
    }

    /// Re-measures the page and redraws the active overlay at the new size.
    /// Called on window resize and from the parent's "refresh view".
    pub fn maximize(&mut self) -> Result<Option<PageData>, RenderError> {
        let Some(mode) = self.active else {
            return Ok(None);
        };
        if !self.accepts_results(mode, &FrameCommand::ProcessResults) {
            return Ok(None);
        }
        let page = self.process();
        self.render(mode)?;
        Ok(Some(page))
    }

    fn needs_processing(&self) -> bool {
        let resolution = self.resolution();
        let store = self.store.borrow();
        selectors::processed(&store, self.alternative, resolution).is_none()
            || selectors::should_process(&store, self.alternative, resolution)
    }

    fn rerender(&mut self, mode: OverlayMode) -> Result<(), RenderError> {
        let mounted = self.module(mode).is_some_and(OverlayModule::is_mounted);
        if mounted && self.accepts_results(mode, &FrameCommand::RenderResults) {
            self.render(mode)?;
        }
        Ok(())
    }

    fn process(&mut self) -> PageData {
        let (anchors, max_height) = {
            let store = self.store.borrow();
            let anchors = selectors::raw_results(&store, self.alternative).results.anchors();
            (anchors, store.config.max_document_height)
        };
        let page = measure_page(&mut self.host, &anchors, max_height);
        let resolution = self.resolution();

        self.store.dispatch(Action::SetPageData {
            alternative: self.alternative,
            resolution,
            page: page.clone(),
        });
        request_result_processing(&mut self.store, self.alternative, resolution);
        page
    }

    fn surface_mut(&mut self, mode: OverlayMode) -> Option<&mut H::Surface> {
        self.modules
            .iter_mut()
            .find(|module| module.kind == mode)
            .and_then(|module| module.surface.as_mut())
    }

    fn render(&mut self, mode: OverlayMode) -> Result<(), RenderError> {
        let resolution = self.resolution();
        let (snapshot, point_size, row_height) = {
            let store = self.store.borrow();
            (
                selectors::processed(&store, self.alternative, resolution),
                store.config.point_size,
                store.config.row_height,
            )
        };
        let Some(snapshot) = snapshot else {
            return Ok(());
        };

        let width = snapshot.page.dimensions.width.max(1.0).round() as u32;
        let height = snapshot.page.dimensions.body_height.max(1.0).round() as u32;

        let index = self
            .modules
            .iter()
            .position(|module| module.kind == mode)
            .ok_or(RenderError::SurfaceUnavailable)?;
        if self.modules[index].surface.is_none() {
            let surface = self.host.create_surface(mode)?;
            self.modules[index].surface = Some(surface);
            tracing::debug!(mode = mode.as_str(), "overlay created");
        }
        let settings = &self.settings;
        let surface = self.modules[index]
            .surface
            .as_mut()
            .ok_or(RenderError::SurfaceUnavailable)?;

        surface.resize(width, height)?;
        surface.set_opacity(settings.opacity);
        match mode {
            OverlayMode::Heatmap => draw_heatmap(surface, &snapshot.results, point_size, settings.intensity)?,
            OverlayMode::Scrollmap => draw_scrollmap(surface, &snapshot.results.scroll_summary, row_height),
            OverlayMode::Confetti => {
                draw_confetti(
                    surface,
                    &snapshot.results.clicks,
                    settings.filter,
                    &settings.disabled,
                );
            }
        }
        Ok(())
    }
}
