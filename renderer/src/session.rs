//! Message handling of the overlay renderer, independent of the DOM.

use std::cell::RefCell;
use std::rc::Rc;

use ui::heatmap::{AlternativeIndex, FrameError, FrameEvent, FrameEventMessage, FrameMessage, PageData};
use ui::render::{OverlayHost, OverlayRenderer};
use ui::store::Store;

pub struct Session<H: OverlayHost> {
    renderer: OverlayRenderer<H>,
    alternative: AlternativeIndex,
}

impl<H: OverlayHost> Session<H> {
    pub fn new(host: H, store: Rc<RefCell<Store>>, alternative: AlternativeIndex) -> Self {
        Self {
            renderer: OverlayRenderer::new(host, store, alternative),
            alternative,
        }
    }

    pub fn renderer(&self) -> &OverlayRenderer<H> {
        &self.renderer
    }

    pub fn event(&self, event: FrameEvent) -> FrameEventMessage {
        FrameEventMessage::new(self.alternative, event)
    }

    fn layout(&self, page: Option<PageData>) -> Option<FrameEventMessage> {
        page.map(|page| self.event(FrameEvent::Layout { page }))
    }

    /// Handles one raw `postMessage` payload from the parent. Foreign
    /// traffic is ignored silently.
    pub fn on_message(&mut self, raw: &str) -> Option<FrameEventMessage> {
        let message = match FrameMessage::parse(raw) {
            Ok(message) => message,
            Err(FrameError::Foreign) => return None,
            Err(err) => {
                tracing::warn!("dropping parent message: {err}");
                return None;
            }
        };
        match self.renderer.handle(&message) {
            Ok(page) => self.layout(page),
            Err(err) => {
                tracing::error!(command = message.command.as_str(), "overlay failed: {err}");
                None
            }
        }
    }

    /// Viewport changed or new results arrived: re-measure and redraw.
    pub fn refresh(&mut self) -> Option<FrameEventMessage> {
        match self.renderer.maximize() {
            Ok(page) => self.layout(page),
            Err(err) => {
                tracing::error!("overlay refresh failed: {err}");
                None
            }
        }
    }
}
