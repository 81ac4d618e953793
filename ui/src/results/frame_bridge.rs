//! Parent side of the iframe conversation.
//!
//! Events from the renderer update the store; state changes in the sidebar
//! turn into [`FrameMessage`]s posted back to the frame.

use crate::heatmap::{
    FrameCommand, FrameEvent, FrameEventMessage, FrameMessage, OverlayMode, Resolution,
};
use crate::store::{selectors, Action, Dispatch, IFrameStatus, UiState};

/// DOM id of the iframe showing the active alternative.
pub const FRAME_ELEMENT_ID: &str = "nab-heatmap-frame";

/// Applies one renderer event. Returns the command to send back, if any.
pub fn apply_frame_event<D: Dispatch>(store: &mut D, message: FrameEventMessage) -> Option<FrameMessage> {
    let alternative = message.alternative;
    match message.event {
        FrameEvent::ScriptReady => {
            store.dispatch(Action::SetIFrameStatus {
                alternative,
                status: IFrameStatus::ScriptReady,
            });
            None
        }
        FrameEvent::PageReady => {
            store.dispatch(Action::SetIFrameStatus {
                alternative,
                status: IFrameStatus::PageReady,
            });
            let mode = store.with_state(|state| state.ui.mode);
            Some(FrameMessage::new(mode, FrameCommand::ProcessResults))
        }
        FrameEvent::Layout { page } => {
            let resolution = Resolution::from_window_width(page.dimensions.width.max(0.0) as u32);
            tracing::debug!(alternative, resolution = resolution.as_str(), "layout received");
            store.dispatch(Action::SetPageData {
                alternative,
                resolution,
                page,
            });
            None
        }
    }
}

/// Counts handshake restarts so a timer armed for an older frame can tell
/// it is stale, even when the same alternative comes back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandshakeClock(u64);

impl HandshakeClock {
    /// Restarts the handshake and returns the ticket of the new timer.
    pub fn restart(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0 == ticket
    }
}

/// Gives up on the handshake. Only an iframe still waiting is affected.
pub fn expire_handshake<D: Dispatch>(store: &mut D, alternative: usize) -> bool {
    let status = store.with_state(|state| selectors::iframe_status(state, alternative));
    if status != IFrameStatus::WaitingScript {
        return false;
    }
    tracing::warn!(alternative, "overlay script did not answer");
    store.dispatch(Action::SetIFrameStatus {
        alternative,
        status: IFrameStatus::ScriptNotFound,
    });
    true
}

/// Commands that bring the frame in line with `ui`.
pub fn sync_messages(ui: &UiState) -> Vec<FrameMessage> {
    let mode = ui.mode;
    let mut messages = vec![FrameMessage::new(mode, FrameCommand::UpdateOpacity { value: ui.opacity })];
    match mode {
        OverlayMode::Heatmap => messages.push(FrameMessage::new(
            mode,
            FrameCommand::UpdateIntensity { value: ui.intensity },
        )),
        OverlayMode::Confetti => messages.push(FrameMessage::new(
            mode,
            FrameCommand::UpdateFilter {
                filter: ui.filter,
                disabled: ui.disabled_for_filter(),
            },
        )),
        OverlayMode::Scrollmap => {}
    }
    messages.push(FrameMessage::new(mode, FrameCommand::RenderResults));
    messages
}

/// Posts `message` to the iframe's window.
#[cfg(target_arch = "wasm32")]
pub fn post_to_frame(message: &FrameMessage) -> Result<(), crate::core::error::RenderError> {
    use crate::core::error::RenderError;
    use wasm_bindgen::{JsCast, JsValue};

    let json = message
        .to_json()
        .map_err(|err| RenderError::Dom(err.to_string()))?;
    let frame = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(FRAME_ELEMENT_ID))
        .and_then(|element| element.dyn_into::<web_sys::HtmlIFrameElement>().ok())
        .ok_or(RenderError::SurfaceUnavailable)?;
    let target = frame.content_window().ok_or(RenderError::SurfaceUnavailable)?;
    target
        .post_message(&JsValue::from_str(&json), "*")
        .map_err(|err| RenderError::Dom(format!("{err:?}")))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn post_to_frame(message: &FrameMessage) -> Result<(), crate::core::error::RenderError> {
    tracing::trace!(command = message.command.as_str(), "no frame outside the browser");
    Ok(())
}

/// Window `message` listener feeding [`apply_frame_event`]. Removed on drop.
#[cfg(target_arch = "wasm32")]
pub struct FrameListener {
    callback: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::MessageEvent)>,
}

#[cfg(target_arch = "wasm32")]
impl FrameListener {
    pub fn attach(store: dioxus::prelude::Signal<crate::store::Store>) -> Option<Self> {
        use wasm_bindgen::{closure::Closure, JsCast};

        let window = web_sys::window()?;
        let callback = Closure::wrap(Box::new(move |event: web_sys::MessageEvent| {
            let Some(raw) = event.data().as_string() else {
                return;
            };
            let message = match FrameEventMessage::parse(&raw) {
                Ok(message) => message,
                Err(crate::heatmap::FrameError::Foreign) => return,
                Err(err) => {
                    tracing::warn!("dropping frame event: {err}");
                    return;
                }
            };
            let mut store = store;
            if let Some(reply) = apply_frame_event(&mut store, message) {
                if let Err(err) = post_to_frame(&reply) {
                    tracing::warn!("could not reach the frame: {err}");
                }
            }
        }) as Box<dyn FnMut(web_sys::MessageEvent)>);
        window
            .add_event_listener_with_callback("message", callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { callback })
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for FrameListener {
    fn drop(&mut self) {
        use wasm_bindgen::JsCast;

        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback("message", self.callback.as_ref().unchecked_ref());
        }
    }
}
