//! Browser side of the overlay renderer: canvas surfaces, DOM measuring and
//! the `postMessage` plumbing with the parent results page.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::{closure::Closure, Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, MessageEvent, Window};

use ui::core::config::Settings;
use ui::core::error::RenderError;
use ui::heatmap::colors::Rgba;
use ui::heatmap::{BoundingBox, FrameEvent, FrameEventMessage, OverlayMode, ResultsUrl};
use ui::loader::{load_results_with, ServerResults};
use ui::render::{OverlayHost, OverlayImage, Surface};
use ui::store::Store;

use crate::session::Session;

fn dom_error(err: JsValue) -> RenderError {
    RenderError::Dom(format!("{err:?}"))
}

fn overlay_id(mode: OverlayMode) -> String {
    format!("nab-overlay-{}", mode.as_str())
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let context = canvas
            .get_context("2d")
            .map_err(dom_error)?
            .ok_or(RenderError::SurfaceUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::SurfaceUnavailable)?;
        Ok(Self { canvas, context })
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if self.size() != (width, height) {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
        let style = self.canvas.style();
        style.set_property("width", &format!("{width}px")).map_err(dom_error)?;
        style.set_property("height", &format!("{height}px")).map_err(dom_error)?;
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn clear(&mut self) {
        let (width, height) = self.size();
        self.context.clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        self.context.set_fill_style_str(&color.to_css());
        self.context.fill_rect(x, y, width, height);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        self.context.set_fill_style_str(&color.to_css());
        self.context.begin_path();
        if self.context.arc(cx, cy, radius, 0.0, TAU).is_ok() {
            self.context.fill();
        }
    }

    fn draw_image(&mut self, image: &OverlayImage) -> Result<(), RenderError> {
        let data = web_sys::ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(image.pixels.as_slice()),
            image.width,
            image.height,
        )
        .map_err(dom_error)?;

        // blit at native size, then scale it up onto the overlay
        let document = self.canvas.owner_document().ok_or(RenderError::SurfaceUnavailable)?;
        let raster = document
            .create_element("canvas")
            .map_err(dom_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::SurfaceUnavailable)?;
        raster.set_width(image.width);
        raster.set_height(image.height);
        CanvasSurface::new(raster.clone())?
            .context
            .put_image_data(&data, 0.0, 0.0)
            .map_err(dom_error)?;

        self.context.save();
        self.context.set_image_smoothing_enabled(true);
        let drawn = self
            .context
            .scale(image.scale, image.scale)
            .and_then(|_| self.context.draw_image_with_html_canvas_element(&raster, 0.0, 0.0));
        self.context.restore();
        drawn.map_err(dom_error)
    }

    fn set_opacity(&mut self, opacity: f64) {
        let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
        let _ = self.canvas.style().set_property("opacity", &opacity.to_string());
    }
}

/// The alternative's own document.
pub struct PageHost {
    window: Window,
    document: Document,
}

impl PageHost {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn overlays(&self) -> impl Iterator<Item = Element> + '_ {
        OverlayMode::ALL
            .into_iter()
            .filter_map(|mode| self.document.get_element_by_id(&overlay_id(mode)))
    }

    fn set_overlay_display(&self, display: &str) {
        for overlay in self.overlays() {
            if let Some(overlay) = overlay.dyn_ref::<web_sys::HtmlElement>() {
                let _ = overlay.style().set_property("display", display);
            }
        }
    }

    fn find(&self, selector: &str) -> Option<Element> {
        if selector.starts_with('/') {
            let result = self.document.evaluate(selector, &self.document).ok()?;
            result.iterate_next().ok()??.dyn_into::<Element>().ok()
        } else {
            self.document.query_selector(selector).ok()?
        }
    }
}

impl OverlayHost for PageHost {
    type Surface = CanvasSurface;

    fn create_surface(&mut self, mode: OverlayMode) -> Result<CanvasSurface, RenderError> {
        let id = overlay_id(mode);
        let canvas = match self.document.get_element_by_id(&id) {
            Some(existing) => existing,
            None => {
                let created = self.document.create_element("canvas").map_err(dom_error)?;
                created.set_id(&id);
                created
                    .set_attribute(
                        "style",
                        "position:absolute;top:0;left:0;pointer-events:none;z-index:2147483647",
                    )
                    .map_err(dom_error)?;
                self.document
                    .body()
                    .ok_or(RenderError::SurfaceUnavailable)?
                    .append_child(&created)
                    .map_err(dom_error)?;
                created
            }
        };
        let canvas = canvas
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::SurfaceUnavailable)?;
        CanvasSurface::new(canvas)
    }

    fn remove_surface(&mut self, mode: OverlayMode) {
        if let Some(node) = self.document.get_element_by_id(&overlay_id(mode)) {
            node.remove();
        }
    }

    fn detach_overlays(&mut self) {
        self.set_overlay_display("none");
    }

    fn restore_overlays(&mut self) {
        self.set_overlay_display("block");
    }

    fn scroll_height(&self) -> f64 {
        let root = self
            .document
            .document_element()
            .map(|element| element.scroll_height())
            .unwrap_or_default();
        let body = self
            .document
            .body()
            .map(|body| body.scroll_height())
            .unwrap_or_default();
        f64::from(root.max(body))
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or_default()
    }

    fn bounding_box(&self, selector: &str) -> Option<BoundingBox> {
        let rect = self.find(selector)?.get_bounding_client_rect();
        if rect.width() <= 0.0 && rect.height() <= 0.0 {
            return None;
        }
        Some(BoundingBox {
            top: rect.top() + self.window.scroll_y().unwrap_or_default(),
            left: rect.left() + self.window.scroll_x().unwrap_or_default(),
            width: rect.width(),
            height: rect.height(),
        })
    }
}

fn post_to_parent(window: &Window, message: &FrameEventMessage) {
    let json = match message.to_json() {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!("unable to encode frame event: {err}");
            return;
        }
    };
    let parent = match window.parent() {
        Ok(Some(parent)) => parent,
        _ => return,
    };
    if let Err(err) = parent.post_message(&JsValue::from_str(&json), "*") {
        tracing::warn!("unable to reach the results page: {err:?}");
    }
}

type SharedSession = Rc<RefCell<Session<PageHost>>>;

/// Boots the renderer when the page was opened by the results viewer.
pub fn start() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(target) = window.location().href().ok().as_deref().and_then(ResultsUrl::parse) else {
        tracing::debug!("not a heatmap results preview");
        return;
    };
    let Some(host) = PageHost::new() else {
        return;
    };
    tracing::info!(
        experiment = target.experiment,
        alternative = target.alternative,
        "heatmap overlay renderer starting"
    );

    let settings = Settings {
        pipeline: target.pipeline.clone(),
        ..Settings::default()
    };
    let store = Rc::new(RefCell::new(Store::new(&settings)));
    let session: SharedSession = Rc::new(RefCell::new(Session::new(
        host,
        Rc::clone(&store),
        target.alternative,
    )));

    listen_to_parent(&window, &session);
    listen_to_resize(&window, &session);
    post_to_parent(&window, &session.borrow().event(FrameEvent::ScriptReady));
    announce_page_ready(&window, &session);

    let loader_session = Rc::clone(&session);
    let loader_window = window.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let mut store = store;
        let redraw = || {
            let reply = loader_session.borrow_mut().refresh();
            if let Some(reply) = reply {
                post_to_parent(&loader_window, &reply);
            }
        };
        load_results_with(&mut store, &ServerResults, target.experiment, target.alternative, |_| redraw())
            .await;
        redraw();
    });
}

fn listen_to_parent(window: &Window, session: &SharedSession) {
    let session = Rc::clone(session);
    let reply_window = window.clone();
    let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
        let Some(raw) = event.data().as_string() else {
            return;
        };
        let reply = session.borrow_mut().on_message(&raw);
        if let Some(reply) = reply {
            post_to_parent(&reply_window, &reply);
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    let _ = window.add_event_listener_with_callback("message", onmessage.as_ref().unchecked_ref());
    onmessage.forget();
}

fn listen_to_resize(window: &Window, session: &SharedSession) {
    let debounce_ms = session
        .borrow()
        .renderer()
        .store()
        .borrow()
        .config
        .resize_debounce_ms;
    let mut pending: Option<Timeout> = None;
    let session = Rc::clone(session);
    let reply_window = window.clone();
    let onresize = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        let session = Rc::clone(&session);
        let reply_window = reply_window.clone();
        let timeout = Timeout::new(debounce_ms, move || {
            let reply = session.borrow_mut().refresh();
            if let Some(reply) = reply {
                post_to_parent(&reply_window, &reply);
            }
        });
        // dropping the previous timeout cancels it
        pending = Some(timeout);
    }) as Box<dyn FnMut(web_sys::Event)>);
    let _ = window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref());
    onresize.forget();
}

fn announce_page_ready(window: &Window, session: &SharedSession) {
    let page_ready = session.borrow().event(FrameEvent::PageReady);
    let loaded = window
        .document()
        .is_some_and(|document| document.ready_state() == "complete");
    if loaded {
        post_to_parent(window, &page_ready);
        return;
    }
    let ready_window = window.clone();
    let onload: Closure<dyn FnMut(web_sys::Event)> = Closure::once(move |_event: web_sys::Event| {
        post_to_parent(&ready_window, &page_ready);
    });
    let _ = window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref());
    onload.forget();
}
