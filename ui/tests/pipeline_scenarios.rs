//! End to end: the parent page and the iframe renderer each load the same
//! results, the renderer measures the page, and the parent processes the
//! layout it reports back.

#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use api::ResultsPage;
use futures::executor::block_on;
use ui::core::config::PipelineConfig;
use ui::core::error::{LoadError, RenderError};
use ui::heatmap::{
    AlternativeIndex, BoundingBox, Click, ConfettiType, ExperimentId, FrameCommand, FrameEvent,
    FrameEventMessage, FrameMessage, HeatmapDataStatus, OverlayMode, Resolution, Scroll, VisitContext,
};
use ui::loader::{load_results, ResultsSource};
use ui::render::pixmap::PixmapSurface;
use ui::render::{OverlayHost, OverlayRenderer};
use ui::results::apply_frame_event;
use ui::store::{request_result_processing, selectors, Dispatch, ResolutionStatus, Store};

struct Pages(RefCell<VecDeque<ResultsPage>>);

impl ResultsSource for Pages {
    async fn fetch_page(
        &self,
        _experiment: ExperimentId,
        _alternative: AlternativeIndex,
        _page: u32,
    ) -> Result<ResultsPage, LoadError> {
        self.0
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| LoadError::Backend("no more pages".into()))
    }
}

fn context(browser: &str) -> VisitContext {
    VisitContext {
        browser: browser.into(),
        window_width_in_px: 1280,
        ..VisitContext::default()
    }
}

fn anchored_click(browser: &str) -> Click {
    Click {
        xpath: Some("/html/body/main/a".into()),
        css_path: None,
        offset_x: 10.0,
        offset_y: 10.0,
        x: 0.0,
        y: 0.0,
        context: context(browser),
    }
}

fn source() -> Pages {
    Pages(RefCell::new(VecDeque::from([
        ResultsPage {
            clicks: vec![anchored_click("Firefox"), anchored_click("Chrome")],
            scrolls: vec![Scroll {
                max_scroll: 600.0,
                context: context("Firefox"),
            }],
            has_more: true,
            total: Some(5),
        },
        ResultsPage {
            clicks: vec![anchored_click("Chrome")],
            scrolls: vec![Scroll {
                max_scroll: 120.0,
                context: context("Chrome"),
            }],
            has_more: false,
            total: Some(5),
        },
    ])))
}

struct PageHost {
    removed: Vec<OverlayMode>,
}

impl OverlayHost for PageHost {
    type Surface = PixmapSurface;

    fn create_surface(&mut self, _mode: OverlayMode) -> Result<PixmapSurface, RenderError> {
        PixmapSurface::new(1, 1)
    }

    fn remove_surface(&mut self, mode: OverlayMode) {
        self.removed.push(mode);
    }

    fn detach_overlays(&mut self) {}

    fn restore_overlays(&mut self) {}

    fn scroll_height(&self) -> f64 {
        1_000.0
    }

    fn viewport_width(&self) -> f64 {
        1_280.0
    }

    fn bounding_box(&self, selector: &str) -> Option<BoundingBox> {
        (selector == "/html/body/main/a").then_some(BoundingBox {
            top: 200.0,
            left: 100.0,
            width: 80.0,
            height: 40.0,
        })
    }
}

fn shared_store() -> Rc<RefCell<Store>> {
    Rc::new(RefCell::new(Store {
        config: PipelineConfig {
            retry_delay_ms: 0,
            ..PipelineConfig::default()
        },
        ..Store::default()
    }))
}

#[test]
fn parent_and_frame_agree_on_the_processed_results() {
    let mut parent = shared_store();
    block_on(load_results(&mut parent, &source(), 42, 0));
    assert_eq!(
        selectors::raw_status(&parent.borrow(), 0),
        HeatmapDataStatus::Ready(None)
    );

    let mut frame_store = shared_store();
    block_on(load_results(&mut frame_store, &source(), 42, 0));
    let mut renderer = OverlayRenderer::new(PageHost { removed: Vec::new() }, Rc::clone(&frame_store), 0);

    let page = renderer
        .handle(&FrameMessage::new(OverlayMode::Heatmap, FrameCommand::ProcessResults))
        .expect("render succeeds")
        .expect("layout measured");
    assert_eq!(page.dimensions.body_height, 1_000.0);
    let heat = renderer
        .surface(OverlayMode::Heatmap)
        .and_then(|surface| surface.pixel(110, 210))
        .expect("heatmap drawn");
    assert!(heat.a > 0);

    // the renderer reports its layout; the parent processes against it
    let reply = apply_frame_event(&mut parent, FrameEventMessage::new(0, FrameEvent::Layout { page }));
    assert!(reply.is_none());
    assert!(request_result_processing(&mut parent, 0, Resolution::Desktop));
    assert!(!request_result_processing(&mut parent, 0, Resolution::Desktop));

    let parent_view = selectors::processed(&parent.borrow(), 0, Resolution::Desktop).expect("processed");
    let frame_view = selectors::processed(&frame_store.borrow(), 0, Resolution::Desktop).expect("processed");
    assert_eq!(parent_view.results, frame_view.results);
    assert_eq!(
        parent.with_state(|state| selectors::resolution_status(state, 0, Resolution::Desktop)),
        ResolutionStatus::Ready
    );

    let results = &parent_view.results;
    assert_eq!(results.clicks.len(), 3);
    assert!(results.clicks.iter().all(|click| click.anchored && click.x == 110.0 && click.y == 210.0));
    assert_eq!(results.clicks_per_square.total(), 3);
    assert_eq!(results.scroll_summary.visitors(), 2);

    let browsers = parent_view.confetti_filter_options.get(ConfettiType::Browser);
    assert_eq!(browsers[0].key, "Chrome");
    assert_eq!(browsers[0].value, 2);
}

#[test]
fn switching_modes_replaces_the_overlay() {
    let mut frame_store = shared_store();
    block_on(load_results(&mut frame_store, &source(), 42, 0));
    let mut renderer = OverlayRenderer::new(PageHost { removed: Vec::new() }, frame_store, 0);

    renderer
        .handle(&FrameMessage::new(OverlayMode::Heatmap, FrameCommand::ProcessResults))
        .expect("render succeeds");
    renderer
        .handle(&FrameMessage::new(
            OverlayMode::Confetti,
            FrameCommand::UpdateFilter {
                filter: ConfettiType::Browser,
                disabled: vec!["Chrome".into()],
            },
        ))
        .expect("filter applied");
    renderer
        .handle(&FrameMessage::new(OverlayMode::Confetti, FrameCommand::RenderResults))
        .expect("render succeeds");

    assert_eq!(renderer.host().removed, vec![OverlayMode::Heatmap]);
    assert_eq!(renderer.active_mode(), Some(OverlayMode::Confetti));
    assert!(renderer.surface(OverlayMode::Heatmap).is_none());
    assert!(renderer.surface(OverlayMode::Confetti).is_some());
    assert!(renderer.settings().disabled.contains("Chrome"));
}
