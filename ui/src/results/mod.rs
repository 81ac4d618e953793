//! The heatmap results page: header, sidebar and the alternative's iframe
//! with the overlay renderer inside.

use dioxus::prelude::*;

mod export;
pub use export::ClickExportButton;

mod frame_bridge;
pub use frame_bridge::{
    apply_frame_event, expire_handshake, post_to_frame, sync_messages, HandshakeClock, FRAME_ELEMENT_ID,
};

mod header;
pub use header::ResultsHeader;

mod sidebar;
pub use sidebar::ResultsSidebar;

mod utils;
pub(crate) use utils::*;

use crate::{
    core::{config::Settings, platform::sleep_ms},
    heatmap::{HeatmapDataStatus, ResultsUrl},
    loader::{load_results, ServerResults},
    store::{refresh_view, request_result_processing, selectors, Action, Dispatch, Store},
    t,
};

const RESULTS_CSS: Asset = asset!("/assets/results.css");

#[component]
pub fn HeatmapResultsPage(settings: Settings) -> Element {
    let store = use_signal(|| Store::new(&settings));
    let mut frame_nonce = use_signal(|| 0u32);
    let mut handshakes = use_signal(HandshakeClock::default);
    let experiment = settings.experiment;

    #[cfg(target_arch = "wasm32")]
    let _listener = use_hook(move || std::rc::Rc::new(frame_bridge::FrameListener::attach(store)));

    // raw results of the active alternative
    use_effect(move || {
        let state = store.read();
        let alternative = state.ui.active_alternative;
        if selectors::raw_status(&state, alternative) != HeatmapDataStatus::Missing {
            return;
        }
        drop(state);
        spawn(async move {
            let mut store = store;
            load_results(&mut store, &ServerResults, experiment, alternative).await;
        });
    });

    // processing of the visible slot
    use_effect(move || {
        let (alternative, resolution) = {
            let state = store.read();
            (state.ui.active_alternative, state.ui.resolution)
        };
        let mut store = store;
        request_result_processing(&mut store, alternative, resolution);
    });

    let active = use_memo(move || store.read().ui.active_alternative);

    // handshake timeout, restarted for every new frame
    use_effect(move || {
        let alternative = active();
        let _ = frame_nonce(); // remounted frame
        let ticket = handshakes.write().restart();
        let timeout = store.peek().config.handshake_timeout_ms;
        let mut handle = store;
        handle.dispatch(Action::ResetIFrame { alternative });
        spawn(async move {
            sleep_ms(timeout).await;
            if !handshakes.peek().is_current(ticket) {
                return;
            }
            let mut store = store;
            expire_handshake(&mut store, alternative);
        });
    });

    let frame_state = use_memo(move || {
        let state = store.read();
        let alternative = state.ui.active_alternative;
        (
            state.ui.clone(),
            selectors::iframe_status(&state, alternative),
            selectors::raw_status(&state, alternative),
        )
    });

    // keep the overlay in line with the sidebar
    use_effect(move || {
        let (ui, iframe, raw) = frame_state();
        if iframe != crate::store::IFrameStatus::PageReady || !raw.is_processable() {
            return;
        }
        for message in sync_messages(&ui) {
            if let Err(err) = post_to_frame(&message) {
                tracing::warn!(command = message.command.as_str(), "could not reach the frame: {err}");
                break;
            }
        }
    });

    let state = store.read();
    let alternative = state.ui.active_alternative;
    let frame_width = state.config.frame_width(state.ui.resolution);
    drop(state);

    let info = settings.alternatives.get(alternative).cloned();
    let title = info
        .as_ref()
        .map(|info| info.name.clone())
        .unwrap_or_else(|| t!("results-title"));
    let src = info
        .as_ref()
        .map(|info| {
            ResultsUrl::new(experiment, alternative)
                .with_pipeline(&settings.pipeline)
                .build(&info.url)
        });
    let nonce = frame_nonce();

    rsx! {
        document::Link { rel: "stylesheet", href: RESULTS_CSS }

        section { class: "nab-results",
            ResultsHeader { store, title, read_only: settings.read_only }

            div { class: "nab-results__body",
                ResultsSidebar {
                    store,
                    alternatives: settings.alternatives.clone(),
                    on_refresh: move |_| {
                        let mut store = store;
                        refresh_view(&mut store, alternative);
                        frame_nonce += 1;
                    },
                }

                div { class: "nab-results__viewport",
                    if let Some(src) = src {
                        iframe {
                            key: "{alternative}-{nonce}",
                            id: FRAME_ELEMENT_ID,
                            class: "nab-results__frame",
                            src: "{src}",
                            style: "width: {frame_width}px",
                        }
                    } else {
                        p { class: "nab-results__placeholder", {t!("status-error-experiment-not-found")} }
                    }
                }
            }
        }
    }
}
