use dioxus::prelude::*;

use crate::{
    heatmap::HeatmapDataStatus,
    loader::cancel_loading,
    results::{partial_notice, status_label},
    store::{reload, selectors, Action, Dispatch, Store},
    t,
};

/// Title bar: alternative name, loading status and the load controls.
#[component]
pub fn ResultsHeader(store: Signal<Store>, title: String, read_only: bool) -> Element {
    let state = store.read();
    let alternative = state.ui.active_alternative;
    let raw = selectors::raw_results(&state, alternative);
    let status = raw.status;
    let label = status_label(status, raw.progress);
    let notice = partial_notice(status);
    let sidebar_visible = state.ui.sidebar_visible;
    drop(state);

    let can_cancel = !read_only && status == HeatmapDataStatus::StillLoading;
    let can_reload = status.is_terminal();

    rsx! {
        header { class: "nab-results__header",
            div { class: "nab-results__title",
                h1 { "{title}" }
                span {
                    class: "nab-results__status nab-results__status--{status.as_str()}",
                    "{label}"
                }
                if let Some(notice) = notice {
                    span { class: "nab-results__notice", "{notice}" }
                }
            }

            div { class: "nab-results__actions",
                if can_cancel {
                    button {
                        r#type: "button",
                        class: "button button--ghost",
                        onclick: move |_| {
                            let mut store = store;
                            cancel_loading(&mut store, alternative);
                        },
                        {t!("action-cancel")}
                    }
                }
                if can_reload {
                    button {
                        r#type: "button",
                        class: "button",
                        onclick: move |_| {
                            let mut store = store;
                            reload(&mut store, alternative);
                        },
                        {t!("action-reload")}
                    }
                }
                button {
                    r#type: "button",
                    class: "button button--ghost",
                    aria_pressed: "{sidebar_visible}",
                    onclick: move |_| {
                        let mut store = store;
                        store.dispatch(Action::ToggleSidebar);
                    },
                    {t!("action-toggle-sidebar")}
                }
            }
        }
    }
}
