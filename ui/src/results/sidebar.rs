use dioxus::prelude::*;

use crate::{
    core::{config::AlternativeInfo, format},
    heatmap::{ConfettiType, OverlayMode, Resolution},
    i18n::{tr_filter, tr_mode, tr_resolution},
    results::{iframe_notice, top_square_label, ClickExportButton},
    store::{selectors, Action, Dispatch, Store},
    t,
};

fn dispatch(store: Signal<Store>, action: Action) {
    let mut store = store;
    store.dispatch(action);
}

#[component]
pub fn ResultsSidebar(
    store: Signal<Store>,
    alternatives: Vec<AlternativeInfo>,
    on_refresh: EventHandler<()>,
) -> Element {
    let state = store.read();
    let ui = state.ui.clone();
    let config = state.config.clone();
    let snapshot = selectors::active_processed(&state);
    let frame_notice = iframe_notice(selectors::iframe_status(&state, ui.active_alternative));
    drop(state);

    if !ui.sidebar_visible {
        return rsx! {};
    }

    let options = snapshot
        .as_ref()
        .map(|snapshot| snapshot.confetti_filter_options.get(ui.filter).to_vec())
        .unwrap_or_default();

    rsx! {
        aside { class: "nab-sidebar",
            section { class: "nab-sidebar__group",
                h2 { {t!("sidebar-alternative")} }
                ul { class: "nab-sidebar__choices",
                    for (index, alternative) in alternatives.iter().enumerate() {
                        li { key: "{index}",
                            button {
                                r#type: "button",
                                class: if index == ui.active_alternative { "nab-choice nab-choice--active" } else { "nab-choice" },
                                title: "{alternative.url}",
                                onclick: move |_| dispatch(store, Action::SetActiveAlternative { alternative: index }),
                                "{alternative.name}"
                            }
                        }
                    }
                }
            }

            section { class: "nab-sidebar__group",
                h2 { {t!("sidebar-mode")} }
                div { class: "nab-sidebar__choices",
                    for mode in OverlayMode::ALL {
                        button {
                            key: "{mode}",
                            r#type: "button",
                            class: if mode == ui.mode { "nab-choice nab-choice--active" } else { "nab-choice" },
                            onclick: move |_| dispatch(store, Action::SetMode { mode }),
                            {tr_mode(mode)}
                        }
                    }
                }
            }

            section { class: "nab-sidebar__group",
                h2 { {t!("sidebar-resolution")} }
                div { class: "nab-sidebar__choices",
                    for resolution in Resolution::ALL {
                        button {
                            key: "{resolution.as_str()}",
                            r#type: "button",
                            class: if resolution == ui.resolution { "nab-choice nab-choice--active" } else { "nab-choice" },
                            onclick: move |_| dispatch(store, Action::SetResolution { resolution }),
                            {tr_resolution(resolution)}
                        }
                    }
                }
            }

            if ui.mode == OverlayMode::Heatmap {
                section { class: "nab-sidebar__group",
                    label { r#for: "nab-intensity", {t!("sidebar-intensity")} }
                    input {
                        id: "nab-intensity",
                        r#type: "range",
                        min: "{config.min_intensity}",
                        max: "{config.max_intensity}",
                        step: "0.1",
                        value: "{ui.intensity}",
                        oninput: move |evt| {
                            if let Ok(value) = evt.value().parse::<f64>() {
                                dispatch(store, Action::SetIntensity { value });
                            }
                        },
                    }
                    span { class: "nab-sidebar__value", "{format::format_number(ui.intensity, 1)}" }
                }
            }

            section { class: "nab-sidebar__group",
                label { r#for: "nab-opacity", {t!("sidebar-opacity")} }
                input {
                    id: "nab-opacity",
                    r#type: "range",
                    min: "0",
                    max: "1",
                    step: "0.05",
                    value: "{ui.opacity}",
                    oninput: move |evt| {
                        if let Ok(value) = evt.value().parse::<f64>() {
                            dispatch(store, Action::SetOpacity { value });
                        }
                    },
                }
                span { class: "nab-sidebar__value", "{format::format_percent(ui.opacity)}" }
            }

            if ui.mode == OverlayMode::Confetti {
                section { class: "nab-sidebar__group",
                    label { r#for: "nab-filter", {t!("sidebar-filter")} }
                    select {
                        id: "nab-filter",
                        value: "{ui.filter.as_str()}",
                        onchange: move |evt| {
                            if let Some(filter) = ConfettiType::parse(&evt.value()) {
                                dispatch(store, Action::SetFilter { filter });
                            }
                        },
                        for filter in ConfettiType::ALL {
                            option {
                                key: "{filter.as_str()}",
                                value: "{filter.as_str()}",
                                selected: filter == ui.filter,
                                {tr_filter(filter)}
                            }
                        }
                    }
                    ul { class: "nab-confetti-options",
                        for entry in options {
                            li { key: "{entry.key}",
                                label { class: "nab-confetti-option",
                                    input {
                                        r#type: "checkbox",
                                        checked: !ui.is_option_disabled(&entry.key),
                                        onchange: {
                                            let key = entry.key.clone();
                                            move |_| dispatch(store, Action::ToggleFilterOption { key: key.clone() })
                                        },
                                    }
                                    span {
                                        class: "nab-confetti-option__swatch",
                                        style: "background-color: {entry.color.to_css()}",
                                    }
                                    span { class: "nab-confetti-option__label", "{entry.label}" }
                                    span { class: "nab-confetti-option__count", "{entry.value}" }
                                }
                            }
                        }
                    }
                }
            }

            section { class: "nab-sidebar__group nab-sidebar__summary",
                match snapshot.as_ref() {
                    Some(snapshot) => {
                        let results = &snapshot.results;
                        rsx! {
                            p { {t!("summary-clicks", count = results.clicks.len())} }
                            p { {t!("summary-scrolls", count = results.scrolls.len())} }
                            if results.clicks.is_empty() {
                                p { class: "nab-sidebar__notice", {t!("notice-no-clicks")} }
                            } else {
                                p { {t!("summary-top-square", share = top_square_label(results))} }
                            }
                            ClickExportButton {
                                clicks: results.clicks.clone(),
                                alternative: ui.active_alternative,
                                resolution: results.resolution,
                            }
                        }
                    }
                    None => rsx! {
                        p { class: "nab-sidebar__placeholder", {t!("summary-pending")} }
                    },
                }
                if let Some(notice) = frame_notice {
                    p { class: "nab-sidebar__notice", "{notice}" }
                }
                button {
                    r#type: "button",
                    class: "button button--ghost",
                    onclick: move |_| on_refresh.call(()),
                    {t!("action-refresh-view")}
                }
            }
        }
    }
}
