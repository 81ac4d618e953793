//! Plain actions and the side-effect operations built on them.

use std::rc::Rc;

use crate::heatmap::{
    confetti_filter_options, process, AlternativeIndex, Click, ConfettiType, HeatmapDataStatus,
    LoadAttempts, OverlayMode, PageData, Resolution, Scroll,
};

use super::data::ProcessedSnapshot;
use super::misc::IFrameStatus;
use super::{selectors, Dispatch};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // data
    SetRawStatus {
        alternative: AlternativeIndex,
        status: HeatmapDataStatus,
    },
    AppendRawResults {
        alternative: AlternativeIndex,
        clicks: Vec<Click>,
        scrolls: Vec<Scroll>,
    },
    SetProgress {
        alternative: AlternativeIndex,
        progress: f64,
    },
    SetLoadAttempts {
        alternative: AlternativeIndex,
        attempts: LoadAttempts,
    },
    ResetRawResults {
        alternative: AlternativeIndex,
    },
    SetPageData {
        alternative: AlternativeIndex,
        resolution: Resolution,
        page: PageData,
    },
    StartProcessing {
        alternative: AlternativeIndex,
        resolution: Resolution,
    },
    ReceiveProcessedResults {
        alternative: AlternativeIndex,
        resolution: Resolution,
        snapshot: ProcessedSnapshot,
    },
    MarkOutdated {
        alternative: AlternativeIndex,
    },

    // ui
    SetActiveAlternative {
        alternative: AlternativeIndex,
    },
    SetMode {
        mode: OverlayMode,
    },
    SetResolution {
        resolution: Resolution,
    },
    SetFilter {
        filter: ConfettiType,
    },
    ToggleFilterOption {
        key: String,
    },
    SetIntensity {
        value: f64,
    },
    SetOpacity {
        value: f64,
    },
    ToggleSidebar,

    // misc
    SetIFrameStatus {
        alternative: AlternativeIndex,
        status: IFrameStatus,
    },
    ResetIFrame {
        alternative: AlternativeIndex,
    },
    SetFirstDayOfWeek {
        day: u8,
    },
}

/// Processes the results of `alternative` at `resolution` if they need it.
///
/// Returns whether a run happened. Calling it again with nothing changed is a
/// no-op, so it is safe to call from every render.
pub fn request_result_processing<D: Dispatch>(
    store: &mut D,
    alternative: AlternativeIndex,
    resolution: Resolution,
) -> bool {
    let inputs = store.with_state(|state| {
        if !selectors::should_process(state, alternative, resolution) {
            return None;
        }
        let entry = state.data.alternative(alternative)?;
        let page = entry.by_resolution[resolution].page.clone()?;
        Some((
            Rc::clone(&entry.raw.results),
            page,
            state.config.clone(),
            state.misc.first_day_of_week,
        ))
    });
    let Some((raw, page, config, first_day_of_week)) = inputs else {
        return false;
    };

    store.dispatch(Action::StartProcessing {
        alternative,
        resolution,
    });

    let results = process(&raw, &page, resolution, &config);
    let options = confetti_filter_options(results.clicks.iter().map(|c| &c.click), first_day_of_week);

    store.dispatch(Action::ReceiveProcessedResults {
        alternative,
        resolution,
        snapshot: ProcessedSnapshot {
            results: Rc::new(results),
            page,
            confetti_filter_options: Rc::new(options),
        },
    });
    true
}

/// Forces every resolution of `alternative` to be recomputed and restarts
/// the iframe handshake. The caller reloads the iframe itself.
pub fn refresh_view<D: Dispatch>(store: &mut D, alternative: AlternativeIndex) {
    tracing::info!(alternative, "refreshing heatmap view");
    store.dispatch(Action::MarkOutdated { alternative });
    store.dispatch(Action::ResetIFrame { alternative });
}

/// Drops the raw results of `alternative` so the next load starts over.
/// Returns `false` while a load is still running.
pub fn reload<D: Dispatch>(store: &mut D, alternative: AlternativeIndex) -> bool {
    let status = store.with_state(|state| selectors::raw_status(state, alternative));
    if status.is_in_flight() {
        tracing::debug!(alternative, "reload ignored while loading");
        return false;
    }
    store.dispatch(Action::ResetRawResults { alternative });
    true
}
