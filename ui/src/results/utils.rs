use crate::{
    core::format::{display_progress, EM_DASH},
    heatmap::{
        HeatmapDataStatus, HeatmapErrorRationale, PartialError, ProcessedResults,
    },
    store::IFrameStatus,
    t,
};

pub(crate) fn status_label(status: HeatmapDataStatus, progress: f64) -> String {
    match status {
        HeatmapDataStatus::Missing => t!("status-missing"),
        HeatmapDataStatus::Loading => t!("status-loading"),
        HeatmapDataStatus::StillLoading => still_loading_label(&t!("status-still-loading"), progress),
        HeatmapDataStatus::Canceling => t!("status-canceling"),
        HeatmapDataStatus::Error(HeatmapErrorRationale::ExperimentNotFound) => {
            t!("status-error-experiment-not-found")
        }
        HeatmapDataStatus::Error(HeatmapErrorRationale::FetchFailed) => t!("status-error-fetch-failed"),
        HeatmapDataStatus::Ready(_) => t!("status-ready"),
    }
}

/// `"<prefix> (45%)"`; the percentage never reads 100 while loading.
pub(crate) fn still_loading_label(prefix: &str, progress: f64) -> String {
    format!("{prefix} ({}%)", display_progress(progress))
}

pub(crate) fn partial_notice(status: HeatmapDataStatus) -> Option<String> {
    match status {
        HeatmapDataStatus::Ready(Some(PartialError::StuckResults)) => Some(t!("notice-stuck-results")),
        HeatmapDataStatus::Ready(Some(PartialError::Unknown)) => Some(t!("notice-partial-unknown")),
        _ => None,
    }
}

pub(crate) fn iframe_notice(status: IFrameStatus) -> Option<String> {
    match status {
        IFrameStatus::WaitingScript => Some(t!("iframe-waiting")),
        IFrameStatus::ScriptNotFound => Some(t!("notice-script-not-found")),
        IFrameStatus::ScriptReady | IFrameStatus::PageReady => None,
    }
}

/// Share of clicks in the busiest grid square, `—` without clicks.
pub(crate) fn top_square_label(results: &ProcessedResults) -> String {
    let grid = &results.clicks_per_square;
    grid.busiest()
        .map(|cell| grid.popularity_label(cell))
        .unwrap_or_else(|| EM_DASH.to_string())
}
