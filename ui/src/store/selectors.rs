use crate::heatmap::{AlternativeIndex, HeatmapDataStatus, LoadAttempts, RawResults, Resolution};

use super::data::{ProcessedSnapshot, ResolutionStatus};
use super::misc::IFrameStatus;
use super::{Dispatch, Store};

pub fn raw_results(state: &Store, alternative: AlternativeIndex) -> RawResults {
    state
        .data
        .alternative(alternative)
        .map(|entry| entry.raw.clone())
        .unwrap_or_default()
}

pub fn raw_status(state: &Store, alternative: AlternativeIndex) -> HeatmapDataStatus {
    state
        .data
        .alternative(alternative)
        .map(|entry| entry.raw.status)
        .unwrap_or_default()
}

/// [`raw_status`] through a dispatcher, for code that holds one across awaits.
pub fn raw_status_of<D: Dispatch>(store: &D, alternative: AlternativeIndex) -> HeatmapDataStatus {
    store.with_state(|state| raw_status(state, alternative))
}

pub fn load_attempts(state: &Store, alternative: AlternativeIndex) -> LoadAttempts {
    state
        .data
        .alternative(alternative)
        .map(|entry| entry.load_attempts)
        .unwrap_or_default()
}

pub fn resolution_status(
    state: &Store,
    alternative: AlternativeIndex,
    resolution: Resolution,
) -> ResolutionStatus {
    state
        .data
        .alternative(alternative)
        .map(|entry| entry.by_resolution[resolution].status)
        .unwrap_or_default()
}

/// Latest processed results, possibly stale.
pub fn processed(
    state: &Store,
    alternative: AlternativeIndex,
    resolution: Resolution,
) -> Option<ProcessedSnapshot> {
    state
        .data
        .alternative(alternative)
        .and_then(|entry| entry.by_resolution[resolution].processed.clone())
}

pub fn active_processed(state: &Store) -> Option<ProcessedSnapshot> {
    processed(state, state.ui.active_alternative, state.ui.resolution)
}

pub fn iframe_status(state: &Store, alternative: AlternativeIndex) -> IFrameStatus {
    state.misc.iframe_status(alternative)
}

/// Raw data is usable, a layout is known, and the slot is neither running
/// nor fresh.
pub fn should_process(state: &Store, alternative: AlternativeIndex, resolution: Resolution) -> bool {
    let Some(entry) = state.data.alternative(alternative) else {
        return false;
    };
    if !entry.raw.status.is_processable() {
        return false;
    }
    let slot = &entry.by_resolution[resolution];
    slot.page.is_some()
        && matches!(
            slot.status,
            ResolutionStatus::Initializing | ResolutionStatus::Outdated
        )
}
