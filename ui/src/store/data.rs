//! `data` slice: raw and processed results per alternative.

use std::rc::Rc;

use crate::heatmap::{
    ByResolution, ConfettiFilterOptions, HeatmapDataStatus, LoadAttempts, PageData,
    ProcessedResults, RawResults, Resolution,
};

use super::actions::Action;

/// Processing status of one alternative at one resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionStatus {
    /// No layout measured yet.
    #[default]
    Missing,
    /// Layout known, never processed.
    Initializing,
    Processing,
    /// Inputs changed since the last run; stale results stay visible.
    Outdated,
    Ready,
}

impl ResolutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionStatus::Missing => "missing",
            ResolutionStatus::Initializing => "initializing",
            ResolutionStatus::Processing => "processing",
            ResolutionStatus::Outdated => "outdated",
            ResolutionStatus::Ready => "ready",
        }
    }
}

/// Output of one processing run, replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedSnapshot {
    pub results: Rc<ProcessedResults>,
    /// Layout the results were computed against.
    pub page: PageData,
    pub confetti_filter_options: Rc<ConfettiFilterOptions>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionResults {
    pub status: ResolutionStatus,
    /// Latest layout reported by the renderer.
    pub page: Option<PageData>,
    /// Present once processing has completed at least once.
    pub processed: Option<ProcessedSnapshot>,
}

impl ResolutionResults {
    fn invalidate(&mut self) {
        self.status = match self.status {
            ResolutionStatus::Missing => ResolutionStatus::Missing,
            ResolutionStatus::Initializing => ResolutionStatus::Initializing,
            ResolutionStatus::Processing | ResolutionStatus::Outdated | ResolutionStatus::Ready => {
                ResolutionStatus::Outdated
            }
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedAlternative {
    pub raw: RawResults,
    pub by_resolution: ByResolution<ResolutionResults>,
    pub load_attempts: LoadAttempts,
}

impl ProcessedAlternative {
    fn invalidate_all(&mut self) {
        for results in self.by_resolution.iter_mut() {
            results.invalidate();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataState {
    pub alternatives: Vec<ProcessedAlternative>,
}

impl DataState {
    pub fn alternative(&self, index: usize) -> Option<&ProcessedAlternative> {
        self.alternatives.get(index)
    }

    /// Entry for `index`, created empty on first access.
    fn alternative_mut(&mut self, index: usize) -> &mut ProcessedAlternative {
        if self.alternatives.len() <= index {
            self.alternatives.resize_with(index + 1, ProcessedAlternative::default);
        }
        &mut self.alternatives[index]
    }
}

pub fn reduce(mut state: DataState, action: &Action) -> DataState {
    match action {
        Action::SetRawStatus { alternative, status } => {
            let entry = state.alternative_mut(*alternative);
            let current = entry.raw.status;
            if current == *status {
                return state;
            }
            if !current.can_transition_to(status) {
                tracing::warn!(
                    alternative,
                    from = current.as_str(),
                    to = status.as_str(),
                    "rejected illegal results status transition"
                );
                return state;
            }
            entry.raw.status = *status;
            if status.is_processable() {
                entry.invalidate_all();
            }
        }

        Action::AppendRawResults {
            alternative,
            clicks,
            scrolls,
        } => {
            let entry = state.alternative_mut(*alternative);
            if clicks.is_empty() && scrolls.is_empty() {
                return state;
            }
            let results = Rc::make_mut(&mut entry.raw.results);
            results.clicks.extend(clicks.iter().cloned());
            results.scrolls.extend(scrolls.iter().cloned());
            entry.invalidate_all();
        }

        Action::SetProgress { alternative, progress } => {
            let entry = state.alternative_mut(*alternative);
            entry.raw.progress = if progress.is_finite() {
                progress.clamp(0.0, 100.0)
            } else {
                0.0
            };
        }

        Action::SetLoadAttempts { alternative, attempts } => {
            state.alternative_mut(*alternative).load_attempts = *attempts;
        }

        Action::ResetRawResults { alternative } => {
            let entry = state.alternative_mut(*alternative);
            entry.raw = RawResults::default();
            entry.load_attempts = LoadAttempts::default();
            entry.invalidate_all();
        }

        Action::SetPageData {
            alternative,
            resolution,
            page,
        } => {
            let results = &mut state.alternative_mut(*alternative).by_resolution[*resolution];
            if results.page.as_ref() == Some(page) {
                return state;
            }
            results.page = Some(page.clone());
            results.status = match results.status {
                ResolutionStatus::Missing | ResolutionStatus::Initializing => ResolutionStatus::Initializing,
                _ => ResolutionStatus::Outdated,
            };
        }

        Action::StartProcessing {
            alternative,
            resolution,
        } => {
            let results = &mut state.alternative_mut(*alternative).by_resolution[*resolution];
            if results.page.is_some() {
                results.status = ResolutionStatus::Processing;
            }
        }

        Action::ReceiveProcessedResults {
            alternative,
            resolution,
            snapshot,
        } => {
            let results = &mut state.alternative_mut(*alternative).by_resolution[*resolution];
            // Inputs that changed mid-run leave the slot outdated.
            results.status = match results.status {
                ResolutionStatus::Outdated => ResolutionStatus::Outdated,
                _ if results.page.as_ref() != Some(&snapshot.page) => ResolutionStatus::Outdated,
                _ => ResolutionStatus::Ready,
            };
            results.processed = Some(snapshot.clone());
        }

        Action::MarkOutdated { alternative } => {
            state.alternative_mut(*alternative).invalidate_all();
        }

        _ => {}
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::{HeatmapErrorRationale, PageDimensions};

    fn page(height: f64) -> PageData {
        PageData {
            dimensions: PageDimensions {
                width: 1280.0,
                body_height: height,
                iframe_height: height,
            },
            ..PageData::default()
        }
    }

    fn snapshot(page: PageData) -> ProcessedSnapshot {
        ProcessedSnapshot {
            results: Rc::new(ProcessedResults::default()),
            page,
            confetti_filter_options: Rc::new(ConfettiFilterOptions::default()),
        }
    }

    fn ready_desktop() -> DataState {
        let mut state = DataState::default();
        for action in [
            Action::SetPageData {
                alternative: 0,
                resolution: Resolution::Desktop,
                page: page(2000.0),
            },
            Action::StartProcessing {
                alternative: 0,
                resolution: Resolution::Desktop,
            },
            Action::ReceiveProcessedResults {
                alternative: 0,
                resolution: Resolution::Desktop,
                snapshot: snapshot(page(2000.0)),
            },
        ] {
            state = reduce(state, &action);
        }
        state
    }

    #[test]
    fn alternatives_are_created_on_access() {
        let state = reduce(
            DataState::default(),
            &Action::SetProgress {
                alternative: 2,
                progress: 10.0,
            },
        );
        assert_eq!(state.alternatives.len(), 3);
        assert_eq!(state.alternatives[0].raw.status, HeatmapDataStatus::Missing);
    }

    #[test]
    fn illegal_status_transitions_are_ignored() {
        let mut state = DataState::default();
        for status in [
            HeatmapDataStatus::Loading,
            HeatmapDataStatus::Ready(None),
            HeatmapDataStatus::Loading,
            HeatmapDataStatus::StillLoading,
            HeatmapDataStatus::Error(HeatmapErrorRationale::FetchFailed),
        ] {
            state = reduce(state, &Action::SetRawStatus { alternative: 0, status });
        }
        assert_eq!(state.alternatives[0].raw.status, HeatmapDataStatus::Ready(None));
    }

    #[test]
    fn layout_change_keeps_stale_results_visible() {
        let state = ready_desktop();
        assert_eq!(
            state.alternatives[0].by_resolution.desktop.status,
            ResolutionStatus::Ready
        );

        let state = reduce(
            state,
            &Action::SetPageData {
                alternative: 0,
                resolution: Resolution::Desktop,
                page: page(2600.0),
            },
        );
        let desktop = &state.alternatives[0].by_resolution.desktop;
        assert_eq!(desktop.status, ResolutionStatus::Outdated);
        assert_eq!(desktop.processed.as_ref().map(|s| s.page.dimensions.body_height), Some(2000.0));
    }

    #[test]
    fn same_layout_is_not_a_change() {
        let state = reduce(
            ready_desktop(),
            &Action::SetPageData {
                alternative: 0,
                resolution: Resolution::Desktop,
                page: page(2000.0),
            },
        );
        assert_eq!(state.alternatives[0].by_resolution.desktop.status, ResolutionStatus::Ready);
    }

    #[test]
    fn new_raw_data_outdates_processed_slots_only() {
        let state = reduce(
            ready_desktop(),
            &Action::AppendRawResults {
                alternative: 0,
                clicks: Vec::new(),
                scrolls: vec![crate::heatmap::Scroll {
                    max_scroll: 300.0,
                    context: Default::default(),
                }],
            },
        );
        let alternative = &state.alternatives[0];
        assert_eq!(alternative.raw.results.scrolls.len(), 1);
        assert_eq!(alternative.by_resolution.desktop.status, ResolutionStatus::Outdated);
        assert_eq!(alternative.by_resolution.tablet.status, ResolutionStatus::Missing);
    }

    #[test]
    fn appending_reuses_the_buffer_unless_shared() {
        let scroll = |depth: f64| crate::heatmap::Scroll {
            max_scroll: depth,
            context: Default::default(),
        };
        let append = |state, depth| {
            reduce(
                state,
                &Action::AppendRawResults {
                    alternative: 0,
                    clicks: Vec::new(),
                    scrolls: vec![scroll(depth)],
                },
            )
        };

        let state = append(DataState::default(), 100.0);
        let before = Rc::as_ptr(&state.alternatives[0].raw.results);
        let state = append(state, 200.0);
        assert_eq!(Rc::as_ptr(&state.alternatives[0].raw.results), before);

        let reader = Rc::clone(&state.alternatives[0].raw.results);
        let state = append(state, 300.0);
        assert_eq!(reader.scrolls.len(), 2);
        assert_eq!(state.alternatives[0].raw.results.scrolls.len(), 3);
    }

    #[test]
    fn reset_clears_raw_results() {
        let mut state = DataState::default();
        state = reduce(
            state,
            &Action::SetRawStatus {
                alternative: 0,
                status: HeatmapDataStatus::Loading,
            },
        );
        state = reduce(
            state,
            &Action::SetRawStatus {
                alternative: 0,
                status: HeatmapDataStatus::Error(HeatmapErrorRationale::ExperimentNotFound),
            },
        );
        state = reduce(state, &Action::ResetRawResults { alternative: 0 });
        assert_eq!(state.alternatives[0].raw, RawResults::default());
    }
}
