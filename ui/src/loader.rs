//! Raw result loader: pages through the results of one alternative and
//! drives its [`HeatmapDataStatus`].
//!
//! Pages are requested strictly one after another. Cancelling is
//! cooperative: the request in flight still completes and is merged, then
//! pagination stops.

use std::future::Future;

use api::ResultsPage;

use crate::core::error::LoadError;
use crate::core::platform::sleep_ms;
use crate::heatmap::{
    AlternativeIndex, ExperimentId, HeatmapDataStatus, HeatmapErrorRationale, LoadAttempts, PartialError,
};
use crate::store::{selectors, Action, Dispatch};

/// Where raw result pages come from.
pub trait ResultsSource {
    fn fetch_page(
        &self,
        experiment: ExperimentId,
        alternative: AlternativeIndex,
        page: u32,
    ) -> impl Future<Output = Result<ResultsPage, LoadError>>;
}

/// The results server function.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerResults;

impl ResultsSource for ServerResults {
    async fn fetch_page(
        &self,
        experiment: ExperimentId,
        alternative: AlternativeIndex,
        page: u32,
    ) -> Result<ResultsPage, LoadError> {
        api::fetch_results_page(experiment, alternative, page)
            .await
            .map_err(LoadError::from)
    }
}

impl From<&LoadError> for HeatmapErrorRationale {
    fn from(err: &LoadError) -> Self {
        match err {
            LoadError::ExperimentNotFound => HeatmapErrorRationale::ExperimentNotFound,
            LoadError::Backend(_) => HeatmapErrorRationale::FetchFailed,
        }
    }
}

/// Share of the advertised total received so far, kept below 100 until the
/// load ends.
fn pagination_progress(attempts: &LoadAttempts, total: Option<u64>) -> Option<f64> {
    let total = total.filter(|total| *total > 0)?;
    let received = (attempts.clicks.length + attempts.scrolls.length) as f64;
    Some((received / total as f64 * 100.0).min(99.0))
}

fn finish<D: Dispatch>(store: &mut D, alternative: AlternativeIndex, partial: Option<PartialError>) {
    store.dispatch(Action::SetRawStatus {
        alternative,
        status: HeatmapDataStatus::Ready(partial),
    });
    store.dispatch(Action::SetProgress {
        alternative,
        progress: 100.0,
    });
}

/// Loads every page of `alternative`. A no-op unless the alternative is
/// `missing`: a second call while a load runs, or after it ended, does
/// nothing. Use [`crate::store::reload`] to start over.
pub async fn load_results<D, S>(
    store: &mut D,
    source: &S,
    experiment: ExperimentId,
    alternative: AlternativeIndex,
) where
    D: Dispatch,
    S: ResultsSource,
{
    load_results_with(store, source, experiment, alternative, |_| {}).await;
}

/// [`load_results`], calling `on_page` after each non-empty page merged
/// while more pages remain. The last page is not reported; the caller sees
/// the end of the load itself.
pub async fn load_results_with<D, S, F>(
    store: &mut D,
    source: &S,
    experiment: ExperimentId,
    alternative: AlternativeIndex,
    mut on_page: F,
) where
    D: Dispatch,
    S: ResultsSource,
    F: FnMut(&mut D),
{
    let (status, config) =
        store.with_state(|state| (selectors::raw_status(state, alternative), state.config.clone()));
    if status != HeatmapDataStatus::Missing {
        tracing::debug!(alternative, status = status.as_str(), "results load already handled");
        return;
    }

    tracing::info!(experiment, alternative, "loading heatmap results");
    store.dispatch(Action::SetRawStatus {
        alternative,
        status: HeatmapDataStatus::Loading,
    });

    let mut attempts = LoadAttempts::default();
    let mut page = 0u32;
    let mut stuck = 0u32;

    loop {
        if selectors::raw_status_of(store, alternative) == HeatmapDataStatus::Canceling {
            finish(store, alternative, None);
            return;
        }

        let outcome = source.fetch_page(experiment, alternative, page).await;
        let status = selectors::raw_status_of(store, alternative);

        let batch = match outcome {
            Ok(batch) => batch,
            Err(err) => {
                let received = attempts.clicks.length + attempts.scrolls.length;
                tracing::warn!(experiment, alternative, page, received, "results page failed: {err}");
                if received == 0 && status == HeatmapDataStatus::Loading {
                    store.dispatch(Action::SetRawStatus {
                        alternative,
                        status: HeatmapDataStatus::Error(HeatmapErrorRationale::from(&err)),
                    });
                } else {
                    finish(store, alternative, Some(PartialError::Unknown));
                }
                return;
            }
        };

        attempts.clicks.count += 1;
        attempts.scrolls.count += 1;
        attempts.clicks.length += batch.clicks.len();
        attempts.scrolls.length += batch.scrolls.len();
        let new_records = batch.len();
        let has_more = batch.has_more;
        let total = batch.total;

        store.dispatch(Action::SetLoadAttempts { alternative, attempts });
        store.dispatch(Action::AppendRawResults {
            alternative,
            clicks: batch.clicks,
            scrolls: batch.scrolls,
        });

        if status == HeatmapDataStatus::Canceling || !has_more {
            finish(store, alternative, None);
            return;
        }

        if new_records == 0 {
            stuck += 1;
            if stuck >= config.max_stuck_attempts {
                tracing::warn!(
                    experiment,
                    alternative,
                    page,
                    attempts = stuck,
                    "server keeps reporting more results without sending any"
                );
                finish(store, alternative, Some(PartialError::StuckResults));
                return;
            }
        } else {
            stuck = 0;
            page += 1;
        }

        if let Some(progress) = pagination_progress(&attempts, total) {
            store.dispatch(Action::SetProgress { alternative, progress });
        }
        if status == HeatmapDataStatus::Loading {
            store.dispatch(Action::SetRawStatus {
                alternative,
                status: HeatmapDataStatus::StillLoading,
            });
        }
        if new_records > 0 {
            on_page(store);
        }

        if stuck > 0 {
            sleep_ms(config.retry_delay_ms).await;
        }
    }
}

/// Asks a running load to stop after the page in flight. Only a load that
/// already delivered its first page can be cancelled.
pub fn cancel_loading<D: Dispatch>(store: &mut D, alternative: AlternativeIndex) -> bool {
    let status = selectors::raw_status_of(store, alternative);
    if status != HeatmapDataStatus::StillLoading {
        return false;
    }
    tracing::info!(alternative, "cancelling heatmap results load");
    store.dispatch(Action::SetRawStatus {
        alternative,
        status: HeatmapDataStatus::Canceling,
    });
    true
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use futures::executor::block_on;

    use super::*;
    use crate::core::config::PipelineConfig;
    use crate::heatmap::{Click, VisitContext};
    use crate::store::Store;

    type Shared = Rc<RefCell<Store>>;

    /// Replays canned pages and records what was asked for.
    struct ScriptedSource {
        pages: RefCell<VecDeque<Result<ResultsPage, LoadError>>>,
        requested: RefCell<Vec<u32>>,
        on_fetch: Option<Box<dyn Fn(u32)>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<ResultsPage, LoadError>>) -> Self {
            Self {
                pages: RefCell::new(pages.into()),
                requested: RefCell::new(Vec::new()),
                on_fetch: None,
            }
        }
    }

    impl ResultsSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _experiment: ExperimentId,
            _alternative: AlternativeIndex,
            page: u32,
        ) -> Result<ResultsPage, LoadError> {
            self.requested.borrow_mut().push(page);
            if let Some(hook) = &self.on_fetch {
                hook(page);
            }
            self.pages
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(LoadError::Backend("script exhausted".into())))
        }
    }

    fn clicks(count: usize) -> Vec<Click> {
        (0..count)
            .map(|i| Click {
                xpath: None,
                css_path: None,
                offset_x: 0.0,
                offset_y: 0.0,
                x: i as f64,
                y: i as f64,
                context: VisitContext::default(),
            })
            .collect()
    }

    fn page(count: usize, has_more: bool, total: u64) -> Result<ResultsPage, LoadError> {
        Ok(ResultsPage {
            clicks: clicks(count),
            scrolls: Vec::new(),
            has_more,
            total: Some(total),
        })
    }

    fn store() -> Shared {
        Rc::new(RefCell::new(Store {
            config: PipelineConfig {
                retry_delay_ms: 0,
                ..PipelineConfig::default()
            },
            ..Store::default()
        }))
    }

    fn status(store: &Shared) -> HeatmapDataStatus {
        selectors::raw_status(&store.borrow(), 0)
    }

    /// Shared store that keeps every raw status dispatched through it.
    #[derive(Clone)]
    struct Tracked {
        store: Shared,
        trail: Rc<RefCell<Vec<HeatmapDataStatus>>>,
    }

    impl Tracked {
        fn new() -> Self {
            Self {
                store: store(),
                trail: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn trail(&self) -> Vec<HeatmapDataStatus> {
            self.trail.borrow().clone()
        }

        fn assert_legal_walk(&self) {
            let mut previous = HeatmapDataStatus::Missing;
            for next in self.trail() {
                assert!(
                    previous.can_transition_to(&next),
                    "{} -> {}",
                    previous.as_str(),
                    next.as_str()
                );
                previous = next;
            }
        }
    }

    impl Dispatch for Tracked {
        fn dispatch(&mut self, action: Action) {
            if let Action::SetRawStatus { status, .. } = &action {
                self.trail.borrow_mut().push(*status);
            }
            self.store.dispatch(action);
        }

        fn with_state<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
            self.store.with_state(f)
        }
    }

    #[test]
    fn pages_until_exhausted() {
        let mut shared = store();
        let source = ScriptedSource::new(vec![page(2, true, 5), page(2, true, 5), page(1, false, 5)]);
        block_on(load_results(&mut shared, &source, 7, 0));

        assert_eq!(status(&shared), HeatmapDataStatus::Ready(None));
        assert_eq!(*source.requested.borrow(), vec![0, 1, 2]);
        let raw = selectors::raw_results(&shared.borrow(), 0);
        assert_eq!(raw.results.clicks.len(), 5);
        assert_eq!(raw.progress, 100.0);
        assert_eq!(selectors::load_attempts(&shared.borrow(), 0).clicks.count, 3);
    }

    #[test]
    fn second_call_is_a_no_op() {
        let mut shared = store();
        let source = ScriptedSource::new(vec![page(1, false, 1)]);
        block_on(load_results(&mut shared, &source, 7, 0));
        block_on(load_results(&mut shared, &source, 7, 0));
        assert_eq!(source.requested.borrow().len(), 1);
    }

    #[test]
    fn cancel_during_fetch_merges_then_stops() {
        let mut shared = store();
        let mut source = ScriptedSource::new(vec![page(3, true, 9), page(3, true, 9), page(3, false, 9)]);
        let handle = Rc::clone(&shared);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in_hook = Rc::clone(&seen);
        source.on_fetch = Some(Box::new(move |page| {
            if page == 1 {
                let mut handle = Rc::clone(&handle);
                assert!(cancel_loading(&mut handle, 0));
                seen_in_hook.borrow_mut().push(selectors::raw_status(&handle.borrow(), 0));
            }
        }));

        block_on(load_results(&mut shared, &source, 7, 0));

        assert_eq!(*seen.borrow(), vec![HeatmapDataStatus::Canceling]);
        assert_eq!(status(&shared), HeatmapDataStatus::Ready(None));
        assert_eq!(*source.requested.borrow(), vec![0, 1]);
        assert_eq!(selectors::raw_results(&shared.borrow(), 0).results.clicks.len(), 6);
    }

    #[test]
    fn empty_pages_with_more_advertised_end_as_stuck() {
        let mut shared = store();
        let source = ScriptedSource::new(vec![
            page(2, true, 10),
            page(0, true, 10),
            page(0, true, 10),
            page(0, true, 10),
        ]);
        block_on(load_results(&mut shared, &source, 7, 0));

        assert_eq!(
            status(&shared),
            HeatmapDataStatus::Ready(Some(PartialError::StuckResults))
        );
        assert_eq!(*source.requested.borrow(), vec![0, 1, 1, 1]);
    }

    #[test]
    fn status_walk_follows_the_state_machine() {
        let mut tracked = Tracked::new();
        let source = ScriptedSource::new(vec![page(2, true, 5), page(2, true, 5), page(1, false, 5)]);
        block_on(load_results(&mut tracked, &source, 7, 0));

        assert_eq!(
            tracked.trail(),
            vec![
                HeatmapDataStatus::Loading,
                HeatmapDataStatus::StillLoading,
                HeatmapDataStatus::Ready(None),
            ]
        );
        tracked.assert_legal_walk();
    }

    #[test]
    fn cancel_with_an_empty_page_in_flight_ends_ready() {
        let mut tracked = Tracked::new();
        let mut source = ScriptedSource::new(vec![page(3, true, 9), page(0, true, 9), page(3, false, 9)]);
        let handle = tracked.clone();
        source.on_fetch = Some(Box::new(move |page| {
            if page == 1 {
                let mut handle = handle.clone();
                assert!(cancel_loading(&mut handle, 0));
            }
        }));

        block_on(load_results(&mut tracked, &source, 7, 0));

        assert_eq!(*source.requested.borrow(), vec![0, 1]);
        assert_eq!(status(&tracked.store), HeatmapDataStatus::Ready(None));
        assert_eq!(
            tracked.trail(),
            vec![
                HeatmapDataStatus::Loading,
                HeatmapDataStatus::StillLoading,
                HeatmapDataStatus::Canceling,
                HeatmapDataStatus::Ready(None),
            ]
        );
        tracked.assert_legal_walk();
        assert_eq!(selectors::raw_results(&tracked.store.borrow(), 0).results.clicks.len(), 3);
    }

    #[test]
    fn every_partial_page_is_reported() {
        let mut shared = store();
        let source = ScriptedSource::new(vec![
            page(2, true, 6),
            page(0, true, 6),
            page(2, true, 6),
            page(2, false, 6),
        ]);
        let mut seen = Vec::new();
        block_on(load_results_with(&mut shared, &source, 7, 0, |store| {
            let state = store.borrow();
            seen.push((
                selectors::raw_status(&state, 0),
                selectors::raw_results(&state, 0).results.clicks.len(),
            ));
        }));

        assert_eq!(
            seen,
            vec![
                (HeatmapDataStatus::StillLoading, 2),
                (HeatmapDataStatus::StillLoading, 4),
            ]
        );
        assert_eq!(status(&shared), HeatmapDataStatus::Ready(None));
    }

    #[test]
    fn missing_experiment_is_an_error() {
        let mut shared = store();
        let source = ScriptedSource::new(vec![Err(LoadError::ExperimentNotFound)]);
        block_on(load_results(&mut shared, &source, 404, 0));
        assert_eq!(
            status(&shared),
            HeatmapDataStatus::Error(HeatmapErrorRationale::ExperimentNotFound)
        );
    }

    #[test]
    fn failure_after_data_keeps_partial_results() {
        let mut shared = store();
        let source = ScriptedSource::new(vec![
            page(4, true, 8),
            Err(LoadError::Backend("502".into())),
        ]);
        block_on(load_results(&mut shared, &source, 7, 0));
        assert_eq!(status(&shared), HeatmapDataStatus::Ready(Some(PartialError::Unknown)));
        assert_eq!(selectors::raw_results(&shared.borrow(), 0).results.clicks.len(), 4);
    }

    #[test]
    fn progress_stays_below_completion_while_loading() {
        let attempts = LoadAttempts {
            clicks: crate::heatmap::LoadAttemptsData { count: 1, length: 450 },
            ..LoadAttempts::default()
        };
        assert_eq!(pagination_progress(&attempts, Some(1000)), Some(45.0));
        let attempts = LoadAttempts {
            clicks: crate::heatmap::LoadAttemptsData { count: 3, length: 1200 },
            ..LoadAttempts::default()
        };
        assert_eq!(pagination_progress(&attempts, Some(1000)), Some(99.0));
        assert_eq!(pagination_progress(&attempts, None), None);
    }

    #[test]
    fn cancel_requires_a_running_load() {
        let mut shared = store();
        assert!(!cancel_loading(&mut shared, 0));
    }
}
