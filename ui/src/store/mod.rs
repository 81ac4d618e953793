//! Results store: three pure slices driven by dispatched [`Action`]s.
//!
//! All mutation goes through [`Dispatch::dispatch`]. Side-effect operations
//! in [`actions`] and the loader read state through [`Dispatch::with_state`]
//! and never hold a borrow across a dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;

use crate::core::config::{PipelineConfig, Settings};

pub mod actions;
pub mod data;
pub mod misc;
pub mod selectors;
pub mod ui;

pub use actions::{refresh_view, reload, request_result_processing, Action};
pub use data::{DataState, ProcessedAlternative, ProcessedSnapshot, ResolutionResults, ResolutionStatus};
pub use misc::{IFrameStatus, MiscState};
pub use ui::UiState;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Store {
    pub data: DataState,
    pub ui: UiState,
    pub misc: MiscState,
    pub config: PipelineConfig,
}

impl Store {
    pub fn new(settings: &Settings) -> Self {
        Self {
            data: DataState::default(),
            ui: UiState::new(&settings.pipeline),
            misc: MiscState {
                first_day_of_week: settings.first_day_of_week,
                iframes: vec![IFrameStatus::WaitingScript; settings.alternatives.len()],
            },
            config: settings.pipeline.clone(),
        }
    }

    pub fn apply(&mut self, action: &Action) {
        self.data = data::reduce(std::mem::take(&mut self.data), action);
        self.ui = ui::reduce(std::mem::replace(&mut self.ui, UiState::new(&self.config)), action);
        self.misc = misc::reduce(std::mem::take(&mut self.misc), action);
    }
}

/// Anything that can receive actions and expose the current state.
pub trait Dispatch {
    fn dispatch(&mut self, action: Action);

    fn with_state<R>(&self, f: impl FnOnce(&Store) -> R) -> R;
}

impl Dispatch for Store {
    fn dispatch(&mut self, action: Action) {
        self.apply(&action);
    }

    fn with_state<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(self)
    }
}

impl Dispatch for Rc<RefCell<Store>> {
    fn dispatch(&mut self, action: Action) {
        self.borrow_mut().apply(&action);
    }

    fn with_state<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&self.borrow())
    }
}

impl Dispatch for Signal<Store> {
    fn dispatch(&mut self, action: Action) {
        self.write().apply(&action);
    }

    fn with_state<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&self.peek())
    }
}
