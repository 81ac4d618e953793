//! Status of the raw results of one alternative.
//!
//! ```text
//! missing ──▶ loading ──▶ still-loading ──▶ canceling ──▶ ready
//!                │  │          │  │                         ▲
//!                │  └──────────┼──┴────────────▶ ready ─────┘
//!                └─────────────┴───────────────▶ error
//! ```
//!
//! `ready` and `error` are terminal. The only way out is an explicit reload,
//! which resets the alternative to `missing`.

use std::rc::Rc;

use super::types::HeatmapResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatmapErrorRationale {
    ExperimentNotFound,
    FetchFailed,
}

impl HeatmapErrorRationale {
    pub fn as_str(self) -> &'static str {
        match self {
            HeatmapErrorRationale::ExperimentNotFound => "experiment-not-found",
            HeatmapErrorRationale::FetchFailed => "fetch-failed",
        }
    }
}

/// Why a `ready` result may be incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialError {
    Unknown,
    StuckResults,
}

impl PartialError {
    pub fn as_str(self) -> &'static str {
        match self {
            PartialError::Unknown => "unknown",
            PartialError::StuckResults => "stuck-results",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeatmapDataStatus {
    #[default]
    Missing,
    Loading,
    StillLoading,
    Canceling,
    Error(HeatmapErrorRationale),
    Ready(Option<PartialError>),
}

impl HeatmapDataStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeatmapDataStatus::Missing => "missing",
            HeatmapDataStatus::Loading => "loading",
            HeatmapDataStatus::StillLoading => "still-loading",
            HeatmapDataStatus::Canceling => "canceling",
            HeatmapDataStatus::Error(_) => "error",
            HeatmapDataStatus::Ready(_) => "ready",
        }
    }

    /// A pagination sequence is running.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            HeatmapDataStatus::Loading | HeatmapDataStatus::StillLoading | HeatmapDataStatus::Canceling
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, HeatmapDataStatus::Ready(_) | HeatmapDataStatus::Error(_))
    }

    /// Partial data is good enough to process and render; only `missing`,
    /// `loading` and `error` are not.
    pub fn is_processable(&self) -> bool {
        matches!(
            self,
            HeatmapDataStatus::StillLoading | HeatmapDataStatus::Canceling | HeatmapDataStatus::Ready(_)
        )
    }

    pub fn can_transition_to(&self, next: &HeatmapDataStatus) -> bool {
        use HeatmapDataStatus::*;

        match (self, next) {
            (Missing, Loading) => true,
            (Loading, StillLoading | Ready(_) | Error(_)) => true,
            (StillLoading, StillLoading | Canceling | Ready(_) | Error(_)) => true,
            (Canceling, Ready(_)) => true,
            _ => false,
        }
    }
}

/// Fetch bookkeeping for one event kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadAttemptsData {
    /// Pages requested so far.
    pub count: u32,
    /// Records received so far.
    pub length: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadAttempts {
    pub clicks: LoadAttemptsData,
    pub scrolls: LoadAttemptsData,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResults {
    pub results: Rc<HeatmapResults>,
    pub status: HeatmapDataStatus,
    /// Advisory pagination progress, 0–100.
    pub progress: f64,
}
