//! Heatmap domain: raw result types, the status state machine, and the pure
//! processing that turns clicks and scrolls into overlay data.

pub mod colors;
pub mod confetti;
pub mod frame;
pub mod processor;
pub mod status;
pub mod types;
pub mod url;

pub use confetti::{confetti_filter_options, ConfettiFilterOptions, ConfettiOption, ConfettiType};
pub use frame::{FrameCommand, FrameError, FrameEvent, FrameEventMessage, FrameMessage};
pub use processor::{process, ClicksPerSquare, GridCell, ProcessedClick, ProcessedResults, ScrollSummary};
pub use status::{
    HeatmapDataStatus, HeatmapErrorRationale, LoadAttempts, LoadAttemptsData, PartialError, RawResults,
};
pub use types::{
    AlternativeIndex, BoundingBox, ByResolution, Click, ExperimentId, HeatmapResults, OverlayMode, PageData,
    PageDimensions, Resolution, Scroll, VisitContext,
};
pub use url::ResultsUrl;
