//! Backend boundary for the heatmap results pipeline.
//!
//! Holds the wire types recorded by the tracking beacon (clicks and scroll
//! samples) and the paginated results endpoint consumed by the loader in the
//! `ui` crate. The endpoint is a Dioxus server function; on the server it
//! pages through the JSON dataset handled by [`storage`].

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

pub mod storage;

pub use dioxus::prelude::ServerFnError;

/// Server error message used when the requested experiment has no data folder.
pub const EXPERIMENT_NOT_FOUND: &str = "experiment-not-found";

/// Contextual metadata shared by clicks and scroll samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitContext {
    pub browser: String,
    pub os: String,
    pub device: String,
    pub country: String,
    pub window_width_in_px: u32,
    /// 0 = Sunday … 6 = Saturday.
    pub day_of_week: u8,
    pub hour_of_day: u8,
    /// Milliseconds between page load and the click.
    pub time_to_click: u64,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

/// One recorded click or tap.
///
/// `x`/`y` are the absolute document coordinates at recording time. When the
/// click landed on a tracked element, `xpath`/`css_path` name it and
/// `offset_x`/`offset_y` give the position inside its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Click {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_path: Option<String>,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub context: VisitContext,
}

impl Click {
    /// Selector used to anchor this click, xpath first.
    pub fn anchor(&self) -> Option<&str> {
        self.xpath
            .as_deref()
            .into_iter()
            .chain(self.css_path.as_deref())
            .find(|selector| !selector.is_empty())
    }
}

/// One scroll-depth sample: the deepest vertical offset reached in a page view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scroll {
    pub max_scroll: f64,
    #[serde(flatten)]
    pub context: VisitContext,
}

/// A page of raw results for one alternative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPage {
    #[serde(default)]
    pub clicks: Vec<Click>,
    #[serde(default)]
    pub scrolls: Vec<Scroll>,
    pub has_more: bool,
    /// Records (clicks + scrolls) the server expects to deliver in total, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl ResultsPage {
    pub fn len(&self) -> usize {
        self.clicks.len() + self.scrolls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetch page `page` (zero based) of the raw results of one alternative.
#[server(FetchResultsPage)]
pub async fn fetch_results_page(
    experiment: u64,
    alternative: usize,
    page: u32,
) -> Result<ResultsPage, ServerFnError> {
    let root = storage::data_dir();
    storage::read_page(&root, experiment, alternative, page, storage::PAGE_SIZE).map_err(|err| {
        tracing::warn!(experiment, alternative, page, "results page unavailable: {err}");
        match err {
            storage::StorageError::ExperimentNotFound(_) => {
                ServerFnError::ServerError(EXPERIMENT_NOT_FOUND.to_string())
            }
            other => ServerFnError::ServerError(other.to_string()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn click_decodes_camel_case_payload() {
        let click: Click = serde_json::from_value(json!({
            "xpath": "/html/body/div[2]",
            "offsetX": 12.0,
            "offsetY": 4.5,
            "x": 300.0,
            "y": 820.0,
            "browser": "Firefox",
            "country": "ES",
            "windowWidthInPx": 1280,
            "dayOfWeek": 3,
            "timeToClick": 5400
        }))
        .unwrap();

        assert_eq!(click.anchor(), Some("/html/body/div[2]"));
        assert_eq!(click.offset_x, 12.0);
        assert_eq!(click.context.window_width_in_px, 1280);
        assert_eq!(click.context.day_of_week, 3);
        assert_eq!(click.context.os, "");
    }

    #[test]
    fn anchor_falls_back_to_css_path() {
        let click: Click = serde_json::from_value(json!({
            "xpath": "",
            "cssPath": "#hero > a",
            "x": 1.0,
            "y": 2.0
        }))
        .unwrap();
        assert_eq!(click.anchor(), Some("#hero > a"));
    }

    #[test]
    fn page_without_optional_fields_decodes() {
        let page: ResultsPage = serde_json::from_value(json!({ "hasMore": false })).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total, None);
    }
}
