//! JSON dataset served by the results endpoint.
//!
//! Layout: `<root>/<experiment>/<alternative>.json`, each file holding
//! `{ "clicks": [...], "scrolls": [...] }`. A missing experiment folder is an
//! error; a missing alternative file is an empty result set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::{Click, ResultsPage, Scroll};

/// Records of each kind returned per page.
pub const PAGE_SIZE: usize = 500;

const DATA_DIR_ENV: &str = "NAB_HEATMAP_DATA_DIR";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("experiment {0} not found")]
    ExperimentNotFound(u64),
    #[error("unable to read results: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed results file: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
struct StoredResults {
    #[serde(default)]
    clicks: Vec<Click>,
    #[serde(default)]
    scrolls: Vec<Scroll>,
}

/// Dataset root, taken from `NAB_HEATMAP_DATA_DIR` (defaults to `./data`).
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn read_page(
    root: &Path,
    experiment: u64,
    alternative: usize,
    page: u32,
    page_size: usize,
) -> Result<ResultsPage, StorageError> {
    let experiment_dir = root.join(experiment.to_string());
    if !experiment_dir.is_dir() {
        return Err(StorageError::ExperimentNotFound(experiment));
    }

    let path = experiment_dir.join(format!("{alternative}.json"));
    let stored: StoredResults = if path.exists() {
        serde_json::from_str(&fs::read_to_string(&path)?)?
    } else {
        StoredResults::default()
    };

    let start = (page as usize).saturating_mul(page_size);
    let end = start.saturating_add(page_size);
    let has_more = end < stored.clicks.len() || end < stored.scrolls.len();

    Ok(ResultsPage {
        clicks: window(&stored.clicks, start, end),
        scrolls: window(&stored.scrolls, start, end),
        has_more,
        total: Some((stored.clicks.len() + stored.scrolls.len()) as u64),
    })
}

fn window<T: Clone>(items: &[T], start: usize, end: usize) -> Vec<T> {
    if start >= items.len() {
        return Vec::new();
    }
    items[start..end.min(items.len())].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_dataset(root: &Path, experiment: u64, alternative: usize, clicks: usize) {
        let dir = root.join(experiment.to_string());
        fs::create_dir_all(&dir).unwrap();
        let clicks: Vec<_> = (0..clicks)
            .map(|i| json!({ "x": i as f64, "y": 10.0 }))
            .collect();
        let body = json!({ "clicks": clicks, "scrolls": [{ "maxScroll": 900.0 }] });
        fs::write(dir.join(format!("{alternative}.json")), body.to_string()).unwrap();
    }

    #[test]
    fn pages_through_clicks() {
        let root = tempfile::tempdir().unwrap();
        write_dataset(root.path(), 7, 0, 5);

        let first = read_page(root.path(), 7, 0, 0, 2).unwrap();
        assert_eq!(first.clicks.len(), 2);
        assert_eq!(first.scrolls.len(), 1);
        assert!(first.has_more);
        assert_eq!(first.total, Some(6));

        let last = read_page(root.path(), 7, 0, 2, 2).unwrap();
        assert_eq!(last.clicks.len(), 1);
        assert!(last.scrolls.is_empty());
        assert!(!last.has_more);
    }

    #[test]
    fn missing_experiment_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err = read_page(root.path(), 99, 0, 0, PAGE_SIZE).unwrap_err();
        assert!(matches!(err, StorageError::ExperimentNotFound(99)));
    }

    #[test]
    fn missing_alternative_is_empty() {
        let root = tempfile::tempdir().unwrap();
        write_dataset(root.path(), 3, 0, 1);
        let page = read_page(root.path(), 3, 4, 0, PAGE_SIZE).unwrap();
        assert!(page.is_empty());
        assert!(!page.has_more);
    }
}
