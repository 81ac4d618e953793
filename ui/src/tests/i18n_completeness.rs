use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::heatmap::{ConfettiType, OverlayMode, Resolution};
use crate::i18n::{self, tr_filter, tr_mode, tr_resolution};

const FTL_FILENAME: &str = "nab-heatmap-ui.ftl";

/// Message ids defined at the start of a line (`id = ...`).
fn defined_ids(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .filter(|line| !line.starts_with(' ') && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(id, _)| id.trim())
        .filter(|id| !id.is_empty() && id.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-')))
        .map(str::to_string)
        .collect()
}

/// Literal ids passed to `t!` anywhere under `root`.
fn referenced_ids(root: &Path) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(path) = stack.pop() {
        if path.is_dir() {
            if let Ok(entries) = fs::read_dir(&path) {
                stack.extend(entries.flatten().map(|entry| entry.path()));
            }
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for chunk in content.split("t!(\"").skip(1) {
            if let Some((id, _)) = chunk.split_once('"') {
                if id.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-')) {
                    found.insert(id.to_string());
                }
            }
        }
    }
    found
}

#[test]
fn referenced_keys_exist_in_fallback() {
    let crate_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let fallback = fs::read_to_string(crate_root.join("i18n").join("en-US").join(FTL_FILENAME))
        .expect("fallback FTL readable");
    let defined = defined_ids(&fallback);
    let referenced = referenced_ids(&crate_root.join("src"));

    assert!(referenced.contains("status-still-loading"));
    let missing: Vec<_> = referenced.difference(&defined).collect();
    assert!(missing.is_empty(), "keys missing in en-US: {missing:?}");
}

#[test]
fn every_choice_has_a_distinct_label() {
    i18n::init();
    let modes: BTreeSet<_> = OverlayMode::ALL.into_iter().map(tr_mode).collect();
    let resolutions: BTreeSet<_> = Resolution::ALL.into_iter().map(tr_resolution).collect();
    let filters: BTreeSet<_> = ConfettiType::ALL.into_iter().map(tr_filter).collect();

    assert_eq!(modes.len(), OverlayMode::ALL.len());
    assert_eq!(resolutions.len(), Resolution::ALL.len());
    assert_eq!(filters.len(), ConfettiType::ALL.len());
}
