//! Confetti facets: clicks grouped by one piece of visit context.
//!
//! Colors depend only on the facet and its key so the sidebar legend and the
//! dots drawn inside the iframe agree without sharing memory.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::Weekday;

use super::colors::{Rgba, CONFETTI_PALETTE};
use super::types::Click;

const UNKNOWN_KEY: &str = "unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfettiType {
    #[default]
    Browser,
    Os,
    Device,
    Country,
    DayOfWeek,
    HourOfDay,
    TimeToClick,
}

impl ConfettiType {
    pub const ALL: [ConfettiType; 7] = [
        ConfettiType::Browser,
        ConfettiType::Os,
        ConfettiType::Device,
        ConfettiType::Country,
        ConfettiType::DayOfWeek,
        ConfettiType::HourOfDay,
        ConfettiType::TimeToClick,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfettiType::Browser => "browser",
            ConfettiType::Os => "os",
            ConfettiType::Device => "device",
            ConfettiType::Country => "country",
            ConfettiType::DayOfWeek => "dayOfWeek",
            ConfettiType::HourOfDay => "hourOfDay",
            ConfettiType::TimeToClick => "timeToClick",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == raw)
    }

    /// Facets with a closed, ordered set of keys.
    fn is_enumerable(self) -> bool {
        matches!(
            self,
            ConfettiType::DayOfWeek | ConfettiType::HourOfDay | ConfettiType::TimeToClick
        )
    }
}

impl fmt::Display for ConfettiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds (exclusive, milliseconds) of the time-to-click buckets.
const TIME_TO_CLICK_BUCKETS: [(u64, &str, &str); 6] = [
    (5_000, "lt-5s", "< 5s"),
    (10_000, "5s-10s", "5s – 10s"),
    (30_000, "10s-30s", "10s – 30s"),
    (60_000, "30s-1m", "30s – 1min"),
    (300_000, "1m-5m", "1min – 5min"),
    (u64::MAX, "gt-5m", "> 5min"),
];

fn time_to_click_bucket(ms: u64) -> usize {
    TIME_TO_CLICK_BUCKETS
        .iter()
        .position(|(bound, _, _)| ms < *bound)
        .unwrap_or(TIME_TO_CLICK_BUCKETS.len() - 1)
}

fn non_empty(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        UNKNOWN_KEY.to_string()
    } else {
        value.to_string()
    }
}

/// Key of `click` within the `ty` facet.
pub fn facet_key(ty: ConfettiType, click: &Click) -> String {
    let ctx = &click.context;
    match ty {
        ConfettiType::Browser => non_empty(&ctx.browser),
        ConfettiType::Os => non_empty(&ctx.os),
        ConfettiType::Device => non_empty(&ctx.device),
        ConfettiType::Country => non_empty(&ctx.country),
        ConfettiType::DayOfWeek => (ctx.day_of_week % 7).to_string(),
        ConfettiType::HourOfDay => format!("{:02}", ctx.hour_of_day % 24),
        ConfettiType::TimeToClick => TIME_TO_CLICK_BUCKETS[time_to_click_bucket(ctx.time_to_click)]
            .1
            .to_string(),
    }
}

/// Position of an enumerable key in its natural order.
fn ordinal(ty: ConfettiType, key: &str) -> Option<usize> {
    match ty {
        ConfettiType::DayOfWeek | ConfettiType::HourOfDay => key.parse().ok(),
        ConfettiType::TimeToClick => TIME_TO_CLICK_BUCKETS.iter().position(|(_, k, _)| *k == key),
        _ => None,
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Color for a facet key. Same input, same color, on every frame.
pub fn facet_color(ty: ConfettiType, key: &str) -> Rgba {
    let index = match ordinal(ty, key) {
        Some(position) if ty.is_enumerable() => position,
        _ => fnv1a(key.as_bytes()) as usize,
    };
    CONFETTI_PALETTE[index % CONFETTI_PALETTE.len()]
}

fn weekday_from_index(index: u8) -> Weekday {
    Weekday::Sunday.nth_next(index % 7)
}

fn facet_label(ty: ConfettiType, key: &str) -> String {
    match ty {
        ConfettiType::DayOfWeek => key
            .parse::<u8>()
            .map(|day| weekday_from_index(day).to_string())
            .unwrap_or_else(|_| key.to_string()),
        ConfettiType::HourOfDay => format!("{key}:00"),
        ConfettiType::TimeToClick => TIME_TO_CLICK_BUCKETS
            .iter()
            .find(|(_, k, _)| *k == key)
            .map(|(_, _, label)| label.to_string())
            .unwrap_or_else(|| key.to_string()),
        _ => key.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiOption {
    pub key: String,
    pub label: String,
    /// Number of clicks with this key.
    pub value: u32,
    pub color: Rgba,
}

/// Options of every facet, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfettiFilterOptions {
    by_type: BTreeMap<ConfettiType, Vec<ConfettiOption>>,
}

impl ConfettiFilterOptions {
    pub fn get(&self, ty: ConfettiType) -> &[ConfettiOption] {
        self.by_type.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.values().all(Vec::is_empty)
    }
}

/// Sort rank of an enumerable key; days start at `first_day_of_week`.
fn display_rank(ty: ConfettiType, key: &str, first_day_of_week: u8) -> usize {
    let position = ordinal(ty, key).unwrap_or(usize::MAX);
    if ty == ConfettiType::DayOfWeek && position < 7 {
        (position + 7 - usize::from(first_day_of_week % 7)) % 7
    } else {
        position
    }
}

pub fn confetti_filter_options<'a, I>(clicks: I, first_day_of_week: u8) -> ConfettiFilterOptions
where
    I: IntoIterator<Item = &'a Click>,
{
    let mut counts: BTreeMap<ConfettiType, BTreeMap<String, u32>> = BTreeMap::new();
    for click in clicks {
        for ty in ConfettiType::ALL {
            *counts
                .entry(ty)
                .or_default()
                .entry(facet_key(ty, click))
                .or_insert(0) += 1;
        }
    }

    let by_type = counts
        .into_iter()
        .map(|(ty, keys)| {
            let mut options: Vec<ConfettiOption> = keys
                .into_iter()
                .map(|(key, value)| ConfettiOption {
                    label: facet_label(ty, &key),
                    color: facet_color(ty, &key),
                    key,
                    value,
                })
                .collect();

            if ty.is_enumerable() {
                options.sort_by_key(|option| display_rank(ty, &option.key, first_day_of_week));
            } else {
                options.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
            }
            (ty, options)
        })
        .collect();

    ConfettiFilterOptions { by_type }
}
