//! Translated labels. Locales live in `i18n/<lang>/nab-heatmap-ui.ftl`
//! with `en-US` as the fallback; call [`init`] once before the first [`t!`].
use std::collections::BTreeSet;
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use unic_langid::LanguageIdentifier;

use crate::heatmap::{ConfettiType, OverlayMode, Resolution};

pub use i18n_embed_fl::fl;

/// `fl!` against [`LOADER`]: `t!("summary-clicks", count = 12)`.
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

const DOMAIN: &str = "nab-heatmap-ui";

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let fallback: LanguageIdentifier = "en-US".parse().expect("valid fallback language identifier");
    let loader = FluentLanguageLoader::new(DOMAIN, fallback);
    loader.set_use_isolating(false);
    loader
});

static INIT: Once = Once::new();

/// Picks the best embedded locale for the browser or the OS.
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        if let Err(err) = i18n_embed::select(&*LOADER, &Localizations, &requested) {
            tracing::warn!("no requested locale could be loaded, using en-US: {err}");
        }
    });
}

/// Switches to `tag` (`es-ES` or WordPress' `es_ES`). Unparseable or
/// unavailable tags are ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let tag = tag.replace('_', "-");
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        tracing::debug!(tag, "ignoring unparseable language tag");
        return Ok(());
    };
    if !available_languages().contains(&lang.to_string()) {
        tracing::debug!(tag, "no embedded locale for language tag");
        return Ok(());
    }
    i18n_embed::select(&*LOADER, &Localizations, &[lang]).map(|_| ())
}

/// Embedded locales, sorted.
pub fn available_languages() -> Vec<String> {
    Localizations::iter()
        .filter_map(|path| path.split_once('/').map(|(lang, _)| lang.to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}

/// Sidebar label of an overlay mode.
pub fn tr_mode(mode: OverlayMode) -> String {
    match mode {
        OverlayMode::Heatmap => crate::t!("mode-heatmap"),
        OverlayMode::Scrollmap => crate::t!("mode-scrollmap"),
        OverlayMode::Confetti => crate::t!("mode-confetti"),
    }
}

pub fn tr_resolution(resolution: Resolution) -> String {
    match resolution {
        Resolution::Desktop => crate::t!("resolution-desktop"),
        Resolution::Tablet => crate::t!("resolution-tablet"),
        Resolution::Smartphone => crate::t!("resolution-smartphone"),
    }
}

pub fn tr_filter(filter: ConfettiType) -> String {
    match filter {
        ConfettiType::Browser => crate::t!("filter-browser"),
        ConfettiType::Os => crate::t!("filter-os"),
        ConfettiType::Device => crate::t!("filter-device"),
        ConfettiType::Country => crate::t!("filter-country"),
        ConfettiType::DayOfWeek => crate::t!("filter-day-of-week"),
        ConfettiType::HourOfDay => crate::t!("filter-hour-of-day"),
        ConfettiType::TimeToClick => crate::t!("filter-time-to-click"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::fl;

    #[test]
    fn both_locales_are_embedded() {
        assert_eq!(available_languages(), vec!["en-US".to_string(), "es-ES".to_string()]);
    }

    #[test]
    fn labels_come_from_the_fallback() {
        init();
        assert_eq!(tr_mode(OverlayMode::Scrollmap), fl!(&*LOADER, "mode-scrollmap"));
        assert!(!tr_filter(ConfettiType::TimeToClick).is_empty());
    }

    #[test]
    fn unparseable_tag_keeps_the_current_language() {
        init();
        let before = tr_resolution(Resolution::Tablet);
        assert!(set_language("not a language tag!").is_ok());
        assert_eq!(tr_resolution(Resolution::Tablet), before);
    }
}
