use dioxus::logger::tracing::{self, Level};
use dioxus::prelude::*;

use ui::core::config::Settings;
use ui::HeatmapResultsPage;

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    if let Err(err) = dioxus::logger::init(Level::INFO) {
        eprintln!("logger unavailable: {err}");
    }
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    ui::i18n::init();
    let settings = use_hook(|| {
        let settings = Settings::load();
        tracing::info!(
            experiment = settings.experiment,
            alternatives = settings.alternatives.len(),
            "heatmap results page starting"
        );
        if let Some(locale) = &settings.locale {
            if let Err(err) = ui::i18n::set_language(locale) {
                tracing::warn!("unable to switch to locale {locale}: {err}");
            }
        }
        settings
    });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        HeatmapResultsPage { settings }
    }
}
