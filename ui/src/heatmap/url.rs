//! Public results URL: the alternative's page with the query flags that make
//! the tracking script load the overlay renderer instead of recording.
//!
//! Pipeline values that differ from the defaults travel along, so the
//! renderer buckets and pages exactly like the results page.

use crate::core::config::PipelineConfig;

use super::types::{AlternativeIndex, ExperimentId};

const RESULT_FLAG: &str = "nab-result";
const EXPERIMENT_PARAM: &str = "experiment";
const HEATMAP_PARAM: &str = "heatmap";
const PREVIEW_PARAM: &str = "preview";

/// `(query key, getter, setter)` of every forwarded pipeline value.
type Tuning = (&'static str, fn(&PipelineConfig) -> f64, fn(&mut PipelineConfig, f64));

fn tuning() -> [Tuning; 8] {
    [
        ("nab-point-size", |c| c.point_size, |c, v| c.point_size = v),
        ("nab-row-height", |c| c.row_height, |c, v| c.row_height = v),
        ("nab-max-height", |c| c.max_document_height, |c, v| c.max_document_height = v),
        ("nab-min-intensity", |c| c.min_intensity, |c, v| c.min_intensity = v),
        ("nab-max-intensity", |c| c.max_intensity, |c, v| c.max_intensity = v),
        ("nab-max-stuck", |c| c.max_stuck_attempts as f64, |c, v| c.max_stuck_attempts = v as u32),
        ("nab-retry-delay", |c| c.retry_delay_ms as f64, |c, v| c.retry_delay_ms = v as u64),
        ("nab-resize-debounce", |c| c.resize_debounce_ms as f64, |c, v| c.resize_debounce_ms = v as u32),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsUrl {
    pub experiment: ExperimentId,
    pub alternative: AlternativeIndex,
    pub pipeline: PipelineConfig,
}

impl ResultsUrl {
    pub fn new(experiment: ExperimentId, alternative: AlternativeIndex) -> Self {
        Self {
            experiment,
            alternative,
            pipeline: PipelineConfig::default(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: &PipelineConfig) -> Self {
        self.pipeline = pipeline.clone();
        self
    }

    /// Appends the results query to `base`, keeping any query and fragment
    /// it already has.
    pub fn build(&self, base: &str) -> String {
        let (without_fragment, fragment) = match base.split_once('#') {
            Some((head, tail)) => (head, Some(tail)),
            None => (base, None),
        };
        let separator = if without_fragment.contains('?') {
            if without_fragment.ends_with('?') || without_fragment.ends_with('&') {
                ""
            } else {
                "&"
            }
        } else {
            "?"
        };

        let mut url = format!(
            "{without_fragment}{separator}{RESULT_FLAG}=true&{EXPERIMENT_PARAM}={}&{HEATMAP_PARAM}={}&{PREVIEW_PARAM}=",
            self.experiment, self.alternative
        );
        let defaults = PipelineConfig::default();
        for (key, get, _) in tuning() {
            let value = get(&self.pipeline);
            if value != get(&defaults) {
                url.push_str(&format!("&{key}={value}"));
            }
        }
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }

    /// Reads the results query from a full URL or a bare query string
    /// (`location.search`). `None` unless `nab-result=true` is present.
    pub fn parse(url: &str) -> Option<Self> {
        let query = match url.split_once('?') {
            Some((_, query)) => query,
            None => url,
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut is_result = false;
        let mut experiment = None;
        let mut alternative = None;
        let mut pipeline = PipelineConfig::default();
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                RESULT_FLAG => is_result = value == "true",
                EXPERIMENT_PARAM => experiment = value.parse().ok(),
                HEATMAP_PARAM => alternative = value.parse().ok(),
                _ => {
                    let setter = tuning().into_iter().find(|(name, _, _)| *name == key);
                    if let (Some((_, _, set)), Ok(value)) = (setter, value.parse::<f64>()) {
                        if value.is_finite() && value >= 0.0 {
                            set(&mut pipeline, value);
                        }
                    }
                }
            }
        }

        if !is_result {
            return None;
        }
        pipeline.sanitize();
        Some(Self {
            experiment: experiment?,
            alternative: alternative?,
            pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_on_clean_url() {
        assert_eq!(
            ResultsUrl::new(42, 1).build("https://example.com/landing/"),
            "https://example.com/landing/?nab-result=true&experiment=42&heatmap=1&preview="
        );
    }

    #[test]
    fn keeps_existing_query_and_fragment() {
        assert_eq!(
            ResultsUrl::new(7, 0).build("https://example.com/?p=12#top"),
            "https://example.com/?p=12&nab-result=true&experiment=7&heatmap=0&preview=#top"
        );
    }

    #[test]
    fn parses_what_it_builds() {
        let url = ResultsUrl::new(314, 2).build("https://example.com/shop?lang=es");
        assert_eq!(ResultsUrl::parse(&url), Some(ResultsUrl::new(314, 2)));
        assert_eq!(
            ResultsUrl::parse("?nab-result=true&experiment=5&heatmap=3&preview="),
            Some(ResultsUrl::new(5, 3))
        );
    }

    #[test]
    fn custom_pipeline_reaches_the_frame() {
        let pipeline = PipelineConfig {
            row_height: 80.0,
            max_stuck_attempts: 6,
            min_intensity: 0.5,
            ..PipelineConfig::default()
        };
        let url = ResultsUrl::new(9, 1).with_pipeline(&pipeline).build("https://example.com/");
        assert_eq!(
            url,
            "https://example.com/?nab-result=true&experiment=9&heatmap=1&preview=\
             &nab-row-height=80&nab-min-intensity=0.5&nab-max-stuck=6"
        );
        let parsed = ResultsUrl::parse(&url).unwrap();
        assert_eq!(parsed.pipeline, pipeline);
    }

    #[test]
    fn broken_tuning_keeps_defaults() {
        let parsed = ResultsUrl::parse(
            "?nab-result=true&experiment=1&heatmap=0&nab-row-height=-3&nab-min-intensity=9&nab-point-size=abc",
        )
        .unwrap();
        assert_eq!(parsed.pipeline, PipelineConfig::default());
    }

    #[test]
    fn ignores_regular_visits() {
        assert_eq!(ResultsUrl::parse("https://example.com/?experiment=5&heatmap=1"), None);
        assert_eq!(ResultsUrl::parse("?nab-result=true&experiment=x&heatmap=1"), None);
    }
}
