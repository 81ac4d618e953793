//! Formatting helpers for presenting results.

/// Placeholder shown when a value cannot be computed.
pub const EM_DASH: &str = "—";

/// `part / total` as a whole percentage label. An empty total renders `0%`;
/// non-finite input renders an em-dash.
pub fn format_share(part: f64, total: f64) -> String {
    if !part.is_finite() || !total.is_finite() || total < 0.0 {
        return EM_DASH.to_string();
    }
    if total == 0.0 {
        return "0%".to_string();
    }
    format_percent(part / total)
}

/// Ratio in `[0, 1]` as a whole percentage label.
pub fn format_percent(ratio: f64) -> String {
    if !ratio.is_finite() {
        return EM_DASH.to_string();
    }
    format!("{:.0}%", (ratio * 100.0).clamp(0.0, 100.0))
}

/// Progress shown while more pages are being fetched. Values at or above 100
/// are capped at 99 because the load is not finished yet.
pub fn display_progress(progress: f64) -> u8 {
    if !progress.is_finite() || progress <= 0.0 {
        return 0;
    }
    progress.floor().min(99.0) as u8
}

pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        EM_DASH.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_of_empty_total_is_zero_percent() {
        assert_eq!(format_share(0.0, 0.0), "0%");
        assert_eq!(format_share(f64::NAN, 3.0), EM_DASH);
    }

    #[test]
    fn share_rounds_to_whole_percent() {
        assert_eq!(format_share(1.0, 3.0), "33%");
        assert_eq!(format_share(3.0, 3.0), "100%");
    }

    #[test]
    fn progress_caps_below_completion() {
        assert_eq!(display_progress(45.0), 45);
        assert_eq!(display_progress(100.0), 99);
        assert_eq!(display_progress(180.0), 99);
        assert_eq!(display_progress(f64::NAN), 0);
    }
}
