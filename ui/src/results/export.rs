use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::core::platform;
use crate::heatmap::{ProcessedClick, Resolution};
use crate::t;

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working,
    Done(String),
    Error(String),
}

/// Download the processed clicks of the visible view as CSV.
#[component]
pub fn ClickExportButton(
    clicks: Vec<ProcessedClick>,
    alternative: usize,
    resolution: Resolution,
) -> Element {
    let status = use_signal(|| ExportStatus::Idle);
    let busy = use_signal(|| false);

    let feedback = match &status() {
        ExportStatus::Idle => None,
        ExportStatus::Working => Some(("nab-export__meta".to_string(), t!("export-preparing"))),
        ExportStatus::Done(message) => Some((
            "nab-export__meta nab-export__meta--success".to_string(),
            message.clone(),
        )),
        ExportStatus::Error(err) => Some((
            "nab-export__meta nab-export__meta--error".to_string(),
            format!("⚠️ {err}"),
        )),
    };

    let csv_handler = {
        let export_clicks = clicks.clone();
        let mut status_signal = status;
        let mut busy_signal = busy;
        move |_| {
            if busy_signal() {
                return;
            }
            busy_signal.set(true);
            status_signal.set(ExportStatus::Working);
            let export_clicks = export_clicks.clone();
            #[cfg(target_arch = "wasm32")]
            {
                let mut status_signal = status_signal;
                let mut busy_signal = busy_signal;
                platform::spawn_future(async move {
                    let outcome = perform_csv_export(export_clicks, alternative, resolution).await;
                    match outcome {
                        Ok(message) => status_signal.set(ExportStatus::Done(message)),
                        Err(err) => status_signal.set(ExportStatus::Error(err)),
                    }
                    busy_signal.set(false);
                });
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let outcome = futures::executor::block_on(perform_csv_export(
                    export_clicks,
                    alternative,
                    resolution,
                ));
                match outcome {
                    Ok(message) => status_signal.set(ExportStatus::Done(message)),
                    Err(err) => status_signal.set(ExportStatus::Error(err)),
                }
                busy_signal.set(false);
            }
        }
    };

    rsx! {
        div { class: "nab-export",
            button {
                r#type: "button",
                class: "button",
                disabled: busy() || clicks.is_empty(),
                onclick: csv_handler,
                {t!("action-export-csv")}
            }
            if let Some((class_name, message)) = feedback {
                p { class: "{class_name}", "{message}" }
            }
        }
    }
}

async fn perform_csv_export(
    clicks: Vec<ProcessedClick>,
    alternative: usize,
    resolution: Resolution,
) -> Result<String, String> {
    let csv = build_csv(&clicks);
    let filename = format!(
        "nab-heatmap-{}-{}-{}.csv",
        alternative,
        resolution.as_str(),
        timestamp_slug()
    );
    let delivery = download_bytes(&filename, "text/csv", csv.into_bytes()).await?;
    Ok(match delivery {
        Some(path) => t!("export-done", path = path),
        None => t!("export-downloaded"),
    })
}

pub(crate) fn build_csv(clicks: &[ProcessedClick]) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(clicks.len() + 1);
    rows.push(
        [
            "x",
            "y",
            "anchored",
            "selector",
            "browser",
            "os",
            "device",
            "country",
            "window_width_px",
            "day_of_week",
            "hour_of_day",
            "time_to_click_ms",
            "timestamp",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    );

    for processed in clicks {
        let context = &processed.click.context;
        rows.push(vec![
            format!("{:.0}", processed.x),
            format!("{:.0}", processed.y),
            processed.anchored.to_string(),
            processed.click.anchor().unwrap_or_default().to_string(),
            context.browser.clone(),
            context.os.clone(),
            context.device.clone(),
            context.country.clone(),
            context.window_width_in_px.to_string(),
            context.day_of_week.to_string(),
            context.hour_of_day.to_string(),
            context.time_to_click.to_string(),
            context.timestamp.clone(),
        ]);
    }

    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| escape_csv(&value))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_csv(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let needs_quotes = value.contains(',') || value.contains('"') || value.contains('\n');
    if needs_quotes {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

fn timestamp_slug() -> String {
    use time::{macros::format_description, OffsetDateTime};

    OffsetDateTime::now_utc()
        .format(&format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "export".into())
}

async fn download_bytes(
    filename: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<Option<String>, String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| "Failed to create blob".to_string())?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Unable to create download".to_string())?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("Document unavailable")?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| "Unable to create anchor")?
            .dyn_into()
            .map_err(|_| "Anchor cast failed")?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or("Missing body")?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::fs;
        use std::io::Write;

        let _ = mime;
        let dir = desktop_export_dir()?;
        fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let path = dir.join(filename);
        let mut file = fs::File::create(&path).map_err(|err| err.to_string())?;
        file.write_all(&bytes).map_err(|err| err.to_string())?;
        Ok(Some(path.to_string_lossy().to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Result<std::path::PathBuf, String> {
    if let Some(dir) = std::env::var_os("NAB_HEATMAP_EXPORT_DIR") {
        return Ok(dir.into());
    }
    let dirs = directories::ProjectDirs::from("com", "Nelio", "NabHeatmap")
        .ok_or("Unable to determine export directory")?;
    Ok(dirs.data_dir().join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::{Click, VisitContext};

    fn processed(x: f64, y: f64, browser: &str, xpath: Option<&str>) -> ProcessedClick {
        ProcessedClick {
            x,
            y,
            anchored: xpath.is_some(),
            click: Click {
                xpath: xpath.map(str::to_string),
                css_path: None,
                offset_x: 0.0,
                offset_y: 0.0,
                x,
                y,
                context: VisitContext {
                    browser: browser.into(),
                    ..VisitContext::default()
                },
            },
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_click() {
        let csv = build_csv(&[
            processed(10.4, 20.6, "Firefox", Some("/html/body/div")),
            processed(5.0, 5.0, "Chrome", None),
        ]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("x,y,anchored,selector,browser"));
        assert!(lines[1].starts_with("10,21,true,/html/body/div,Firefox"));
        assert!(lines[2].starts_with("5,5,false,,Chrome"));
    }

    #[test]
    fn csv_values_are_quoted_when_needed() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv(""), "");
    }
}
