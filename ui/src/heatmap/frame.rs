//! Messages exchanged with the overlay renderer running inside the
//! alternative's iframe. Both directions travel as JSON strings through
//! `postMessage` and carry the plugin marker; anything else is foreign.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::confetti::ConfettiType;
use super::types::{AlternativeIndex, OverlayMode, PageData};
use crate::core::config::PLUGIN_MARKER;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("message does not belong to the heatmap overlay")]
    Foreign,
    #[error("malformed frame message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parent → iframe command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FrameCommand {
    ProcessResults,
    RenderResults,
    UpdateIntensity { value: f64 },
    UpdateOpacity { value: f64 },
    UpdateFilter { filter: ConfettiType, disabled: Vec<String> },
}

impl FrameCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameCommand::ProcessResults => "process-results",
            FrameCommand::RenderResults => "render-results",
            FrameCommand::UpdateIntensity { .. } => "update-intensity",
            FrameCommand::UpdateOpacity { .. } => "update-opacity",
            FrameCommand::UpdateFilter { .. } => "update-filter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMessage {
    pub plugin: String,
    pub mode: OverlayMode,
    #[serde(flatten)]
    pub command: FrameCommand,
}

impl FrameMessage {
    pub fn new(mode: OverlayMode, command: FrameCommand) -> Self {
        Self {
            plugin: PLUGIN_MARKER.to_string(),
            mode,
            command,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        ensure_marker(raw)?;
        Ok(serde_json::from_str(raw)?)
    }
}

/// Iframe → parent notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FrameEvent {
    ScriptReady,
    PageReady,
    Layout { page: PageData },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEventMessage {
    pub plugin: String,
    pub alternative: AlternativeIndex,
    #[serde(flatten)]
    pub event: FrameEvent,
}

impl FrameEventMessage {
    pub fn new(alternative: AlternativeIndex, event: FrameEvent) -> Self {
        Self {
            plugin: PLUGIN_MARKER.to_string(),
            alternative,
            event,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        ensure_marker(raw)?;
        Ok(serde_json::from_str(raw)?)
    }
}

/// Checks the plugin marker before committing to a full decode, so traffic
/// from other scripts on the page is dropped cheaply.
fn ensure_marker(raw: &str) -> Result<(), FrameError> {
    #[derive(Deserialize)]
    struct Envelope<'a> {
        #[serde(borrow)]
        plugin: Option<&'a str>,
    }

    match serde_json::from_str::<Envelope<'_>>(raw) {
        Ok(Envelope { plugin: Some(PLUGIN_MARKER) }) => Ok(()),
        _ => Err(FrameError::Foreign),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_are_tagged_and_flat() {
        let message = FrameMessage::new(OverlayMode::Heatmap, FrameCommand::UpdateIntensity { value: 2.5 });
        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({ "plugin": "nelio-ab-testing", "mode": "heatmap", "type": "update-intensity", "value": 2.5 })
        );
    }

    #[test]
    fn parses_filter_update() {
        let raw = json!({
            "plugin": "nelio-ab-testing",
            "mode": "confetti",
            "type": "update-filter",
            "filter": "dayOfWeek",
            "disabled": ["0", "6"],
        })
        .to_string();
        let message = FrameMessage::parse(&raw).unwrap();
        assert_eq!(message.mode, OverlayMode::Confetti);
        assert_eq!(
            message.command,
            FrameCommand::UpdateFilter {
                filter: ConfettiType::DayOfWeek,
                disabled: vec!["0".into(), "6".into()],
            }
        );
    }

    #[test]
    fn foreign_messages_are_rejected() {
        let other = json!({ "plugin": "someone-else", "mode": "heatmap", "type": "render-results" });
        assert!(matches!(FrameMessage::parse(&other.to_string()), Err(FrameError::Foreign)));
        assert!(matches!(FrameMessage::parse("not json"), Err(FrameError::Foreign)));
        assert!(matches!(FrameMessage::parse(r#"{"type":"render-results"}"#), Err(FrameError::Foreign)));
    }

    #[test]
    fn unknown_command_is_malformed() {
        let raw = json!({ "plugin": "nelio-ab-testing", "mode": "heatmap", "type": "explode" });
        assert!(matches!(FrameMessage::parse(&raw.to_string()), Err(FrameError::Malformed(_))));
    }

    #[test]
    fn layout_event_carries_page_data() {
        let raw = json!({
            "plugin": "nelio-ab-testing",
            "alternative": 1,
            "type": "layout",
            "page": {
                "boundingBoxes": { "#cta": { "top": 10, "left": 20, "width": 30, "height": 40 } },
                "dimensions": { "width": 1280, "bodyHeight": 2400, "iframeHeight": 2400 }
            }
        })
        .to_string();
        let message = FrameEventMessage::parse(&raw).unwrap();
        assert_eq!(message.alternative, 1);
        match message.event {
            FrameEvent::Layout { page } => assert_eq!(page.dimensions.body_height, 2400.0),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
