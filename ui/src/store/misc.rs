//! `misc` slice: site preferences and the iframe handshake.

use crate::heatmap::AlternativeIndex;

use super::actions::Action;

/// Handshake progress of the overlay renderer inside one alternative's iframe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IFrameStatus {
    #[default]
    WaitingScript,
    ScriptReady,
    PageReady,
    ScriptNotFound,
}

impl IFrameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IFrameStatus::WaitingScript => "waiting-script",
            IFrameStatus::ScriptReady => "script-ready",
            IFrameStatus::PageReady => "page-ready",
            IFrameStatus::ScriptNotFound => "script-not-found",
        }
    }

    fn can_transition_to(self, next: IFrameStatus) -> bool {
        use IFrameStatus::*;
        matches!(
            (self, next),
            (WaitingScript, ScriptReady | PageReady | ScriptNotFound)
                | (ScriptReady, PageReady)
                | (ScriptNotFound, ScriptReady | PageReady)
                | (PageReady, PageReady)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MiscState {
    /// 0 = Sunday.
    pub first_day_of_week: u8,
    pub iframes: Vec<IFrameStatus>,
}

impl Default for MiscState {
    fn default() -> Self {
        Self {
            first_day_of_week: 1,
            iframes: Vec::new(),
        }
    }
}

impl MiscState {
    pub fn iframe_status(&self, alternative: AlternativeIndex) -> IFrameStatus {
        self.iframes.get(alternative).copied().unwrap_or_default()
    }
}

pub fn reduce(mut state: MiscState, action: &Action) -> MiscState {
    match action {
        Action::SetIFrameStatus { alternative, status } => {
            if state.iframes.len() <= *alternative {
                state.iframes.resize(alternative + 1, IFrameStatus::WaitingScript);
            }
            let current = state.iframes[*alternative];
            if current.can_transition_to(*status) {
                state.iframes[*alternative] = *status;
            } else {
                tracing::debug!(
                    alternative,
                    from = current.as_str(),
                    to = status.as_str(),
                    "ignored iframe status"
                );
            }
        }
        Action::ResetIFrame { alternative } => {
            if let Some(status) = state.iframes.get_mut(*alternative) {
                *status = IFrameStatus::WaitingScript;
            }
        }
        Action::SetFirstDayOfWeek { day } => state.first_day_of_week = day % 7,
        _ => {}
    }
    state
}
