//! Error types for the results pipeline.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("experiment not found")]
    ExperimentNotFound,
    #[error("backend request failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("overlay surface unavailable")]
    SurfaceUnavailable,
    #[error("dom operation failed: {0}")]
    Dom(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings unavailable: {0}")]
    Unavailable(String),
    #[error("invalid settings: {0}")]
    Invalid(String),
    #[error("malformed settings: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unable to read settings: {0}")]
    Io(#[from] std::io::Error),
}

impl From<api::ServerFnError> for LoadError {
    fn from(err: api::ServerFnError) -> Self {
        match err {
            api::ServerFnError::ServerError(message)
                if message == api::EXPERIMENT_NOT_FOUND =>
            {
                LoadError::ExperimentNotFound
            }
            other => LoadError::Backend(other.to_string()),
        }
    }
}
