//! Message types for the application
//!
//! Msg enum with nested sub-enums for organized message handling, plus
//! convenience constructors for the common cases.

use crate::capture::pump::PumpEvent;

/// Camera session lifecycle messages
#[derive(Debug, Clone)]
pub enum SessionMsg {
    /// Start the camera session
    Start,
    /// Stop the camera session and release the device
    Stop,
}

/// Remote prediction trigger messages
#[derive(Debug, Clone)]
pub enum PredictMsg {
    /// Fire the one-shot final prediction request
    Run,
    /// The request finished (error already formatted for display)
    Finished(Result<(), String>),
    /// Probe the backend health endpoint
    CheckBackend,
    /// Health probe finished
    BackendChecked(Result<(), String>),
}

/// Settings messages
#[derive(Debug, Clone)]
pub enum SettingsMsg {
    /// Toggle spoken narration of recognized gestures
    ToggleNarration,
    /// Switch between the literal and corrected thumbs-up rule
    ToggleCorrectedRule,
    /// Update the backend base URL
    SetBackendUrl(String),
}

/// Messages for the application
#[derive(Debug, Clone)]
pub enum Msg {
    /// Session lifecycle messages
    Session(SessionMsg),
    /// Events from the capture/detection pump
    Pump(PumpEvent),
    /// Remote prediction messages
    Predict(PredictMsg),
    /// Settings messages
    Settings(SettingsMsg),
    /// Dismiss the status banner
    DismissBanner,
}

impl Msg {
    pub fn session_start() -> Self {
        Self::Session(SessionMsg::Start)
    }
    pub fn session_stop() -> Self {
        Self::Session(SessionMsg::Stop)
    }
    pub fn predict_run() -> Self {
        Self::Predict(PredictMsg::Run)
    }
    pub fn check_backend() -> Self {
        Self::Predict(PredictMsg::CheckBackend)
    }
    pub fn toggle_narration() -> Self {
        Self::Settings(SettingsMsg::ToggleNarration)
    }
    pub fn toggle_corrected_rule() -> Self {
        Self::Settings(SettingsMsg::ToggleCorrectedRule)
    }
    pub fn set_backend_url(url: String) -> Self {
        Self::Settings(SettingsMsg::SetBackendUrl(url))
    }
}
