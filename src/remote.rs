//! One-shot prediction trigger against the backend service
//!
//! A single GET to `<base>/run_final_prediction`; the backend answers with
//! `{"status": "success"}` or `{"status": ..., "message": ...}`. A non-2xx
//! response or a connection error is a transport failure, distinct from a
//! well-formed response reporting an application failure.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("network response was not ok: {0}")]
    Transport(String),
    #[error("{0}")]
    Application(String),
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Fire the final prediction job and wait for its outcome
pub async fn run_final_prediction(base_url: &str) -> Result<(), TriggerError> {
    let url = endpoint(base_url, "run_final_prediction");
    log::info!("Requesting final prediction: {url}");

    let response = reqwest::get(&url)
        .await
        .map_err(|err| TriggerError::Transport(err.to_string()))?;

    if !response.status().is_success() {
        return Err(TriggerError::Transport(response.status().to_string()));
    }

    let body: PredictionResponse = response
        .json()
        .await
        .map_err(|err| TriggerError::Transport(err.to_string()))?;
    interpret_response(body)
}

/// Probe the backend health endpoint
pub async fn check_health(base_url: &str) -> Result<(), TriggerError> {
    let url = endpoint(base_url, "health");
    let response = reqwest::get(&url)
        .await
        .map_err(|err| TriggerError::Transport(err.to_string()))?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(TriggerError::Transport(response.status().to_string()))
    }
}

/// Open the final prediction page in the default browser
pub fn open_results(base_url: &str) {
    let url = endpoint(base_url, "final_prediction");
    log::info!("Opening prediction results: {url}");
    if let Err(err) = std::process::Command::new("xdg-open").arg(&url).spawn() {
        log::error!("Failed to open {url}: {err}");
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

fn interpret_response(response: PredictionResponse) -> Result<(), TriggerError> {
    if response.status == "success" {
        Ok(())
    } else {
        let message = response
            .message
            .unwrap_or_else(|| format!("backend reported status {:?}", response.status));
        Err(TriggerError::Application(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> PredictionResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_success_response_is_ok() {
        assert!(interpret_response(parse(r#"{"status":"success"}"#)).is_ok());
    }

    #[test]
    fn test_error_response_surfaces_the_message() {
        let err = interpret_response(parse(r#"{"status":"error","message":"no frames"}"#))
            .unwrap_err();
        assert!(matches!(err, TriggerError::Application(_)));
        assert_eq!(err.to_string(), "no frames");
    }

    #[test]
    fn test_error_response_without_message_names_the_status() {
        let err = interpret_response(parse(r#"{"status":"busy"}"#)).unwrap_err();
        assert!(err.to_string().contains("busy"));
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        assert_eq!(
            endpoint("http://127.0.0.1:5000/", "health"),
            "http://127.0.0.1:5000/health"
        );
        assert_eq!(
            endpoint("http://127.0.0.1:5000", "run_final_prediction"),
            "http://127.0.0.1:5000/run_final_prediction"
        );
    }
}
