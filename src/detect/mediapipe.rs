//! MediaPipe hand landmark detection via a Python subprocess
//!
//! The helper script is embedded in the binary and materialized to the
//! cache directory at startup. Frames go to the child as a small binary
//! header plus raw RGBA bytes; results come back as one JSON line per
//! frame. The child prints `READY` once the model is loaded.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use super::{DetectorOptions, LandmarkSource};
use crate::capture::CameraFrame;
use crate::domain::{Landmark, LandmarkSet};

const DETECTOR_SCRIPT: &str = include_str!("../../data/hand_landmarker.py");

/// Hand landmark detector backed by a MediaPipe subprocess
pub struct MediaPipeDetector {
    process: Child,
    stdout_reader: BufReader<std::process::ChildStdout>,
}

impl MediaPipeDetector {
    /// Start the detector subprocess and wait for it to load the model
    pub fn spawn(options: DetectorOptions) -> Result<Self> {
        let script_path = materialize_script()?;

        log::info!(
            "Starting hand landmark detector (max_hands={}, complexity={})",
            options.max_hands,
            options.model_complexity
        );

        let mut process = Command::new("python3")
            .arg(&script_path)
            .arg("--max-hands")
            .arg(options.max_hands.to_string())
            .arg("--model-complexity")
            .arg(options.model_complexity.to_string())
            .arg("--min-detection-confidence")
            .arg(options.min_detection_confidence.to_string())
            .arg("--min-tracking-confidence")
            .arg(options.min_tracking_confidence.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .context("Failed to start detector subprocess. Is python3 with mediapipe installed?")?;

        let stdout = process.stdout.take().context("Failed to get detector stdout")?;
        let mut stdout_reader = BufReader::new(stdout);

        let mut ready_line = String::new();
        stdout_reader
            .read_line(&mut ready_line)
            .context("Failed to read detector ready signal")?;
        if ready_line.trim() != "READY" {
            let _ = process.kill();
            anyhow::bail!("Detector did not signal ready, got: {}", ready_line.trim());
        }

        log::info!("Hand landmark detector ready");

        Ok(Self {
            process,
            stdout_reader,
        })
    }
}

impl LandmarkSource for MediaPipeDetector {
    fn detect(&mut self, frame: &CameraFrame) -> Result<Vec<LandmarkSet>> {
        let stdin = self
            .process
            .stdin
            .as_mut()
            .context("Detector stdin closed")?;

        // Header: width, height, channels as little-endian u32
        stdin.write_all(&frame.width().to_le_bytes())?;
        stdin.write_all(&frame.height().to_le_bytes())?;
        stdin.write_all(&4u32.to_le_bytes())?;
        stdin.write_all(frame.rgba.as_raw())?;
        stdin.flush()?;

        let mut response = String::new();
        self.stdout_reader
            .read_line(&mut response)
            .context("Failed to read detector response")?;
        if response.is_empty() {
            anyhow::bail!("Detector subprocess exited unexpectedly");
        }

        parse_detection_line(&response)
    }
}

impl Drop for MediaPipeDetector {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Write the embedded helper script to the cache directory
fn materialize_script() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("handwave");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;

    let path = dir.join("hand_landmarker.py");
    std::fs::write(&path, DETECTOR_SCRIPT)
        .with_context(|| format!("Failed to write detector script to {}", path.display()))?;
    Ok(path)
}

#[derive(Debug, Deserialize)]
struct LandmarkJson {
    x: f32,
    y: f32,
    #[serde(default)]
    #[allow(dead_code)]
    z: f32,
}

#[derive(Debug, Deserialize)]
struct HandJson {
    handedness: String,
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Debug, Deserialize)]
struct DetectionJson {
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one JSON line of detector output into validated landmark sets
///
/// A hand with a wrong point count is skipped with a warning rather than
/// failing the whole frame.
fn parse_detection_line(line: &str) -> Result<Vec<LandmarkSet>> {
    let result: DetectionJson = serde_json::from_str(line)
        .with_context(|| format!("Unparseable detector output: {}", line.trim()))?;

    if let Some(error) = result.error {
        anyhow::bail!("Detector error: {}", error);
    }

    let mut hands = Vec::new();
    for hand in result.hands {
        let points: Vec<Landmark> = hand
            .landmarks
            .iter()
            .map(|l| Landmark::new(l.x, l.y))
            .collect();
        match LandmarkSet::from_points(&points) {
            Ok(set) => {
                log::debug!(
                    "Hand detected: {} (confidence={:.2})",
                    hand.handedness,
                    hand.score
                );
                hands.push(set);
            }
            Err(err) => log::warn!("Skipping malformed hand: {err}"),
        }
    }
    Ok(hands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_json(points: usize) -> String {
        let landmarks: Vec<String> = (0..points)
            .map(|i| format!(r#"{{"x":0.{i:02},"y":0.5,"z":0.0}}"#))
            .collect();
        format!(
            r#"{{"handedness":"Right","score":0.91,"landmarks":[{}]}}"#,
            landmarks.join(",")
        )
    }

    #[test]
    fn test_parse_single_hand() {
        let line = format!(r#"{{"hands":[{}]}}"#, hand_json(21));
        let hands = parse_detection_line(&line).unwrap();
        assert_eq!(hands.len(), 1);
    }

    #[test]
    fn test_parse_no_hands() {
        let hands = parse_detection_line(r#"{"hands":[]}"#).unwrap();
        assert!(hands.is_empty());
    }

    #[test]
    fn test_malformed_hand_is_skipped() {
        let line = format!(r#"{{"hands":[{},{}]}}"#, hand_json(20), hand_json(21));
        let hands = parse_detection_line(&line).unwrap();
        assert_eq!(hands.len(), 1);
    }

    #[test]
    fn test_detector_error_fails_the_frame() {
        let err = parse_detection_line(r#"{"hands":[],"error":"model crashed"}"#).unwrap_err();
        assert!(err.to_string().contains("model crashed"));
    }

    #[test]
    fn test_garbage_output_fails_the_frame() {
        assert!(parse_detection_line("not json\n").is_err());
    }
}
