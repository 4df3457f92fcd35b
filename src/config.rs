//! Configuration persistence for handwave settings

use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use serde::{Deserialize, Serialize};

use crate::detect::DetectorOptions;

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CosmicConfigEntry)]
#[version = 1]
pub struct HandwaveConfig {
    /// V4L2 device to capture from
    pub camera_device: String,
    /// Capture width in pixels
    pub frame_width: u32,
    /// Capture height in pixels
    pub frame_height: u32,
    /// Capture framerate
    pub framerate: u32,
    /// Maximum number of simultaneously tracked hands
    pub max_hands: u32,
    /// Landmark model complexity tier (0 = fastest, 1 = balanced)
    pub model_complexity: u32,
    /// Detection confidence threshold in [0, 1]
    pub min_detection_confidence: f32,
    /// Tracking confidence threshold in [0, 1]
    pub min_tracking_confidence: f32,
    /// Use the corrected thumbs-up rule instead of the literal one
    #[serde(default)]
    pub corrected_thumbs_up: bool,
    /// Speak recognized gestures aloud
    #[serde(default = "default_narration_enabled")]
    pub narration_enabled: bool,
    /// Base URL of the prediction backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
}

fn default_narration_enabled() -> bool {
    true
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

impl HandwaveConfig {
    /// Configuration ID for cosmic-config
    pub const ID: &'static str = "io.github.handwave.Handwave";

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match cosmic_config::Config::new(Self::ID, Self::VERSION) {
            Ok(config) => match Self::get_entry(&config) {
                Ok(entry) => entry,
                Err((errs, entry)) => {
                    log::warn!("Error loading config, using defaults: {:?}", errs);
                    entry
                }
            },
            Err(err) => {
                log::warn!("Could not create config handler: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match cosmic_config::Config::new(Self::ID, Self::VERSION) {
            Ok(config) => {
                if let Err(err) = self.write_entry(&config) {
                    log::error!("Failed to save config: {:?}", err);
                }
            }
            Err(err) => {
                log::error!("Could not create config handler for saving: {:?}", err);
            }
        }
    }

    /// Detector options derived from the current settings
    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            max_hands: self.max_hands,
            model_complexity: self.model_complexity,
            min_detection_confidence: self.min_detection_confidence,
            min_tracking_confidence: self.min_tracking_confidence,
        }
    }
}

impl Default for HandwaveConfig {
    fn default() -> Self {
        Self {
            camera_device: "/dev/video0".to_string(),
            frame_width: 640,
            frame_height: 480,
            framerate: 30,
            // Track a single hand; the classifier only looks at the first
            max_hands: 1,
            model_complexity: 1,
            // Lower thresholds for faster results
            min_detection_confidence: 0.3,
            min_tracking_confidence: 0.3,
            // Preserve the inherited (dead) thumbs-up rule by default
            corrected_thumbs_up: false,
            narration_enabled: default_narration_enabled(),
            backend_url: default_backend_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_detector_contract() {
        let config = HandwaveConfig::default();
        let options = config.detector_options();
        assert_eq!(options.max_hands, 1);
        assert_eq!(options.model_complexity, 1);
        assert!((options.min_detection_confidence - 0.3).abs() < f32::EPSILON);
        assert!((options.min_tracking_confidence - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_literal_rule_is_the_default() {
        assert!(!HandwaveConfig::default().corrected_thumbs_up);
    }
}
