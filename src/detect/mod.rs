//! Hand landmark detection
//!
//! The landmark model itself is an external collaborator; this module
//! defines the frame-in/landmarks-out seam and the MediaPipe subprocess
//! implementation behind it.

pub mod mediapipe;

pub use mediapipe::MediaPipeDetector;

use crate::capture::CameraFrame;
use crate::domain::LandmarkSet;

/// Recognized landmark model options
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorOptions {
    /// Cap on simultaneously tracked hands
    pub max_hands: u32,
    /// Speed/accuracy tradeoff tier
    pub model_complexity: u32,
    /// Detection confidence threshold in [0, 1]
    pub min_detection_confidence: f32,
    /// Tracking confidence threshold in [0, 1]
    pub min_tracking_confidence: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            max_hands: 1,
            model_complexity: 1,
            min_detection_confidence: 0.3,
            min_tracking_confidence: 0.3,
        }
    }
}

/// A capability that turns one video frame into zero or more hands
///
/// Implementations may take arbitrarily long per frame; the pump drops
/// frames rather than queueing them while a detection is in flight.
pub trait LandmarkSource: Send {
    fn detect(&mut self, frame: &CameraFrame) -> anyhow::Result<Vec<LandmarkSet>>;
}
