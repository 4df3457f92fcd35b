//! Webcam capture: the GStreamer pipeline and the frame pump thread

pub mod camera;
pub mod pump;

pub use camera::{CameraError, CameraFrame, CameraPipeline};
