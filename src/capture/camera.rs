//! GStreamer webcam pipeline
//!
//! Pulls RGBA frames from a V4L2 camera through an appsink. The appsink
//! keeps only the most recent buffer (`max-buffers=1, drop=true`), so a
//! slow consumer always sees the latest frame rather than a backlog.

use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use thiserror::Error;

/// Camera acquisition failures surfaced to the user
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera device {0} not found")]
    NotFound(String),
    #[error("permission denied opening camera device {0}")]
    PermissionDenied(String),
    #[error(transparent)]
    Pipeline(#[from] anyhow::Error),
}

/// One captured video frame, tightly packed RGBA
#[derive(Clone, Debug)]
pub struct CameraFrame {
    pub rgba: image::RgbaImage,
}

impl CameraFrame {
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}

/// GStreamer pipeline capturing webcam frames into an appsink
pub struct CameraPipeline {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    width: u32,
    height: u32,
}

impl CameraPipeline {
    /// Build the capture pipeline for a V4L2 device
    pub fn open(device: &str, width: u32, height: u32, framerate: u32) -> Result<Self, CameraError> {
        probe_device(device)?;

        gst::init()
            .context("Failed to initialize GStreamer")
            .map_err(CameraError::Pipeline)?;

        Self::build(device, width, height, framerate).map_err(CameraError::Pipeline)
    }

    fn build(device: &str, width: u32, height: u32, framerate: u32) -> Result<Self> {
        let pipeline = gst::Pipeline::new();

        let source = gst::ElementFactory::make("v4l2src")
            .property("device", device)
            .build()
            .context("Failed to create v4l2src element")?;

        let videoconvert = gst::ElementFactory::make("videoconvert")
            .build()
            .context("Failed to create videoconvert element")?;

        let videoscale = gst::ElementFactory::make("videoscale")
            .build()
            .context("Failed to create videoscale element")?;

        let videorate = gst::ElementFactory::make("videorate")
            .build()
            .context("Failed to create videorate element")?;

        // Raw RGBA at the requested size and rate
        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGBA")
            .field("width", width as i32)
            .field("height", height as i32)
            .field("framerate", gst::Fraction::new(framerate as i32, 1))
            .build();

        let appsink = gst_app::AppSink::builder()
            .name("camera-sink")
            .caps(&caps)
            .max_buffers(1)
            .drop(true)
            .build();
        appsink.set_property("sync", false);

        pipeline.add_many([
            &source,
            &videoconvert,
            &videoscale,
            &videorate,
            appsink.upcast_ref(),
        ])?;

        gst::Element::link_many([
            &source,
            &videoconvert,
            &videoscale,
            &videorate,
            appsink.upcast_ref(),
        ])?;

        Ok(Self {
            pipeline,
            appsink,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Start streaming
    pub fn start(&self) -> Result<()> {
        self.pipeline
            .set_state(gst::State::Playing)
            .context("Failed to start camera pipeline")?;
        log::info!("Camera pipeline playing ({}x{})", self.width, self.height);
        Ok(())
    }

    /// Wait up to `timeout_ms` for the next frame
    ///
    /// Returns `Ok(None)` on timeout so the caller can re-check its stop
    /// flag between frames.
    pub fn pull_frame(&self, timeout_ms: u64) -> Result<Option<CameraFrame>> {
        let Some(sample) = self
            .appsink
            .try_pull_sample(gst::ClockTime::from_mseconds(timeout_ms))
        else {
            return Ok(None);
        };
        frame_from_sample(&sample).map(Some)
    }

    /// Stop streaming and release the device
    pub fn close(&self) {
        if let Err(err) = self.pipeline.set_state(gst::State::Null) {
            log::error!("Failed to shut down camera pipeline: {err}");
        } else {
            log::info!("Camera pipeline stopped");
        }
    }
}

impl Drop for CameraPipeline {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

/// Convert an appsink sample into a tightly packed RGBA frame
fn frame_from_sample(sample: &gst::Sample) -> Result<CameraFrame> {
    let buffer = sample.buffer().context("Sample without buffer")?;
    let caps = sample.caps().context("Sample without caps")?;
    let info = gst_video::VideoInfo::from_caps(caps).context("Unreadable sample caps")?;

    let map = buffer
        .map_readable()
        .context("Failed to map frame buffer for reading")?;

    let width = info.width() as usize;
    let height = info.height() as usize;
    let stride = info.stride()[0] as usize;
    let row_len = width * 4;
    let data = map.as_slice();

    if data.len() < stride * (height - 1) + row_len {
        anyhow::bail!(
            "frame buffer too small: {} bytes for {}x{} stride {}",
            data.len(),
            width,
            height,
            stride
        );
    }

    // Drop any row padding the pipeline may have added
    let mut rgba = Vec::with_capacity(row_len * height);
    for row in 0..height {
        let start = row * stride;
        rgba.extend_from_slice(&data[start..start + row_len]);
    }

    let rgba = image::RgbaImage::from_raw(info.width(), info.height(), rgba)
        .context("Frame buffer does not match caps dimensions")?;
    Ok(CameraFrame { rgba })
}

/// Classify why a device node cannot be used before involving GStreamer
fn probe_device(device: &str) -> Result<(), CameraError> {
    use std::io::ErrorKind;

    if !std::path::Path::new(device).exists() {
        return Err(CameraError::NotFound(device.to_string()));
    }
    match std::fs::OpenOptions::new().read(true).open(device) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::PermissionDenied => {
            Err(CameraError::PermissionDenied(device.to_string()))
        }
        // Anything else is left for the pipeline to report
        Err(err) => {
            log::debug!("probe of {device} returned {err}, deferring to pipeline");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_missing_device_is_not_found() {
        let err = probe_device("/dev/video-does-not-exist").unwrap_err();
        assert!(matches!(err, CameraError::NotFound(_)));
    }

    #[test]
    fn test_camera_error_messages_name_the_device() {
        let err = CameraError::NotFound("/dev/video7".to_string());
        assert!(err.to_string().contains("/dev/video7"));
        let err = CameraError::PermissionDenied("/dev/video0".to_string());
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_camera_frame_dimensions() {
        let frame = CameraFrame {
            rgba: image::RgbaImage::new(8, 6),
        };
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.height(), 6);
    }
}
