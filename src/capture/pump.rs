//! Frame pump: the capture thread and the detection worker
//!
//! The pump thread owns the camera pipeline and forwards every frame it
//! pulls: once to the detection worker (dropped when the worker is still
//! busy with an earlier frame) and once to the UI as a preview. Analysis is
//! therefore best effort; the pump never waits for a result before pulling
//! the next frame.
//!
//! Every event carries the generation of the session that spawned the
//! pump, so results arriving after a stop can be discarded upstream.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use super::camera::{CameraFrame, CameraPipeline};
use crate::config::HandwaveConfig;
use crate::detect::{LandmarkSource, MediaPipeDetector};
use crate::domain::LandmarkSet;

/// How long one pull waits before re-checking the stop flag
const FRAME_WAIT_MS: u64 = 100;
/// Consecutive capture failures tolerated before giving up
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Events reported by the pump to the UI
#[derive(Clone, Debug)]
pub enum PumpEvent {
    /// Camera and detector are up; the session may go active
    Ready {
        generation: u64,
        width: u32,
        height: u32,
    },
    /// A captured frame for the live preview
    Frame { generation: u64, frame: CameraFrame },
    /// One frame's analysis finished; zero hands is a valid result
    Hands {
        generation: u64,
        hands: Vec<LandmarkSet>,
    },
    /// The pump cannot continue
    Failed { generation: u64, error: String },
    /// The capture thread has exited
    Closed { generation: u64 },
}

/// Handle to a running pump
pub struct PumpHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PumpHandle {
    /// Request shutdown; the capture thread is joined in the background so
    /// the UI does not block on the pipeline teardown.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            std::thread::spawn(move || {
                if thread.join().is_err() {
                    log::error!("Capture thread panicked during shutdown");
                }
            });
        }
    }
}

/// Spawn the capture thread for one session
pub fn spawn(config: HandwaveConfig, generation: u64) -> (PumpHandle, Receiver<PumpEvent>) {
    let stop = Arc::new(AtomicBool::new(false));
    let (events_tx, events_rx) = bounded(16);

    let thread_stop = stop.clone();
    let thread = std::thread::spawn(move || {
        run_pump(config, generation, thread_stop, events_tx);
    });

    (
        PumpHandle {
            stop,
            thread: Some(thread),
        },
        events_rx,
    )
}

fn run_pump(
    config: HandwaveConfig,
    generation: u64,
    stop: Arc<AtomicBool>,
    events: Sender<PumpEvent>,
) {
    let fail = |error: String| {
        log::error!("{error}");
        let _ = events.send(PumpEvent::Failed { generation, error });
    };

    let camera = match CameraPipeline::open(
        &config.camera_device,
        config.frame_width,
        config.frame_height,
        config.framerate,
    ) {
        Ok(camera) => camera,
        Err(err) => return fail(format!("Could not access the webcam: {err}")),
    };
    if let Err(err) = camera.start() {
        return fail(format!("Could not start the webcam: {err:#}"));
    }

    let detector = match MediaPipeDetector::spawn(config.detector_options()) {
        Ok(detector) => detector,
        Err(err) => {
            camera.close();
            return fail(format!("Could not start the hand landmark model: {err:#}"));
        }
    };

    let _ = events.send(PumpEvent::Ready {
        generation,
        width: camera.width(),
        height: camera.height(),
    });

    // Hand-off to the detection worker holds at most one frame
    let (frame_tx, frame_rx) = bounded::<CameraFrame>(1);
    let worker_events = events.clone();
    let worker = std::thread::spawn(move || {
        run_detection_worker(Box::new(detector), frame_rx, worker_events, generation);
    });

    let mut consecutive_errors = 0u32;
    while !stop.load(Ordering::Relaxed) {
        match camera.pull_frame(FRAME_WAIT_MS) {
            Ok(Some(frame)) => {
                consecutive_errors = 0;
                // Analysis is best effort: skip the frame if the worker is busy
                let _ = frame_tx.try_send(frame.clone());
                // Preview is best effort too: skip when the UI is behind
                if events
                    .try_send(PumpEvent::Frame { generation, frame })
                    .is_err()
                {
                    log::trace!("preview frame dropped");
                }
            }
            Ok(None) => {}
            Err(err) => {
                log::error!("Failed to capture frame: {err:#}");
                consecutive_errors += 1;
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    fail(format!("Camera stopped delivering frames: {err:#}"));
                    break;
                }
            }
        }
    }

    camera.close();
    drop(frame_tx);
    if worker.join().is_err() {
        log::error!("Detection worker panicked");
    }
    let _ = events.send(PumpEvent::Closed { generation });
}

/// Detection worker loop: one analysis at a time, results tagged with the
/// session generation. Exits when the frame channel closes.
fn run_detection_worker(
    mut source: Box<dyn LandmarkSource>,
    frames: Receiver<CameraFrame>,
    events: Sender<PumpEvent>,
    generation: u64,
) {
    for frame in frames.iter() {
        match source.detect(&frame) {
            Ok(hands) => {
                if events.send(PumpEvent::Hands { generation, hands }).is_err() {
                    break;
                }
            }
            Err(err) => {
                let _ = events.send(PumpEvent::Failed {
                    generation,
                    error: format!("Hand analysis failed: {err:#}"),
                });
                break;
            }
        }
    }
    log::debug!("Detection worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Landmark;

    struct StubSource {
        hands_per_frame: Vec<LandmarkSet>,
        fail_after: Option<usize>,
        seen: usize,
    }

    impl LandmarkSource for StubSource {
        fn detect(&mut self, _frame: &CameraFrame) -> anyhow::Result<Vec<LandmarkSet>> {
            self.seen += 1;
            if let Some(limit) = self.fail_after {
                if self.seen > limit {
                    anyhow::bail!("stub detector failure");
                }
            }
            Ok(self.hands_per_frame.clone())
        }
    }

    fn test_frame() -> CameraFrame {
        CameraFrame {
            rgba: image::RgbaImage::new(4, 4),
        }
    }

    fn one_hand() -> LandmarkSet {
        LandmarkSet::from_points(&vec![Landmark::new(0.5, 0.5); 21]).unwrap()
    }

    #[test]
    fn test_worker_tags_results_with_generation() {
        let (frame_tx, frame_rx) = bounded(4);
        let (events_tx, events_rx) = bounded(16);

        frame_tx.send(test_frame()).unwrap();
        frame_tx.send(test_frame()).unwrap();
        drop(frame_tx);

        run_detection_worker(
            Box::new(StubSource {
                hands_per_frame: vec![one_hand()],
                fail_after: None,
                seen: 0,
            }),
            frame_rx,
            events_tx,
            7,
        );

        let events: Vec<PumpEvent> = events_rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        for event in events {
            match event {
                PumpEvent::Hands { generation, hands } => {
                    assert_eq!(generation, 7);
                    assert_eq!(hands.len(), 1);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn test_worker_reports_detector_failure_and_stops() {
        let (frame_tx, frame_rx) = bounded(4);
        let (events_tx, events_rx) = bounded(16);

        for _ in 0..3 {
            frame_tx.send(test_frame()).unwrap();
        }
        drop(frame_tx);

        run_detection_worker(
            Box::new(StubSource {
                hands_per_frame: Vec::new(),
                fail_after: Some(1),
                seen: 0,
            }),
            frame_rx,
            events_tx,
            0,
        );

        let events: Vec<PumpEvent> = events_rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], PumpEvent::Hands { .. }));
        match &events[1] {
            PumpEvent::Failed { error, .. } => assert!(error.contains("stub detector failure")),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_worker_passes_empty_results_through() {
        let (frame_tx, frame_rx) = bounded(1);
        let (events_tx, events_rx) = bounded(16);

        frame_tx.send(test_frame()).unwrap();
        drop(frame_tx);

        run_detection_worker(
            Box::new(StubSource {
                hands_per_frame: Vec::new(),
                fail_after: None,
                seen: 0,
            }),
            frame_rx,
            events_tx,
            0,
        );

        let events: Vec<PumpEvent> = events_rx.try_iter().collect();
        assert!(matches!(&events[..], [PumpEvent::Hands { hands, .. }] if hands.is_empty()));
    }
}
