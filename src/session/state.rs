//! Session state machine and gesture presentation state
//!
//! The session owns everything that must be reset when the camera stops:
//! the lifecycle phase, the generation counter used to discard results from
//! a previous session, and the gesture sink that decides when the label and
//! narration actually change.

use crate::domain::Gesture;

/// Lifecycle of the camera session
///
/// `Starting` covers the window between the start request and the capture
/// pipeline reporting ready; both buttons are disabled while it lasts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Starting,
    Active,
}

/// What the recognized-gesture label currently shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayState {
    #[default]
    WaitingForInput,
    Gesture(Gesture),
}

impl DisplayState {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayState::WaitingForInput => "Waiting for gesture input...",
            DisplayState::Gesture(gesture) => gesture.label(),
        }
    }
}

/// Decides when a classification result changes the label and is narrated
///
/// A frame without a hand switches the display to the waiting state but
/// keeps the previously narrated gesture, so a hand re-entering the frame
/// with the same pose does not narrate again.
#[derive(Debug, Default)]
pub struct GestureSink {
    shown: DisplayState,
    previous: Option<Gesture>,
}

impl GestureSink {
    /// Feed one frame's classification; returns the narration text if the
    /// gesture changed since it was last narrated.
    pub fn observe(&mut self, gesture: Option<Gesture>) -> Option<&'static str> {
        match gesture {
            Some(gesture) => {
                self.shown = DisplayState::Gesture(gesture);
                if self.previous != Some(gesture) {
                    self.previous = Some(gesture);
                    Some(gesture.label())
                } else {
                    None
                }
            }
            None => {
                self.shown = DisplayState::WaitingForInput;
                None
            }
        }
    }

    pub fn shown(&self) -> DisplayState {
        self.shown
    }

    pub fn reset(&mut self) {
        self.shown = DisplayState::WaitingForInput;
        self.previous = None;
    }
}

/// Session controller state
#[derive(Debug, Default)]
pub struct Session {
    pub phase: SessionPhase,
    generation: u64,
    pub sink: GestureSink,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation the current session's pump events must carry
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn can_stop(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Idle → Starting; refused in any other phase
    pub fn begin_start(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.phase = SessionPhase::Starting;
        true
    }

    /// Starting → Active, once the capture pipeline reports ready
    pub fn mark_active(&mut self) -> bool {
        if self.phase != SessionPhase::Starting {
            return false;
        }
        self.phase = SessionPhase::Active;
        true
    }

    /// Return to Idle and invalidate anything still in flight
    pub fn end(&mut self) {
        self.phase = SessionPhase::Idle;
        self.generation += 1;
        self.sink.reset();
    }

    /// Whether an analysis result produced under `generation` may still
    /// mutate UI state. Results from a stopped session never pass.
    pub fn accepts(&self, generation: u64) -> bool {
        self.phase == SessionPhase::Active && generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_only_from_idle() {
        let mut session = Session::new();
        assert!(session.begin_start());
        assert_eq!(session.phase, SessionPhase::Starting);
        // Already starting: a second press is refused
        assert!(!session.begin_start());
        assert!(session.mark_active());
        assert!(!session.begin_start());
    }

    #[test]
    fn test_mark_active_requires_starting() {
        let mut session = Session::new();
        assert!(!session.mark_active());
        session.begin_start();
        assert!(session.mark_active());
        assert!(!session.mark_active());
    }

    #[test]
    fn test_stop_bumps_generation_and_discards_stale_results() {
        let mut session = Session::new();
        session.begin_start();
        session.mark_active();
        let generation = session.generation();
        assert!(session.accepts(generation));

        session.end();
        // A result from the stopped session must not be applied
        assert!(!session.accepts(generation));
        assert_eq!(session.phase, SessionPhase::Idle);

        session.begin_start();
        session.mark_active();
        assert!(session.accepts(session.generation()));
        assert!(!session.accepts(generation));
    }

    #[test]
    fn test_results_not_accepted_before_active() {
        let mut session = Session::new();
        session.begin_start();
        assert!(!session.accepts(session.generation()));
    }

    #[test]
    fn test_sink_narrates_changes_only() {
        let mut sink = GestureSink::default();
        assert_eq!(sink.observe(Some(Gesture::PeaceSign)), Some("Peace Sign!"));
        // Same gesture again: label stays, no second narration
        assert_eq!(sink.observe(Some(Gesture::PeaceSign)), None);
        assert_eq!(sink.shown(), DisplayState::Gesture(Gesture::PeaceSign));
        assert_eq!(sink.observe(Some(Gesture::Unknown)), Some("Unknown Gesture"));
    }

    #[test]
    fn test_sink_no_hand_is_not_a_gesture_change() {
        let mut sink = GestureSink::default();
        sink.observe(Some(Gesture::ThumbsUp));
        assert_eq!(sink.observe(None), None);
        assert_eq!(sink.shown(), DisplayState::WaitingForInput);
        // Hand returns with the same pose: shown again, but not re-narrated
        assert_eq!(sink.observe(Some(Gesture::ThumbsUp)), None);
        assert_eq!(sink.shown(), DisplayState::Gesture(Gesture::ThumbsUp));
    }

    #[test]
    fn test_sink_reset_forgets_previous_gesture() {
        let mut sink = GestureSink::default();
        sink.observe(Some(Gesture::ThumbsUp));
        sink.reset();
        assert_eq!(sink.shown(), DisplayState::WaitingForInput);
        assert_eq!(sink.observe(Some(Gesture::ThumbsUp)), Some("Thumbs Up!"));
    }

    #[test]
    fn test_session_end_resets_sink() {
        let mut session = Session::new();
        session.begin_start();
        session.mark_active();
        session.sink.observe(Some(Gesture::PeaceSign));
        session.end();
        assert_eq!(session.sink.shown(), DisplayState::WaitingForInput);
    }
}
