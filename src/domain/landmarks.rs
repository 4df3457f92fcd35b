//! Hand landmark data model
//!
//! One detected hand is a fixed, ordered set of 21 normalized 2-D points
//! following the MediaPipe hand-landmark convention (wrist first, then the
//! thumb and finger joints, fingertips last per digit). Coordinates are in
//! [0, 1] relative to the frame, with y growing downward.

use thiserror::Error;

/// Number of points the landmark model reports per hand
pub const LANDMARK_COUNT: usize = 21;

// Landmark indices (MediaPipe hand landmark model convention)
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Bone segments connecting the landmarks, used for the preview overlay
pub const HAND_SKELETON: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC),
    (THUMB_CMC, THUMB_MCP),
    (THUMB_MCP, THUMB_IP),
    (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP),
    (INDEX_MCP, INDEX_PIP),
    (INDEX_PIP, INDEX_DIP),
    (INDEX_DIP, INDEX_TIP),
    (WRIST, MIDDLE_MCP),
    (MIDDLE_MCP, MIDDLE_PIP),
    (MIDDLE_PIP, MIDDLE_DIP),
    (MIDDLE_DIP, MIDDLE_TIP),
    (WRIST, RING_MCP),
    (RING_MCP, RING_PIP),
    (RING_PIP, RING_DIP),
    (RING_DIP, RING_TIP),
    (WRIST, PINKY_MCP),
    (PINKY_MCP, PINKY_PIP),
    (PINKY_PIP, PINKY_DIP),
    (PINKY_DIP, PINKY_TIP),
    (INDEX_MCP, MIDDLE_MCP),
];

/// A single tracked point on the hand, normalized to the frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Malformed landmark input
#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("expected {LANDMARK_COUNT} landmarks, got {0}")]
    InvalidCount(usize),
}

/// One detected hand: exactly 21 landmarks in model order
///
/// The only way to build one is through [`LandmarkSet::from_points`], which
/// rejects any other point count, so downstream code can index freely.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    /// Validate a point list coming out of the detector
    pub fn from_points(points: &[Landmark]) -> Result<Self, LandmarkError> {
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::InvalidCount(points.len()))?;
        Ok(Self { points })
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn thumb_tip(&self) -> Landmark {
        self.points[THUMB_TIP]
    }

    pub fn thumb_base(&self) -> Landmark {
        self.points[THUMB_MCP]
    }

    pub fn index_tip(&self) -> Landmark {
        self.points[INDEX_TIP]
    }

    pub fn middle_tip(&self) -> Landmark {
        self.points[MIDDLE_TIP]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_points(n: usize) -> Vec<Landmark> {
        (0..n).map(|i| Landmark::new(i as f32 * 0.01, 0.5)).collect()
    }

    #[test]
    fn test_from_points_accepts_exactly_21() {
        let set = LandmarkSet::from_points(&flat_points(21)).unwrap();
        assert_eq!(set.points().len(), LANDMARK_COUNT);
        assert_eq!(set.point(WRIST).x, 0.0);
        assert!((set.point(PINKY_TIP).x - 0.20).abs() < 1e-6);
    }

    #[test]
    fn test_from_points_rejects_short_input() {
        let err = LandmarkSet::from_points(&flat_points(20)).unwrap_err();
        assert!(matches!(err, LandmarkError::InvalidCount(20)));
    }

    #[test]
    fn test_from_points_rejects_long_input() {
        let err = LandmarkSet::from_points(&flat_points(22)).unwrap_err();
        assert!(matches!(err, LandmarkError::InvalidCount(22)));
    }

    #[test]
    fn test_named_accessors_match_indices() {
        let mut points = flat_points(21);
        points[THUMB_TIP] = Landmark::new(0.1, 0.2);
        points[THUMB_MCP] = Landmark::new(0.1, 0.4);
        points[INDEX_TIP] = Landmark::new(0.3, 0.3);
        points[MIDDLE_TIP] = Landmark::new(0.4, 0.25);
        let set = LandmarkSet::from_points(&points).unwrap();

        assert_eq!(set.thumb_tip(), Landmark::new(0.1, 0.2));
        assert_eq!(set.thumb_base(), Landmark::new(0.1, 0.4));
        assert_eq!(set.index_tip(), Landmark::new(0.3, 0.3));
        assert_eq!(set.middle_tip(), Landmark::new(0.4, 0.25));
    }

    #[test]
    fn test_skeleton_indices_in_range() {
        for (a, b) in HAND_SKELETON {
            assert!(a < LANDMARK_COUNT);
            assert!(b < LANDMARK_COUNT);
        }
    }
}
