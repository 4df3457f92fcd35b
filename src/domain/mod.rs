//! Core domain types: hand landmarks and gesture classification
//!
//! Everything in here is pure and UI-free so it can be tested without a
//! camera or a running detector.

pub mod gesture;
pub mod landmarks;

pub use gesture::{Gesture, ThumbsUpRule, classify};
pub use landmarks::{Landmark, LandmarkError, LandmarkSet};
