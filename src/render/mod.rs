//! Preview rendering
//!
//! Landmark overlay drawn onto captured frames with tiny-skia before they
//! are handed to the image widget.

pub mod overlay;
