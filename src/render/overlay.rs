//! Hand landmark overlay using tiny-skia
//!
//! Draws the detected skeleton and a dot per landmark onto the RGBA
//! preview frame. Landmark coordinates are normalized; they are scaled to
//! the frame dimensions here.

use image::RgbaImage;
use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::domain::landmarks::{HAND_SKELETON, LandmarkSet};

const DOT_RADIUS: f32 = 5.0;
const BONE_WIDTH: f32 = 2.0;

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(mut pixmap) = Pixmap::from_vec(
        img.as_raw().clone(),
        tiny_skia::IntSize::from_wh(w, h).unwrap(),
    ) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

/// Draw every detected hand onto the frame
pub fn draw_hand_landmarks(img: &mut RgbaImage, hands: &[LandmarkSet]) {
    if hands.is_empty() {
        return;
    }

    let (frame_w, frame_h) = (img.width() as f32, img.height() as f32);

    with_pixmap(img, |pixmap| {
        for hand in hands {
            // Skeleton segments first, dots on top
            let mut bones = PathBuilder::new();
            for (a, b) in HAND_SKELETON {
                let from = hand.point(a);
                let to = hand.point(b);
                bones.move_to(from.x * frame_w, from.y * frame_h);
                bones.line_to(to.x * frame_w, to.y * frame_h);
            }
            if let Some(path) = bones.finish() {
                let mut paint = Paint::default();
                paint.set_color_rgba8(255, 255, 255, 200);
                paint.anti_alias = true;

                let stroke = Stroke {
                    width: BONE_WIDTH,
                    line_cap: LineCap::Round,
                    ..Default::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }

            let mut dots = PathBuilder::new();
            for point in hand.points() {
                dots.push_circle(point.x * frame_w, point.y * frame_h, DOT_RADIUS);
            }
            if let Some(path) = dots.finish() {
                let mut paint = Paint::default();
                paint.set_color_rgba8(220, 30, 30, 255);
                paint.anti_alias = true;
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Landmark;

    fn centered_hand() -> LandmarkSet {
        LandmarkSet::from_points(&vec![Landmark::new(0.5, 0.5); 21]).unwrap()
    }

    fn opaque_black(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn test_dot_lands_on_the_landmark_pixel() {
        let mut img = opaque_black(100, 100);
        draw_hand_landmarks(&mut img, &[centered_hand()]);

        let center = img.get_pixel(50, 50);
        assert!(center[0] > 150, "expected a red dot at the center, got {center:?}");
        // Far corner untouched
        assert_eq!(*img.get_pixel(5, 5), image::Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_no_hands_leaves_the_frame_unchanged() {
        let mut img = opaque_black(32, 32);
        let before = img.clone();
        draw_hand_landmarks(&mut img, &[]);
        assert_eq!(img, before);
    }
}
