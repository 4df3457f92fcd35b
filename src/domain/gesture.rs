//! Gesture classification from hand landmarks
//!
//! A small set of geometric rules over relative landmark heights. Image
//! coordinates grow downward, so "above" means a smaller y.

use super::landmarks::LandmarkSet;

/// Recognized hand poses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    ThumbsUp,
    PeaceSign,
    Unknown,
}

impl Gesture {
    /// Display label, also used as the narration text
    pub fn label(&self) -> &'static str {
        match self {
            Gesture::ThumbsUp => "Thumbs Up!",
            Gesture::PeaceSign => "Peace Sign!",
            Gesture::Unknown => "Unknown Gesture",
        }
    }
}

/// Which rendition of the thumbs-up rule to apply
///
/// The rule this app inherited compares the index fingertip against itself
/// (`index_tip.y > index_tip.y`), which is always false, so the thumbs-up
/// branch can never fire. `Literal` keeps that behavior; `Corrected`
/// substitutes the comparison the rule was presumably aiming for (index tip
/// not raised above the thumb tip). Selectable at runtime via the
/// `corrected_thumbs_up` config flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThumbsUpRule {
    #[default]
    Literal,
    Corrected,
}

/// Classify one hand. Rules are checked in order; first match wins.
#[allow(clippy::eq_op)]
pub fn classify(hand: &LandmarkSet, rule: ThumbsUpRule) -> Gesture {
    let thumb_tip = hand.thumb_tip();
    let thumb_base = hand.thumb_base();
    let index_tip = hand.index_tip();
    let middle_tip = hand.middle_tip();

    // Thumbs up: thumb raised above its base, index finger not extended
    let index_folded = match rule {
        ThumbsUpRule::Literal => index_tip.y > index_tip.y,
        ThumbsUpRule::Corrected => index_tip.y > thumb_tip.y,
    };
    if thumb_tip.y < thumb_base.y && index_folded {
        return Gesture::ThumbsUp;
    }

    // Peace sign: index and middle fingertips both above the thumb tip
    if index_tip.y < thumb_tip.y && middle_tip.y < thumb_tip.y {
        return Gesture::PeaceSign;
    }

    Gesture::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::landmarks::{
        INDEX_TIP, Landmark, MIDDLE_TIP, THUMB_MCP, THUMB_TIP,
    };

    /// Build a hand where every point sits at y=0.5, then override the four
    /// landmarks the classifier reads.
    fn hand(thumb_tip_y: f32, thumb_base_y: f32, index_tip_y: f32, middle_tip_y: f32) -> LandmarkSet {
        let mut points = vec![Landmark::new(0.5, 0.5); 21];
        points[THUMB_TIP] = Landmark::new(0.4, thumb_tip_y);
        points[THUMB_MCP] = Landmark::new(0.4, thumb_base_y);
        points[INDEX_TIP] = Landmark::new(0.5, index_tip_y);
        points[MIDDLE_TIP] = Landmark::new(0.6, middle_tip_y);
        LandmarkSet::from_points(&points).unwrap()
    }

    #[test]
    fn test_peace_sign_both_fingertips_above_thumb() {
        let hand = hand(0.5, 0.6, 0.3, 0.35);
        assert_eq!(classify(&hand, ThumbsUpRule::Literal), Gesture::PeaceSign);
        assert_eq!(classify(&hand, ThumbsUpRule::Corrected), Gesture::PeaceSign);
    }

    #[test]
    fn test_one_raised_fingertip_is_not_peace() {
        // Middle finger below the thumb tip
        let hand = hand(0.5, 0.6, 0.3, 0.7);
        assert_eq!(classify(&hand, ThumbsUpRule::Corrected), Gesture::Unknown);
    }

    #[test]
    fn test_literal_rule_never_matches_thumbs_up() {
        // Canonical thumbs-up pose: thumb raised, fingers folded below it
        let hand = hand(0.2, 0.5, 0.6, 0.6);
        assert_eq!(classify(&hand, ThumbsUpRule::Literal), Gesture::Unknown);
    }

    #[test]
    fn test_corrected_rule_matches_thumbs_up() {
        let hand = hand(0.2, 0.5, 0.6, 0.6);
        assert_eq!(classify(&hand, ThumbsUpRule::Corrected), Gesture::ThumbsUp);
    }

    #[test]
    fn test_thumb_below_base_is_not_thumbs_up() {
        let hand = hand(0.6, 0.5, 0.7, 0.7);
        assert_eq!(classify(&hand, ThumbsUpRule::Corrected), Gesture::Unknown);
    }

    /// thumb_tip=0.2, thumb_base=0.5, index_tip=0.3, middle_tip=0.25: the
    /// index tip sits below the thumb tip, so this is not a peace sign, and
    /// under the literal rule nothing else can match either.
    #[test]
    fn test_mixed_pose_under_both_rules() {
        let hand = hand(0.2, 0.5, 0.3, 0.25);
        assert_eq!(classify(&hand, ThumbsUpRule::Literal), Gesture::Unknown);
        assert_eq!(classify(&hand, ThumbsUpRule::Corrected), Gesture::ThumbsUp);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Gesture::ThumbsUp.label(), "Thumbs Up!");
        assert_eq!(Gesture::PeaceSign.label(), "Peace Sign!");
        assert_eq!(Gesture::Unknown.label(), "Unknown Gesture");
    }
}
