use crate::config::ClassifierThresholds;
use crate::landmarks::{joints, HandObservation, LandmarkPoint, LANDMARK_COUNT};
use crate::sample::{Finger, FingerStates};

const CURLING_FINGERS: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

/// Per-frame finger openness from raw landmark geometry. Pure and stateless.
#[derive(Debug, Clone, Default)]
pub struct FingerStateClassifier {
    thresholds: ClassifierThresholds,
}

impl FingerStateClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    pub fn classify(&self, hand: &HandObservation) -> FingerStates {
        self.classify_landmarks(&hand.landmarks)
    }

    /// Returns all-closed for an incomplete skeleton.
    pub fn classify_landmarks(&self, lm: &[LandmarkPoint]) -> FingerStates {
        if lm.len() < LANDMARK_COUNT {
            return FingerStates::CLOSED;
        }

        let mut states = FingerStates::CLOSED;
        states.set(Finger::Thumb, self.thumb_open(lm));

        // Tip above PIP (smaller y) means extended; assumes an upright hand.
        for (finger, (tip, pip)) in CURLING_FINGERS.into_iter().zip(joints::FINGER_TIP_PIP) {
            states.set(finger, lm[tip].y < lm[pip].y);
        }

        states
    }

    /// Thumb is open when the position check passes and at least one of the
    /// distance, extension or straightness signals agrees.
    fn thumb_open(&self, lm: &[LandmarkPoint]) -> bool {
        let t = &self.thresholds;
        let tip = lm[joints::THUMB_TIP];
        let ip = lm[joints::THUMB_IP];
        let mcp = lm[joints::THUMB_MCP];

        let palm_x = (lm[joints::INDEX_MCP].x + lm[joints::PINKY_MCP].x) / 2.0;
        let palm_y = (lm[joints::INDEX_MCP].y + lm[joints::PINKY_MCP].y) / 2.0;
        let distance_open = (tip.x - palm_x).hypot(tip.y - palm_y) > t.thumb_palm_distance;

        let extension_open = (tip.x - mcp.x).abs() > t.thumb_extension_x
            || (tip.y - mcp.y).abs() > t.thumb_extension_y;

        let angle_open = joint_angle_deg(mcp, ip, tip) > t.thumb_straight_angle_deg;

        (distance_open || extension_open || angle_open) && thumb_outward(tip, ip, palm_facing(lm))
    }
}

/// Sign of the 2D cross product (wrist→middle MCP) × (wrist→pinky MCP).
pub fn palm_facing(lm: &[LandmarkPoint]) -> i8 {
    let wrist = lm[joints::WRIST];
    let middle = lm[joints::MIDDLE_MCP];
    let pinky = lm[joints::PINKY_MCP];

    let (v1x, v1y) = (middle.x - wrist.x, middle.y - wrist.y);
    let (v2x, v2y) = (pinky.x - wrist.x, pinky.y - wrist.y);
    if v1x * v2y - v1y * v2x > 0.0 {
        1
    } else {
        -1
    }
}

/// Angle at `b` formed by `a`-`b`-`c`, in degrees. Degenerate segments give 0.
pub fn joint_angle_deg(a: LandmarkPoint, b: LandmarkPoint, c: LandmarkPoint) -> f32 {
    let (v1x, v1y) = (a.x - b.x, a.y - b.y);
    let (v2x, v2y) = (c.x - b.x, c.y - b.y);
    let mag1 = v1x.hypot(v1y);
    let mag2 = v2x.hypot(v2y);
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }
    let cos = ((v1x * v2x + v1y * v2y) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

// Mirror-image hands also flip the palm cross product, so one rule serves both sides.
fn thumb_outward(tip: LandmarkPoint, ip: LandmarkPoint, palm: i8) -> bool {
    if palm > 0 {
        tip.x < ip.x
    } else {
        tip.x > ip.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> LandmarkPoint {
        LandmarkPoint::new(x, y)
    }

    #[test]
    fn test_straight_joint_is_180_degrees() {
        let angle = joint_angle_deg(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_right_angle_joint() {
        let angle = joint_angle_deg(p(0.0, 1.0), p(0.0, 0.0), p(1.0, 0.0));
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_joint_is_zero() {
        assert_eq!(joint_angle_deg(p(0.5, 0.5), p(0.5, 0.5), p(0.7, 0.5)), 0.0);
    }

    #[test]
    fn test_short_skeleton_is_all_closed() {
        let classifier = FingerStateClassifier::default();
        let lm = vec![p(0.5, 0.5); 10];
        assert_eq!(classifier.classify_landmarks(&lm), FingerStates::CLOSED);
    }
}
