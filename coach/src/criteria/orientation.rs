//! Palm orientation — are the two palms facing each other?
//!
//! Each palm normal is the cross product of the wrist→index-knuckle and
//! wrist→pinky-knuckle vectors.  Palms pressed together have roughly
//! opposite normals, so their dot product is strongly negative.

use tracing::trace;

use crate::hand::{HandFrame, HandLandmark};

/// Configuration for palm-orientation detection.
#[derive(Debug, Clone)]
pub struct OrientationConfig {
    /// Dot product of the unit normals must be below this.
    pub max_facing_dot: f32,
    /// Cross products shorter than this are degenerate.
    pub min_normal_magnitude: f32,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            max_facing_dot: -0.2,
            min_normal_magnitude: 1e-6,
        }
    }
}

/// Unit palm normal, or `None` when the knuckle vectors are collinear.
pub fn palm_normal(hand: &HandFrame, min_magnitude: f32) -> Option<[f32; 3]> {
    let wrist = hand.landmark(HandLandmark::Wrist);
    let u = wrist.vector_to(&hand.landmark(HandLandmark::IndexMcp));
    let v = wrist.vector_to(&hand.landmark(HandLandmark::PinkyMcp));

    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if !len.is_finite() || len < min_magnitude {
        return None;
    }
    Some([n[0] / len, n[1] / len, n[2] / len])
}

/// Stateless palm-orientation detector.
#[derive(Debug, Clone)]
pub struct OrientationDetector {
    pub config: OrientationConfig,
}

impl OrientationDetector {
    pub fn new(config: OrientationConfig) -> Self {
        Self { config }
    }

    /// Dot product of the two unit palm normals, if both are defined.
    pub fn facing_dot(&self, a: &HandFrame, b: &HandFrame) -> Option<f32> {
        let min = self.config.min_normal_magnitude;
        let na = palm_normal(a, min)?;
        let nb = palm_normal(b, min)?;
        Some(na[0] * nb[0] + na[1] * nb[1] + na[2] * nb[2])
    }

    /// Whether the palms face each other.  A degenerate normal never does.
    pub fn palms_facing(&self, a: &HandFrame, b: &HandFrame) -> bool {
        match self.facing_dot(a, b) {
            Some(dot) => {
                trace!("Palm normal dot {:.3}", dot);
                dot < self.config.max_facing_dot
            }
            None => {
                trace!("Degenerate palm normal");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::synthetic::{hand, palms_same_way, palms_together};
    use crate::hand::{Landmark, LANDMARK_COUNT};

    #[test]
    fn test_normal_is_unit_length() {
        let n = palm_normal(&hand(0.5, 0.5, false), 1e-6).unwrap();
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_palms_together_facing() {
        let det = OrientationDetector::new(OrientationConfig::default());
        let (a, b) = palms_together(0.5, 0.5);
        let dot = det.facing_dot(&a, &b).unwrap();
        assert!((dot + 1.0).abs() < 1e-4);
        assert!(det.palms_facing(&a, &b));
    }

    #[test]
    fn test_same_direction_not_facing() {
        let det = OrientationDetector::new(OrientationConfig::default());
        let (a, b) = palms_same_way(0.5, 0.5);
        let dot = det.facing_dot(&a, &b).unwrap();
        assert!(dot > 0.9);
        assert!(!det.palms_facing(&a, &b));
    }

    #[test]
    fn test_degenerate_hand_is_false() {
        let det = OrientationDetector::new(OrientationConfig::default());
        let flat: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|_| Landmark::new(0.5, 0.5, 0.0))
            .collect();
        let flat = HandFrame::from_landmarks(&flat).unwrap();
        let (_, b) = palms_together(0.5, 0.5);
        assert!(det.facing_dot(&flat, &b).is_none());
        assert!(!det.palms_facing(&flat, &b));
        assert!(!det.palms_facing(&b, &flat));
    }

    #[test]
    fn test_threshold_configurable() {
        let det = OrientationDetector::new(OrientationConfig {
            max_facing_dot: 1.5,
            ..Default::default()
        });
        let (a, b) = palms_same_way(0.5, 0.5);
        assert!(det.palms_facing(&a, &b));
    }
}
