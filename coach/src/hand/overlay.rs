//! Pixel-space landmark projection for the render/overlay sink.

use super::landmarks::{HandSlot, Observation};

/// One landmark projected onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPoint {
    pub slot: HandSlot,
    /// Landmark index (0-20).
    pub landmark: usize,
    pub x: f32,
    pub y: f32,
}

/// Project every landmark of every hand onto a `width` x `height` canvas.
pub fn project(obs: &Observation, width: u32, height: u32) -> Vec<OverlayPoint> {
    let (w, h) = (width as f32, height as f32);
    let slots = [HandSlot::Left, HandSlot::Right];
    obs.hands()
        .iter()
        .zip(slots)
        .flat_map(|(frame, slot)| {
            frame
                .landmarks()
                .iter()
                .enumerate()
                .map(move |(i, lm)| OverlayPoint {
                    slot,
                    landmark: i,
                    x: lm.x * w,
                    y: lm.y * h,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::landmarks::LANDMARK_COUNT;
    use crate::hand::synthetic::palms_together;

    #[test]
    fn test_project_empty() {
        assert!(project(&Observation::empty(0), 640, 480).is_empty());
    }

    #[test]
    fn test_project_scales_to_canvas() {
        let (a, b) = palms_together(0.5, 0.5);
        let obs = Observation::with_hands(0, vec![a.clone(), b]);
        let points = project(&obs, 640, 480);
        assert_eq!(points.len(), 2 * LANDMARK_COUNT);

        let wrist = a.landmarks()[0];
        assert_eq!(points[0].slot, HandSlot::Left);
        assert!((points[0].x - wrist.x * 640.0).abs() < 1e-3);
        assert!((points[0].y - wrist.y * 480.0).abs() < 1e-3);
        assert_eq!(points[LANDMARK_COUNT].slot, HandSlot::Right);
        assert_eq!(points[LANDMARK_COUNT].landmark, 0);
    }
}
