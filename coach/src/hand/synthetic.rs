//! Synthetic hand poses for demos and tests.
//!
//! Builds plausible 21-landmark hands in normalized image space: wrist
//! above the knuckle row, fingers pointing down, palm plane facing ±x.

use std::f32::consts::TAU;

use super::landmarks::{HandFrame, HandLandmark, Landmark, LANDMARK_COUNT};

/// Wrist height above the knuckle row.
const WRIST_RISE: f32 = 0.10;
/// Half-width of the knuckle row (index to pinky along z).
const KNUCKLE_HALF_SPAN: f32 = 0.03;
/// Finger joint drops below the knuckle row: PIP, DIP, tip.
const FINGER_DROPS: [f32; 3] = [0.03, 0.055, 0.075];
/// Horizontal gap between the two palms when pressed together.
const PALM_GAP: f32 = 0.02;

/// Build one hand whose knuckle row is centred on `(x, y)`.
///
/// `mirrored` flips the index/pinky order along z, which flips the palm
/// normal from -x to +x.
pub fn hand(x: f32, y: f32, mirrored: bool) -> HandFrame {
    let side = if mirrored { -1.0 } else { 1.0 };
    let mut points = [Landmark::default(); LANDMARK_COUNT];

    points[HandLandmark::Wrist.index()] = Landmark::new(x, y + WRIST_RISE, 0.0);

    // Knuckle rows spread evenly from index (-span) to pinky (+span).
    for (i, knuckle) in HandLandmark::knuckle_landmarks().iter().enumerate() {
        let t = i as f32 / 3.0;
        let z = side * (-KNUCKLE_HALF_SPAN + 2.0 * KNUCKLE_HALF_SPAN * t);
        let base = knuckle.index();
        points[base] = Landmark::new(x, y, z);
        for (j, drop) in FINGER_DROPS.iter().enumerate() {
            points[base + 1 + j] = Landmark::new(x, y - drop, z);
        }
    }

    // Thumb hangs off the index side, between wrist and knuckles.
    let thumb = [
        (HandLandmark::ThumbCmc, 0.08, 0.035),
        (HandLandmark::ThumbMcp, 0.05, 0.045),
        (HandLandmark::ThumbIp, 0.03, 0.05),
        (HandLandmark::ThumbTip, 0.01, 0.055),
    ];
    for (joint, rise, reach) in thumb {
        points[joint.index()] = Landmark::new(x, y + rise, -side * reach);
    }

    HandFrame::from_array(points)
}

/// Two hands pressed palm to palm around `(cx, cy)`.
pub fn palms_together(cx: f32, cy: f32) -> (HandFrame, HandFrame) {
    let half = PALM_GAP / 2.0;
    (hand(cx - half, cy, false), hand(cx + half, cy, true))
}

/// Two hands facing each other but `gap` apart horizontally.
pub fn palms_apart(cx: f32, cy: f32, gap: f32) -> (HandFrame, HandFrame) {
    let half = gap / 2.0;
    (hand(cx - half, cy, false), hand(cx + half, cy, true))
}

/// Two touching hands whose palms face the same direction.
pub fn palms_same_way(cx: f32, cy: f32) -> (HandFrame, HandFrame) {
    let half = PALM_GAP / 2.0;
    (hand(cx - half, cy, false), hand(cx + half, cy, false))
}

/// Centre of a circular rubbing path at `tick`, advancing `step` radians
/// per tick around `(cx, cy)`.
pub fn circle_point(cx: f32, cy: f32, radius: f32, step: f32, tick: u64) -> (f32, f32) {
    let phase = (step * tick as f32) % TAU;
    (cx + radius * phase.cos(), cy + radius * phase.sin())
}
