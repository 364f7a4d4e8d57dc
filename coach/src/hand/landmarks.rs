//! Hand landmark data structures and ingestion-boundary validation.
//!
//! Models the 21 landmarks per hand produced by the upstream detector.
//! Frames are validated once when an `Observation` is built, so the
//! criterion evaluators can index landmarks directly.

use std::fmt;

use tracing::debug;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks emitted by the detector, in array order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for logs and s-expressions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// Knuckle (MCP) landmarks, index finger first.
    pub fn knuckle_landmarks() -> [HandLandmark; 4] {
        [Self::IndexMcp, Self::MiddleMcp, Self::RingMcp, Self::PinkyMcp]
    }
}

// ── Hand slot ──────────────────────────────────────────────

/// Position of a hand in the detector's output array.
///
/// Slot order is whatever the detector supplies; it is not an anatomical
/// left/right guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandSlot {
    Left,
    Right,
}

impl HandSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

// ── Landmark ───────────────────────────────────────────────

/// A single landmark in normalized image/depth space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another landmark.
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Vector from `self` to `other`.
    pub fn vector_to(&self, other: &Landmark) -> [f32; 3] {
        [other.x - self.x, other.y - self.y, other.z - self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ── Frame errors ───────────────────────────────────────────

/// Reasons a detector hand is rejected at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// The detector produced the wrong number of landmarks.
    WrongLandmarkCount { got: usize },
    /// A landmark coordinate was NaN or infinite.
    NonFiniteCoordinate { index: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLandmarkCount { got } => {
                write!(f, "expected {} landmarks, got {}", LANDMARK_COUNT, got)
            }
            Self::NonFiniteCoordinate { index } => {
                write!(f, "landmark {} has a non-finite coordinate", index)
            }
        }
    }
}

impl std::error::Error for FrameError {}

// ── Hand frame ─────────────────────────────────────────────

/// Validated landmark set for one tracked hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    /// Validate raw detector output into a frame.
    ///
    /// `points` must contain exactly 21 finite landmarks.
    pub fn from_landmarks(points: &[Landmark]) -> Result<Self, FrameError> {
        if points.len() != LANDMARK_COUNT {
            return Err(FrameError::WrongLandmarkCount { got: points.len() });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(FrameError::NonFiniteCoordinate { index });
        }
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks.copy_from_slice(points);
        Ok(Self { landmarks })
    }

    /// Frame from a landmark array that is known to be finite.
    pub(crate) fn from_array(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn landmark(&self, which: HandLandmark) -> Landmark {
        self.landmarks[which.index()]
    }

    /// Landmark by raw index; `None` when the index is out of range.
    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.landmarks.get(index).copied()
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Copy of this frame shifted by `(dx, dy, dz)`.
    pub fn translated(&self, dx: f32, dy: f32, dz: f32) -> Self {
        let mut landmarks = self.landmarks;
        for lm in &mut landmarks {
            lm.x += dx;
            lm.y += dy;
            lm.z += dz;
        }
        Self { landmarks }
    }
}

// ── Observation ────────────────────────────────────────────

/// Maximum number of hands considered per observation.
pub const MAX_HANDS: usize = 2;

/// One detector result: zero, one, or two validated hands at a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: u64,
    hands: Vec<HandFrame>,
}

impl Observation {
    /// Observation with no hands.
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            hands: Vec::new(),
        }
    }

    /// Observation from already-validated frames.  Extra hands past the
    /// second slot are ignored.
    pub fn with_hands(timestamp_ms: u64, mut hands: Vec<HandFrame>) -> Self {
        hands.truncate(MAX_HANDS);
        Self {
            timestamp_ms,
            hands,
        }
    }

    /// Build an observation from raw detector landmark arrays.
    ///
    /// Hands that fail validation are dropped, so a two-hand detection with
    /// one degenerate hand becomes a one-hand observation.
    pub fn from_raw(timestamp_ms: u64, raw_hands: &[Vec<Landmark>]) -> Self {
        let mut hands = Vec::with_capacity(MAX_HANDS);
        for (i, raw) in raw_hands.iter().enumerate() {
            if hands.len() == MAX_HANDS {
                debug!(
                    "Observation at {}ms: ignoring {} extra hand(s)",
                    timestamp_ms,
                    raw_hands.len() - i
                );
                break;
            }
            match HandFrame::from_landmarks(raw) {
                Ok(frame) => hands.push(frame),
                Err(e) => debug!("Observation at {}ms: dropping hand {}: {}", timestamp_ms, i, e),
            }
        }
        Self {
            timestamp_ms,
            hands,
        }
    }

    pub fn hands(&self) -> &[HandFrame] {
        &self.hands
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }

    /// Hand in a detector slot, if present.
    pub fn hand(&self, slot: HandSlot) -> Option<&HandFrame> {
        match slot {
            HandSlot::Left => self.hands.first(),
            HandSlot::Right => self.hands.get(1),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_points(n: usize) -> Vec<Landmark> {
        (0..n).map(|i| Landmark::new(i as f32 * 0.01, 0.5, 0.0)).collect()
    }

    #[test]
    fn test_landmark_count() {
        assert_eq!(HandLandmark::Wrist.index(), 0);
        assert_eq!(HandLandmark::IndexMcp.index(), 5);
        assert_eq!(HandLandmark::MiddleMcp.index(), 9);
        assert_eq!(HandLandmark::IndexTip.index(), 8);
        assert_eq!(HandLandmark::PinkyMcp.index(), 17);
        assert_eq!(HandLandmark::PinkyTip.index(), 20);
        assert_eq!(LANDMARK_COUNT, 21);
    }

    #[test]
    fn test_landmark_distance() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_frame_accepts_21_points() {
        let frame = HandFrame::from_landmarks(&raw_points(21)).unwrap();
        assert_eq!(frame.landmarks().len(), LANDMARK_COUNT);
        assert!((frame.landmark(HandLandmark::IndexMcp).x - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_frame_rejects_wrong_count() {
        let err = HandFrame::from_landmarks(&raw_points(10)).unwrap_err();
        assert_eq!(err, FrameError::WrongLandmarkCount { got: 10 });
        assert!(err.to_string().contains("expected 21"));
    }

    #[test]
    fn test_frame_rejects_nan() {
        let mut points = raw_points(21);
        points[7].y = f32::NAN;
        let err = HandFrame::from_landmarks(&points).unwrap_err();
        assert_eq!(err, FrameError::NonFiniteCoordinate { index: 7 });
    }

    #[test]
    fn test_frame_get_out_of_range() {
        let frame = HandFrame::from_landmarks(&raw_points(21)).unwrap();
        assert!(frame.get(20).is_some());
        assert!(frame.get(21).is_none());
    }

    #[test]
    fn test_observation_drops_invalid_hand() {
        let obs = Observation::from_raw(100, &[raw_points(21), raw_points(5)]);
        assert_eq!(obs.hand_count(), 1);
        assert!(obs.hand(HandSlot::Left).is_some());
        assert!(obs.hand(HandSlot::Right).is_none());
    }

    #[test]
    fn test_observation_caps_at_two_hands() {
        let obs = Observation::from_raw(
            100,
            &[raw_points(21), raw_points(21), raw_points(21)],
        );
        assert_eq!(obs.hand_count(), 2);
    }

    #[test]
    fn test_translated() {
        let frame = HandFrame::from_landmarks(&raw_points(21)).unwrap();
        let moved = frame.translated(0.1, -0.1, 0.0);
        let w0 = frame.landmark(HandLandmark::Wrist);
        let w1 = moved.landmark(HandLandmark::Wrist);
        assert!((w1.x - w0.x - 0.1).abs() < 1e-6);
        assert!((w1.y - w0.y + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_landmark_as_str() {
        assert_eq!(HandLandmark::Wrist.as_str(), "wrist");
        assert_eq!(HandLandmark::PinkyMcp.as_str(), "pinky-mcp");
        assert_eq!(HandSlot::Right.as_str(), "right");
    }
}
