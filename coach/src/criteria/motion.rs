//! Circular-motion detection over a sliding time window.
//!
//! Tracks the midpoint between the two wrists and records the heading of
//! each tick's displacement.  Circular rubbing produces several large
//! heading changes per second; a translating hand produces almost none,
//! and a resting hand is filtered by the displacement floor.

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_3;

use tracing::{debug, trace};

use crate::hand::{HandFrame, HandLandmark};

/// One midpoint displacement sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Heading of the displacement, `atan2(dy, dx)` in radians.
    pub angle: f32,
    pub dx: f32,
    pub dy: f32,
    pub timestamp_ms: u64,
}

impl MotionSample {
    /// Manhattan length of the displacement.
    pub fn magnitude(&self) -> f32 {
        self.dx.abs() + self.dy.abs()
    }
}

/// Configuration for circular-motion detection.
#[derive(Debug, Clone)]
pub struct MotionConfig {
    /// Sliding window length (ms).
    pub window_ms: u64,
    /// Samples required in the window before evaluating.
    pub min_samples: usize,
    /// Heading change (radians) that counts as a direction change.
    pub min_angle_change: f32,
    /// Minimum `|dx| + |dy|` for a sample to count (normalized units).
    pub min_displacement: f32,
    /// Direction changes within the window that signal circular motion.
    pub min_direction_changes: usize,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            window_ms: 1000,
            min_samples: 6,
            min_angle_change: FRAC_PI_3,
            min_displacement: 0.01,
            min_direction_changes: 3,
        }
    }
}

/// Stateful detector fed once per two-hand tick.
#[derive(Debug)]
pub struct CircularMotionDetector {
    pub config: MotionConfig,
    /// Time-ordered samples, none older than the window.
    history: VecDeque<MotionSample>,
    /// Wrist midpoint from the previous tick.
    last_center: Option<(f32, f32)>,
}

impl CircularMotionDetector {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            history: VecDeque::with_capacity(32),
            last_center: None,
        }
    }

    /// Record the wrist midpoint at `now_ms` and report whether the
    /// window currently shows circular motion.
    pub fn update(&mut self, a: &HandFrame, b: &HandFrame, now_ms: u64) -> bool {
        let wa = a.landmark(HandLandmark::Wrist);
        let wb = b.landmark(HandLandmark::Wrist);
        let cx = (wa.x + wb.x) / 2.0;
        let cy = (wa.y + wb.y) / 2.0;

        let (px, py) = match self.last_center.replace((cx, cy)) {
            Some(prev) => prev,
            None => return false,
        };

        let dx = cx - px;
        let dy = cy - py;
        self.history.push_back(MotionSample {
            angle: dy.atan2(dx),
            dx,
            dy,
            timestamp_ms: now_ms,
        });
        self.prune(now_ms);

        if self.history.len() < self.config.min_samples {
            return false;
        }

        let changes = self.direction_changes();
        trace!(
            "Motion window: {} samples, {} direction changes",
            self.history.len(),
            changes
        );
        changes >= self.config.min_direction_changes
    }

    /// Count heading changes between consecutive samples in the window.
    pub fn direction_changes(&self) -> usize {
        self.history
            .iter()
            .zip(self.history.iter().skip(1))
            .filter(|(prev, cur)| {
                (cur.angle - prev.angle).abs() > self.config.min_angle_change
                    && cur.magnitude() > self.config.min_displacement
            })
            .count()
    }

    /// Drop samples that have aged out of the window.
    fn prune(&mut self, now_ms: u64) {
        let window = self.config.window_ms;
        while let Some(front) = self.history.front() {
            if now_ms.saturating_sub(front.timestamp_ms) >= window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn sample_count(&self) -> usize {
        self.history.len()
    }

    pub fn samples(&self) -> impl Iterator<Item = &MotionSample> {
        self.history.iter()
    }

    pub fn reset(&mut self) {
        if !self.history.is_empty() {
            debug!("Motion history cleared ({} samples)", self.history.len());
        }
        self.history.clear();
        self.last_center = None;
    }
}

// ── Tests ──────────────────────────────────────────────────
